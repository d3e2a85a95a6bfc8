//! Graph-based image segmentation.
//!
//! A [`FeatureGrid`] of per-pixel feature vectors (colour, optionally depth)
//! is turned into a weighted neighbourhood graph, whose edges are merged in
//! ascending weight order under an adaptive, size-sensitive threshold. The
//! resulting [`SegmentationResult`] exposes the label grid, a reverse mapping
//! from segment ids to pixels, lazily computed per-segment statistics and
//! colour overlays.
//!
//! ```
//! use graphseg_core::{Connectivity, FeatureGrid, SegmentId, SegmenterBuilder};
//!
//! let grid = FeatureGrid::from_fn(4, 4, 3, |pixel| {
//!     if pixel.col < 2 { vec![255.0, 0.0, 0.0] } else { vec![0.0, 0.0, 255.0] }
//! })?;
//! let segmenter = SegmenterBuilder::new()
//!     .with_granularity(10.0)
//!     .with_min_segment_size(1)
//!     .with_connectivity(Connectivity::Four)
//!     .build()?;
//! let result = segmenter.segment(&grid)?;
//! assert_eq!(result.segment_count(), 2);
//! assert_eq!(result.average_color(SegmentId::new(1))?, &[0.0, 0.0, 255.0]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

mod error;
mod forest;
mod graph;
mod grid;
mod result;
mod segmenter;
mod smoothing;
#[cfg(test)]
mod test_utils;

pub use crate::{
    error::{
        Result, SegmentQueryError, SegmentQueryErrorCode, SegmentationError,
        SegmentationErrorCode,
    },
    forest::DisjointSetForest,
    graph::{
        Connectivity, Dissimilarity, Edge, EdgeList, Euclidean, WeightedEuclidean,
        build_grid_edges,
    },
    grid::{FeatureGrid, GridShape, Pixel},
    result::{
        Centroid, LabelGrid, LabelMode, OverlayImage, Rgb, SegmentId, SegmentPalette,
        SegmentSummary, SegmentationResult,
    },
    segmenter::{
        DEFAULT_GRANULARITY, DEFAULT_MIN_SEGMENT_SIZE, PassStats, Segmenter, SegmenterBuilder,
    },
    smoothing::smooth,
};
