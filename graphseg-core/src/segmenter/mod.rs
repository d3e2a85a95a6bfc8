//! Graph-based segmentation with an adaptive, size-sensitive merge threshold.
//!
//! Edges are processed in ascending weight order, as in Kruskal's
//! minimum-spanning-forest construction. Two components merge when the
//! connecting edge is no heavier than the smaller of their internal
//! thresholds; every merge resets the threshold to `weight + k / size`, so
//! small components merge readily while large ones resist. A second pass over
//! the same order force-merges components smaller than the minimum segment
//! size into a neighbour.
//!
//! The sort is stable, so equal weights keep their construction order and the
//! output is reproducible bit for bit. Only the sort is parallelised; the
//! merge passes depend on thresholds produced by earlier merges and run
//! sequentially.

mod builder;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, info, instrument, warn};

use crate::{
    Result,
    forest::DisjointSetForest,
    graph::{Connectivity, Dissimilarity, Edge, EdgeList, Euclidean, build_grid_edges},
    grid::FeatureGrid,
    result::{LabelGrid, LabelMode, SegmentationResult},
    smoothing::smooth,
};

pub use self::builder::{DEFAULT_GRANULARITY, DEFAULT_MIN_SEGMENT_SIZE, SegmenterBuilder};

/// Counters describing one segmentation run.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PassStats {
    /// Merges accepted by the threshold predicate.
    pub merges: usize,
    /// Merges forced by the minimum-size pass.
    pub forced_merges: usize,
    /// Components left after both passes.
    pub segments: usize,
}

/// Runs the segmentation pipeline with a validated configuration.
///
/// # Examples
/// ```
/// use graphseg_core::{FeatureGrid, SegmenterBuilder};
///
/// let grid = FeatureGrid::new(1, 4, 1, vec![0.0, 0.0, 90.0, 90.0])?;
/// let segmenter = SegmenterBuilder::new()
///     .with_granularity(1.0)
///     .with_min_segment_size(1)
///     .build()?;
/// let result = segmenter.segment(&grid)?;
/// assert_eq!(result.segment_count(), 2);
/// # Ok::<(), graphseg_core::SegmentationError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Segmenter {
    granularity: f32,
    min_segment_size: usize,
    connectivity: Connectivity,
    sigma: f32,
    label_mode: LabelMode,
}

impl Segmenter {
    /// Granularity constant `k`.
    #[must_use]
    #[rustfmt::skip]
    pub fn granularity(&self) -> f32 { self.granularity }

    /// Minimum segment size `m`.
    #[must_use]
    #[rustfmt::skip]
    pub fn min_segment_size(&self) -> usize { self.min_segment_size }

    /// Pixel neighbourhood used for grid edges.
    #[must_use]
    #[rustfmt::skip]
    pub fn connectivity(&self) -> Connectivity { self.connectivity }

    /// Gaussian pre-smoothing deviation.
    #[must_use]
    #[rustfmt::skip]
    pub fn sigma(&self) -> f32 { self.sigma }

    /// How segment ids are assigned.
    #[must_use]
    #[rustfmt::skip]
    pub fn label_mode(&self) -> LabelMode { self.label_mode }

    /// Segments `grid` using Euclidean feature distance.
    ///
    /// # Errors
    /// Propagates [`crate::SegmentationError`] from edge construction.
    pub fn segment<'g>(&self, grid: &'g FeatureGrid) -> Result<SegmentationResult<'g>> {
        self.segment_with(grid, &Euclidean)
    }

    /// Segments `grid` using a caller-chosen dissimilarity policy.
    ///
    /// The returned result borrows `grid` and computes statistics from its
    /// unsmoothed values.
    ///
    /// # Errors
    /// Propagates [`crate::SegmentationError`] from edge construction.
    pub fn segment_with<'g, M>(
        &self,
        grid: &'g FeatureGrid,
        metric: &M,
    ) -> Result<SegmentationResult<'g>>
    where
        M: Dissimilarity + ?Sized,
    {
        let labels = self.label_grid_with(grid, metric)?;
        SegmentationResult::from_label_grid(grid, labels)
    }

    /// Produces only the dense label grid for `grid`, using Euclidean
    /// feature distance.
    ///
    /// # Errors
    /// Propagates [`crate::SegmentationError`] from edge construction.
    pub fn label_grid(&self, grid: &FeatureGrid) -> Result<LabelGrid> {
        self.label_grid_with(grid, &Euclidean)
    }

    /// Produces only the dense label grid for `grid`.
    ///
    /// # Errors
    /// Propagates [`crate::SegmentationError`] from edge construction.
    #[instrument(
        name = "core.segment",
        err,
        skip(self, grid, metric),
        fields(
            rows = grid.shape().rows(),
            cols = grid.shape().cols(),
            channels = grid.channels(),
            k = self.granularity,
            min_size = self.min_segment_size,
            sigma = self.sigma,
        ),
    )]
    pub fn label_grid_with<M>(&self, grid: &FeatureGrid, metric: &M) -> Result<LabelGrid>
    where
        M: Dissimilarity + ?Sized,
    {
        let smoothed = smooth(grid, self.sigma)?;
        let edges = build_grid_edges(&smoothed, self.connectivity, metric)?;
        let (forest, stats) = self.run_passes(edges);
        let labels = LabelGrid::from_forest(grid.shape(), &forest, self.label_mode)?;
        info!(segments = stats.segments, "segmentation completed");
        Ok(labels)
    }

    /// Segments an arbitrary graph and returns the finished forest.
    ///
    /// Use this for graphs that are not pixel grids; the forest is flattened
    /// so [`DisjointSetForest::representative`] resolves in one step.
    #[instrument(
        name = "core.segment_edges",
        skip(self, edges),
        fields(nodes = edges.node_count(), edges = edges.len()),
    )]
    #[must_use]
    pub fn segment_edges(&self, edges: EdgeList) -> (DisjointSetForest, PassStats) {
        self.run_passes(edges)
    }

    fn run_passes(&self, edges: EdgeList) -> (DisjointSetForest, PassStats) {
        let node_count = edges.node_count();
        if self.min_segment_size > node_count {
            warn!(
                min_size = self.min_segment_size,
                nodes = node_count,
                "minimum segment size exceeds node count; output collapses per connected component"
            );
        }
        let mut edges = edges.into_edges();
        sort_by_weight(&mut edges);

        let mut forest = DisjointSetForest::new(node_count, self.granularity);
        let merges = merge_pass(&mut forest, &edges, self.granularity);
        let forced_merges = enforce_min_size(
            &mut forest,
            &edges,
            self.granularity,
            self.min_segment_size,
        );
        forest.flatten();

        let stats = PassStats {
            merges,
            forced_merges,
            segments: forest.component_count(),
        };
        debug!(
            merges = stats.merges,
            forced_merges = stats.forced_merges,
            segments = stats.segments,
            "merge passes finished"
        );
        record_metrics(&stats);
        (forest, stats)
    }
}

fn sort_by_weight(edges: &mut [Edge]) {
    #[cfg(feature = "parallel")]
    edges.par_sort_by(|a, b| a.weight().total_cmp(&b.weight()));
    #[cfg(not(feature = "parallel"))]
    edges.sort_by(|a, b| a.weight().total_cmp(&b.weight()));
}

fn merge_pass(forest: &mut DisjointSetForest, sorted: &[Edge], granularity: f32) -> usize {
    let mut merges = 0;
    for edge in sorted {
        let left = forest.find(edge.source());
        let right = forest.find(edge.target());
        if left == right {
            continue;
        }
        let limit = forest.threshold_of(left).min(forest.threshold_of(right));
        if edge.weight() <= limit {
            forest.union(left, right, edge.weight(), granularity);
            merges += 1;
        }
    }
    merges
}

fn enforce_min_size(
    forest: &mut DisjointSetForest,
    sorted: &[Edge],
    granularity: f32,
    min_size: usize,
) -> usize {
    if min_size <= 1 {
        return 0;
    }
    let mut forced = 0;
    for edge in sorted {
        let left = forest.find(edge.source());
        let right = forest.find(edge.target());
        if left == right {
            continue;
        }
        if forest.size_of(left) < min_size || forest.size_of(right) < min_size {
            forest.union(left, right, edge.weight(), granularity);
            forced += 1;
        }
    }
    forced
}

#[cfg(feature = "metrics")]
fn record_metrics(stats: &PassStats) {
    metrics::counter!("segmentation_merges_total").increment(stats.merges as u64);
    metrics::counter!("segmentation_forced_merges_total").increment(stats.forced_merges as u64);
    metrics::histogram!("segmentation_segment_count").record(stats.segments as f64);
}

#[cfg(not(feature = "metrics"))]
fn record_metrics(_stats: &PassStats) {}

#[cfg(test)]
mod property;
