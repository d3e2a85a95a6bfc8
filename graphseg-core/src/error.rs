//! Error types for the graphseg core library.
//!
//! Construction-time failures are reported through [`SegmentationError`] and
//! stop the pipeline before any state is produced. Queries against a finished
//! [`crate::SegmentationResult`] report [`SegmentQueryError`], which never
//! invalidates the result itself.

use std::fmt;

use thiserror::Error;

use crate::{grid::Pixel, result::SegmentId};

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            #[must_use]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// Invalid input detected before or while building a segmentation.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SegmentationError {
    /// The grid has no rows or no columns.
    #[error("grid must have at least one row and one column (got {rows}x{cols})")]
    EmptyGrid {
        /// Requested row count.
        rows: usize,
        /// Requested column count.
        cols: usize,
    },
    /// The pixel count or feature buffer length overflows `usize`.
    #[error("a {rows}x{cols} grid with {channels} channels is too large to address")]
    GridTooLarge {
        /// Requested row count.
        rows: usize,
        /// Requested column count.
        cols: usize,
        /// Requested channel count.
        channels: usize,
    },
    /// Feature vectors must carry at least one channel.
    #[error("feature vectors must have at least one channel")]
    ZeroChannels,
    /// The flat feature buffer does not match `rows * cols * channels`.
    #[error("feature buffer has length {actual} but {expected} values were expected")]
    BufferLengthMismatch {
        /// Length implied by the grid shape.
        expected: usize,
        /// Length actually supplied.
        actual: usize,
    },
    /// A pixel's feature vector has the wrong number of channels.
    #[error("pixel {pixel} has {actual} feature values but {expected} were expected")]
    FeatureLengthMismatch {
        /// Offending pixel.
        pixel: Pixel,
        /// Channels declared for the grid.
        expected: usize,
        /// Values supplied for the pixel.
        actual: usize,
    },
    /// A feature value was NaN or infinite.
    #[error("feature value at flat index {index} is not finite ({value})")]
    NonFiniteFeature {
        /// Flat index of the offending value.
        index: usize,
        /// The offending value.
        value: f32,
    },
    /// A dissimilarity policy was configured for a different channel count.
    #[error("policy expects {expected} channels but the grid has {actual}")]
    ChannelMismatch {
        /// Channels expected by the policy.
        expected: usize,
        /// Channels present in the grid.
        actual: usize,
    },
    /// The granularity constant `k` must be finite and non-negative.
    #[error("granularity must be finite and non-negative (got {got})")]
    InvalidGranularity {
        /// Rejected value.
        got: f32,
    },
    /// The smoothing deviation must be finite and non-negative.
    #[error("sigma must be finite and non-negative (got {got})")]
    InvalidSigma {
        /// Rejected value.
        got: f32,
    },
    /// A channel weight must be finite and non-negative.
    #[error("channel weight {channel} must be finite and non-negative (got {got})")]
    InvalidWeight {
        /// Channel the weight applies to.
        channel: usize,
        /// Rejected value.
        got: f32,
    },
    /// An edge referenced a node that is not part of the graph.
    #[error("edge references node {node}, but node_count is {node_count}")]
    InvalidNodeId {
        /// The out-of-range node.
        node: usize,
        /// Number of nodes in the graph.
        node_count: usize,
    },
    /// An edge weight was negative, NaN or infinite.
    #[error("edge ({source_node}, {target_node}) has invalid weight {weight}")]
    NonFiniteWeight {
        /// First endpoint.
        source_node: usize,
        /// Second endpoint.
        target_node: usize,
        /// The rejected weight.
        weight: f32,
    },
    /// The graph has no nodes.
    #[error("cannot segment an empty graph")]
    EmptyGraph,
    /// A supplied buffer does not match the grid shape.
    #[error("expected {expected} entries for the grid but received {actual}")]
    ShapeMismatch {
        /// Entries required by the grid shape.
        expected: usize,
        /// Entries supplied.
        actual: usize,
    },
    /// A pixel-to-segment map omitted a pixel.
    #[error("no segment assigned to pixel {pixel}")]
    MissingPixel {
        /// First pixel without an assignment.
        pixel: Pixel,
    },
    /// A pixel-to-segment map referenced a pixel outside the grid.
    #[error("pixel {pixel} lies outside the {rows}x{cols} grid")]
    PixelOutOfBounds {
        /// Offending pixel.
        pixel: Pixel,
        /// Grid rows.
        rows: usize,
        /// Grid columns.
        cols: usize,
    },
}

define_error_codes! {
    /// Stable codes describing [`SegmentationError`] variants.
    enum SegmentationErrorCode for SegmentationError {
        /// The grid has no rows or no columns.
        EmptyGrid => EmptyGrid { .. } => "SEGMENTATION_EMPTY_GRID",
        /// The grid is too large to address.
        GridTooLarge => GridTooLarge { .. } => "SEGMENTATION_GRID_TOO_LARGE",
        /// Feature vectors must carry at least one channel.
        ZeroChannels => ZeroChannels => "SEGMENTATION_ZERO_CHANNELS",
        /// The flat feature buffer has the wrong length.
        BufferLengthMismatch => BufferLengthMismatch { .. } => "SEGMENTATION_BUFFER_LENGTH_MISMATCH",
        /// A pixel's feature vector has the wrong length.
        FeatureLengthMismatch => FeatureLengthMismatch { .. } => "SEGMENTATION_FEATURE_LENGTH_MISMATCH",
        /// A feature value was NaN or infinite.
        NonFiniteFeature => NonFiniteFeature { .. } => "SEGMENTATION_NON_FINITE_FEATURE",
        /// A policy was configured for a different channel count.
        ChannelMismatch => ChannelMismatch { .. } => "SEGMENTATION_CHANNEL_MISMATCH",
        /// The granularity constant was rejected.
        InvalidGranularity => InvalidGranularity { .. } => "SEGMENTATION_INVALID_GRANULARITY",
        /// The smoothing deviation was rejected.
        InvalidSigma => InvalidSigma { .. } => "SEGMENTATION_INVALID_SIGMA",
        /// A channel weight was rejected.
        InvalidWeight => InvalidWeight { .. } => "SEGMENTATION_INVALID_WEIGHT",
        /// An edge referenced a node outside the graph.
        InvalidNodeId => InvalidNodeId { .. } => "SEGMENTATION_INVALID_NODE_ID",
        /// An edge weight was rejected.
        NonFiniteWeight => NonFiniteWeight { .. } => "SEGMENTATION_NON_FINITE_WEIGHT",
        /// The graph has no nodes.
        EmptyGraph => EmptyGraph => "SEGMENTATION_EMPTY_GRAPH",
        /// A supplied buffer does not match the grid shape.
        ShapeMismatch => ShapeMismatch { .. } => "SEGMENTATION_SHAPE_MISMATCH",
        /// A pixel map omitted a pixel.
        MissingPixel => MissingPixel { .. } => "SEGMENTATION_MISSING_PIXEL",
        /// A pixel map referenced a pixel outside the grid.
        PixelOutOfBounds => PixelOutOfBounds { .. } => "SEGMENTATION_PIXEL_OUT_OF_BOUNDS",
    }
}

/// Recoverable failure of a per-segment query.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum SegmentQueryError {
    /// The id is not one of the result's segment ids.
    #[error("segment {id} does not exist")]
    UnknownSegment {
        /// Requested segment id.
        id: SegmentId,
    },
    /// The segment exists but has no member pixels.
    #[error("segment {id} has no member pixels")]
    EmptySegment {
        /// Requested segment id.
        id: SegmentId,
    },
}

define_error_codes! {
    /// Stable codes describing [`SegmentQueryError`] variants.
    enum SegmentQueryErrorCode for SegmentQueryError {
        /// The id is not one of the result's segment ids.
        UnknownSegment => UnknownSegment { .. } => "SEGMENT_QUERY_UNKNOWN_SEGMENT",
        /// The segment exists but has no member pixels.
        EmptySegment => EmptySegment { .. } => "SEGMENT_QUERY_EMPTY_SEGMENT",
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, SegmentationError>;
