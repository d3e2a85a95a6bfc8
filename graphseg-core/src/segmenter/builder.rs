//! Builder utilities for configuring [`Segmenter`] instances.
//!
//! Parameters are validated once in [`SegmenterBuilder::build`] so the
//! segmentation passes never observe an invalid configuration.

use crate::{Result, error::SegmentationError, graph::Connectivity, result::LabelMode};

use super::Segmenter;

/// Default granularity constant `k`.
pub const DEFAULT_GRANULARITY: f32 = 500.0;
/// Default minimum segment size `m`.
pub const DEFAULT_MIN_SEGMENT_SIZE: usize = 20;

/// Configures and constructs [`Segmenter`] instances.
///
/// # Examples
/// ```
/// use graphseg_core::{Connectivity, SegmenterBuilder};
///
/// let segmenter = SegmenterBuilder::new()
///     .with_granularity(300.0)
///     .with_min_segment_size(50)
///     .with_connectivity(Connectivity::Four)
///     .build()
///     .expect("configuration is valid");
/// assert_eq!(segmenter.granularity(), 300.0);
/// assert_eq!(segmenter.min_segment_size(), 50);
/// assert_eq!(segmenter.connectivity(), Connectivity::Four);
/// ```
#[derive(Debug, Clone)]
pub struct SegmenterBuilder {
    granularity: f32,
    min_segment_size: usize,
    connectivity: Connectivity,
    sigma: f32,
    label_mode: LabelMode,
}

impl Default for SegmenterBuilder {
    fn default() -> Self {
        Self {
            granularity: DEFAULT_GRANULARITY,
            min_segment_size: DEFAULT_MIN_SEGMENT_SIZE,
            connectivity: Connectivity::default(),
            sigma: 0.0,
            label_mode: LabelMode::default(),
        }
    }
}

impl SegmenterBuilder {
    /// Creates a builder populated with default parameters.
    ///
    /// # Examples
    /// ```
    /// use graphseg_core::{Connectivity, SegmenterBuilder};
    ///
    /// let builder = SegmenterBuilder::new();
    /// assert_eq!(builder.granularity(), 500.0);
    /// assert_eq!(builder.min_segment_size(), 20);
    /// assert_eq!(builder.connectivity(), Connectivity::Eight);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the granularity constant `k`; larger values favour larger
    /// segments.
    #[must_use]
    pub fn with_granularity(mut self, granularity: f32) -> Self {
        self.granularity = granularity;
        self
    }

    /// Returns the configured granularity.
    #[must_use]
    pub fn granularity(&self) -> f32 {
        self.granularity
    }

    /// Overrides the minimum segment size `m`. Zero and one disable the
    /// forced-merge pass.
    #[must_use]
    pub fn with_min_segment_size(mut self, size: usize) -> Self {
        self.min_segment_size = size;
        self
    }

    /// Returns the configured minimum segment size.
    #[must_use]
    pub fn min_segment_size(&self) -> usize {
        self.min_segment_size
    }

    /// Sets the pixel neighbourhood used for grid edges.
    #[must_use]
    pub fn with_connectivity(mut self, connectivity: Connectivity) -> Self {
        self.connectivity = connectivity;
        self
    }

    /// Returns the configured connectivity.
    #[must_use]
    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    /// Sets the Gaussian pre-smoothing deviation; `0` disables smoothing.
    #[must_use]
    pub fn with_sigma(mut self, sigma: f32) -> Self {
        self.sigma = sigma;
        self
    }

    /// Returns the configured smoothing deviation.
    #[must_use]
    pub fn sigma(&self) -> f32 {
        self.sigma
    }

    /// Chooses how segment ids are assigned.
    #[must_use]
    pub fn with_label_mode(mut self, mode: LabelMode) -> Self {
        self.label_mode = mode;
        self
    }

    /// Returns the configured label mode.
    #[must_use]
    pub fn label_mode(&self) -> LabelMode {
        self.label_mode
    }

    /// Validates the configuration and constructs a [`Segmenter`].
    ///
    /// # Errors
    /// Returns [`SegmentationError::InvalidGranularity`] when `k` is negative
    /// or non-finite and [`SegmentationError::InvalidSigma`] when `sigma` is.
    pub fn build(self) -> Result<Segmenter> {
        if !self.granularity.is_finite() || self.granularity < 0.0 {
            return Err(SegmentationError::InvalidGranularity {
                got: self.granularity,
            });
        }
        if !self.sigma.is_finite() || self.sigma < 0.0 {
            return Err(SegmentationError::InvalidSigma { got: self.sigma });
        }
        Ok(Segmenter {
            granularity: self.granularity,
            min_segment_size: self.min_segment_size,
            connectivity: self.connectivity,
            sigma: self.sigma,
            label_mode: self.label_mode,
        })
    }
}
