//! Pixel coordinates and the flat feature grid consumed by the pipeline.
//!
//! Pixels live in a single row-major buffer; [`GridShape`] owns the mapping
//! between `(row, col)` coordinates and linear indices so every other module
//! can work with dense `usize` node ids.

use std::fmt;

use crate::{Result, error::SegmentationError};

/// A `(row, col)` coordinate inside a grid.
///
/// Pixels order by row first and column second, which matches the row-major
/// traversal used everywhere in the crate.
///
/// # Examples
/// ```
/// use graphseg_core::Pixel;
///
/// assert!(Pixel::new(0, 9) < Pixel::new(1, 0));
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Pixel {
    /// Zero-based row.
    pub row: usize,
    /// Zero-based column.
    pub col: usize,
}

impl Pixel {
    /// Creates a pixel coordinate.
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Pixel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Dimensions of a rectangular grid.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct GridShape {
    rows: usize,
    cols: usize,
}

impl GridShape {
    /// Creates a shape, rejecting empty dimensions.
    ///
    /// # Errors
    /// Returns [`SegmentationError::EmptyGrid`] when either dimension is zero
    /// and [`SegmentationError::GridTooLarge`] when the pixel count overflows.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(SegmentationError::EmptyGrid { rows, cols });
        }
        if rows.checked_mul(cols).is_none() {
            return Err(SegmentationError::GridTooLarge {
                rows,
                cols,
                channels: 1,
            });
        }
        Ok(Self { rows, cols })
    }

    /// Number of rows.
    #[must_use]
    #[rustfmt::skip]
    pub const fn rows(&self) -> usize { self.rows }

    /// Number of columns.
    #[must_use]
    #[rustfmt::skip]
    pub const fn cols(&self) -> usize { self.cols }

    /// Total number of pixels.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows * self.cols
    }

    /// Always `false`; shapes are validated to be non-empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Returns whether `pixel` lies inside the grid.
    #[must_use]
    pub const fn contains(&self, pixel: Pixel) -> bool {
        pixel.row < self.rows && pixel.col < self.cols
    }

    /// Row-major linear index of `pixel`.
    ///
    /// The pixel must lie inside the grid; callers validate with
    /// [`Self::contains`] first.
    #[must_use]
    pub const fn index_of(&self, pixel: Pixel) -> usize {
        pixel.row * self.cols + pixel.col
    }

    /// Pixel at row-major linear `index`.
    #[must_use]
    pub const fn pixel_at(&self, index: usize) -> Pixel {
        Pixel {
            row: index / self.cols,
            col: index % self.cols,
        }
    }

    /// Iterates over every pixel in row-major order.
    pub fn pixels(&self) -> impl ExactSizeIterator<Item = Pixel> + '_ {
        (0..self.len()).map(|index| self.pixel_at(index))
    }
}

/// A rectangular grid of fixed-length feature vectors (colour, depth, ...).
///
/// # Examples
/// ```
/// use graphseg_core::FeatureGrid;
///
/// let grid = FeatureGrid::from_rgb8(1, 2, &[255, 0, 0, 0, 0, 255])?;
/// assert_eq!(grid.channels(), 3);
/// assert_eq!(grid.feature(1), &[0.0, 0.0, 255.0]);
/// # Ok::<(), graphseg_core::SegmentationError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureGrid {
    shape: GridShape,
    channels: usize,
    data: Vec<f32>,
}

impl FeatureGrid {
    /// Builds a grid from a row-major buffer of `rows * cols * channels` values.
    ///
    /// # Errors
    /// Returns [`SegmentationError::EmptyGrid`], [`SegmentationError::ZeroChannels`],
    /// [`SegmentationError::GridTooLarge`],
    /// [`SegmentationError::BufferLengthMismatch`] or
    /// [`SegmentationError::NonFiniteFeature`] when the input is malformed.
    pub fn new(rows: usize, cols: usize, channels: usize, data: Vec<f32>) -> Result<Self> {
        let shape = GridShape::new(rows, cols)?;
        let expected = buffer_len(shape, channels)?;
        if data.len() != expected {
            return Err(SegmentationError::BufferLengthMismatch {
                expected,
                actual: data.len(),
            });
        }
        if let Some((index, &value)) = data.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(SegmentationError::NonFiniteFeature { index, value });
        }
        Ok(Self {
            shape,
            channels,
            data,
        })
    }

    /// Builds a three-channel grid from interleaved 8-bit RGB samples.
    ///
    /// # Errors
    /// Same conditions as [`Self::new`].
    pub fn from_rgb8(rows: usize, cols: usize, rgb: &[u8]) -> Result<Self> {
        Self::new(rows, cols, 3, rgb.iter().copied().map(f32::from).collect())
    }

    /// Builds a grid by evaluating `feature` for every pixel.
    ///
    /// `feature` must return exactly `channels` values.
    ///
    /// # Errors
    /// Returns [`SegmentationError::FeatureLengthMismatch`] for the first pixel
    /// whose vector has the wrong length, otherwise the same conditions as
    /// [`Self::new`].
    pub fn from_fn<F>(rows: usize, cols: usize, channels: usize, mut feature: F) -> Result<Self>
    where
        F: FnMut(Pixel) -> Vec<f32>,
    {
        let shape = GridShape::new(rows, cols)?;
        let mut data = Vec::with_capacity(buffer_len(shape, channels)?);
        for pixel in shape.pixels() {
            let values = feature(pixel);
            if values.len() != channels {
                return Err(SegmentationError::FeatureLengthMismatch {
                    pixel,
                    expected: channels,
                    actual: values.len(),
                });
            }
            data.extend(values);
        }
        Self::new(rows, cols, channels, data)
    }

    /// Appends a depth channel, one value per pixel in row-major order.
    ///
    /// # Errors
    /// Returns [`SegmentationError::ShapeMismatch`] when `depth` does not hold
    /// one value per pixel and [`SegmentationError::NonFiniteFeature`] for
    /// NaN or infinite depths.
    pub fn with_depth(self, depth: &[f32]) -> Result<Self> {
        if depth.len() != self.shape.len() {
            return Err(SegmentationError::ShapeMismatch {
                expected: self.shape.len(),
                actual: depth.len(),
            });
        }
        let channels = self.channels + 1;
        let mut data = Vec::with_capacity(buffer_len(self.shape, channels)?);
        for (values, &d) in self.data.chunks_exact(self.channels).zip(depth) {
            data.extend_from_slice(values);
            data.push(d);
        }
        Self::new(self.shape.rows, self.shape.cols, channels, data)
    }

    /// Grid dimensions.
    #[must_use]
    #[rustfmt::skip]
    pub const fn shape(&self) -> GridShape { self.shape }

    /// Number of values per pixel.
    #[must_use]
    #[rustfmt::skip]
    pub const fn channels(&self) -> usize { self.channels }

    /// Feature vector of the pixel at linear `index`.
    ///
    /// # Panics
    /// Panics when `index` is outside the grid.
    #[must_use]
    pub fn feature(&self, index: usize) -> &[f32] {
        let start = index * self.channels;
        &self.data[start..start + self.channels]
    }

    /// Feature vector at `pixel`, or `None` outside the grid.
    #[must_use]
    pub fn at(&self, pixel: Pixel) -> Option<&[f32]> {
        self.shape
            .contains(pixel)
            .then(|| self.feature(self.shape.index_of(pixel)))
    }

    /// The flat row-major buffer.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub(crate) fn from_parts_unchecked(shape: GridShape, channels: usize, data: Vec<f32>) -> Self {
        Self {
            shape,
            channels,
            data,
        }
    }
}

fn buffer_len(shape: GridShape, channels: usize) -> Result<usize> {
    if channels == 0 {
        return Err(SegmentationError::ZeroChannels);
    }
    shape
        .len()
        .checked_mul(channels)
        .ok_or(SegmentationError::GridTooLarge {
            rows: shape.rows,
            cols: shape.cols,
            channels,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case(0, 4)]
    #[case(4, 0)]
    fn rejects_empty_dimensions(#[case] rows: usize, #[case] cols: usize) {
        let err = FeatureGrid::new(rows, cols, 1, Vec::new()).expect_err("empty grid must fail");
        assert_eq!(err, SegmentationError::EmptyGrid { rows, cols });
    }

    #[test]
    fn rejects_length_mismatch() {
        let err = FeatureGrid::new(2, 2, 3, vec![0.0; 11]).expect_err("short buffer must fail");
        assert_eq!(
            err,
            SegmentationError::BufferLengthMismatch {
                expected: 12,
                actual: 11
            }
        );
    }

    #[rstest]
    #[case(usize::MAX, 2, 1)]
    #[case(1 << 20, 1 << 20, usize::MAX >> 8)]
    fn rejects_unaddressable_dimensions(
        #[case] rows: usize,
        #[case] cols: usize,
        #[case] channels: usize,
    ) {
        let err = FeatureGrid::new(rows, cols, channels, Vec::new()).expect_err("must not overflow");
        assert!(matches!(err, SegmentationError::GridTooLarge { .. }));
    }

    #[rstest]
    #[case(0, 2)]
    #[case(1, 4)]
    fn from_fn_rejects_ragged_feature_vectors(#[case] ragged_col: usize, #[case] actual: usize) {
        let err = FeatureGrid::from_fn(1, 2, 3, |pixel| {
            if pixel.col == ragged_col {
                vec![1.0; actual]
            } else {
                vec![0.0; 3]
            }
        })
        .expect_err("ragged vectors must fail");
        assert_eq!(
            err,
            SegmentationError::FeatureLengthMismatch {
                pixel: Pixel::new(0, ragged_col),
                expected: 3,
                actual
            }
        );
    }

    #[test]
    fn rejects_non_finite_values() {
        let err = FeatureGrid::new(1, 2, 1, vec![0.0, f32::NAN]).expect_err("NaN must fail");
        assert!(matches!(
            err,
            SegmentationError::NonFiniteFeature { index: 1, .. }
        ));
    }

    #[test]
    fn shape_round_trips_linear_indices() {
        let shape = GridShape::new(3, 4).expect("shape is valid");
        for (index, pixel) in shape.pixels().enumerate() {
            assert_eq!(shape.index_of(pixel), index);
            assert_eq!(shape.pixel_at(index), pixel);
        }
        assert!(!shape.contains(Pixel::new(3, 0)));
        assert!(!shape.contains(Pixel::new(0, 4)));
    }

    #[test]
    fn with_depth_interleaves_channel() {
        let grid = FeatureGrid::from_rgb8(1, 2, &[1, 2, 3, 4, 5, 6])
            .and_then(|grid| grid.with_depth(&[7.0, 8.0]))
            .expect("depth must append");
        assert_eq!(grid.channels(), 4);
        assert_eq!(grid.as_slice(), &[1.0, 2.0, 3.0, 7.0, 4.0, 5.0, 6.0, 8.0]);
    }

    #[test]
    fn with_depth_rejects_wrong_length() {
        let grid = FeatureGrid::from_rgb8(1, 2, &[0; 6]).expect("grid is valid");
        let err = grid.with_depth(&[1.0]).expect_err("short depth must fail");
        assert_eq!(
            err,
            SegmentationError::ShapeMismatch {
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn at_returns_none_outside_grid() {
        let grid = FeatureGrid::from_fn(2, 2, 1, |p| vec![p.row as f32]).expect("grid is valid");
        assert_eq!(grid.at(Pixel::new(1, 1)), Some(&[1.0][..]));
        assert_eq!(grid.at(Pixel::new(2, 0)), None);
    }
}
