//! Segmentation output: label grid, reverse mapping and per-segment queries.
//!
//! A [`SegmentationResult`] is built once from a label grid, a finished forest
//! or an external pixel map, and is immutable afterwards. Per-segment
//! statistics are computed on first use and stored in a [`OnceLock`], which
//! keeps shared access from several threads safe.

mod labels;
mod palette;

use std::{
    collections::{BTreeMap, HashMap},
    hash::BuildHasher,
    sync::OnceLock,
};

use crate::{
    Result,
    error::{SegmentQueryError, SegmentationError},
    forest::DisjointSetForest,
    grid::{FeatureGrid, GridShape, Pixel},
};

pub use self::{
    labels::{LabelGrid, LabelMode, SegmentId},
    palette::{Rgb, SegmentPalette},
};

type QueryResult<T> = core::result::Result<T, SegmentQueryError>;

/// Real-valued mean coordinate of a segment's pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Centroid {
    /// Mean row.
    pub row: f64,
    /// Mean column.
    pub col: f64,
}

/// Statistics derived from a segment's member pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentSummary {
    size: usize,
    average: Vec<f32>,
    centroid: Centroid,
}

impl SegmentSummary {
    fn from_pixels(source: &FeatureGrid, pixels: &[Pixel]) -> Option<Self> {
        if pixels.is_empty() {
            return None;
        }
        let shape = source.shape();
        let mut sums = vec![0.0f64; source.channels()];
        let (mut row_sum, mut col_sum) = (0.0f64, 0.0f64);
        for &pixel in pixels {
            for (sum, &value) in sums.iter_mut().zip(source.feature(shape.index_of(pixel))) {
                *sum += f64::from(value);
            }
            row_sum += pixel.row as f64;
            col_sum += pixel.col as f64;
        }
        let count = pixels.len() as f64;
        Some(Self {
            size: pixels.len(),
            average: sums.iter().map(|sum| (sum / count) as f32).collect(),
            centroid: Centroid {
                row: row_sum / count,
                col: col_sum / count,
            },
        })
    }

    /// Number of member pixels.
    #[must_use]
    #[rustfmt::skip]
    pub fn size(&self) -> usize { self.size }

    /// Mean feature vector over the member pixels.
    #[must_use]
    #[rustfmt::skip]
    pub fn average(&self) -> &[f32] { &self.average }

    /// Mean member coordinate.
    #[must_use]
    #[rustfmt::skip]
    pub fn centroid(&self) -> Centroid { self.centroid }
}

#[derive(Clone, Debug)]
struct SegmentEntry {
    pixels: Vec<Pixel>,
    summary: OnceLock<Option<SegmentSummary>>,
}

impl SegmentEntry {
    fn new(pixels: Vec<Pixel>) -> Self {
        Self {
            pixels,
            summary: OnceLock::new(),
        }
    }
}

/// A full-size colour rendering of a segmentation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OverlayImage {
    shape: GridShape,
    pixels: Vec<Rgb>,
}

impl OverlayImage {
    /// Grid dimensions.
    #[must_use]
    #[rustfmt::skip]
    pub fn shape(&self) -> GridShape { self.shape }

    /// Colour at `pixel`, or `None` outside the grid.
    #[must_use]
    pub fn get(&self, pixel: Pixel) -> Option<Rgb> {
        self.shape
            .contains(pixel)
            .then(|| self.pixels[self.shape.index_of(pixel)])
    }

    /// Row-major colours.
    #[must_use]
    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    /// Interleaved `r, g, b` bytes in row-major order.
    #[must_use]
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|rgb| rgb.0).collect()
    }
}

/// The partition of a grid into segments plus derived queries.
///
/// The result borrows the source grid it was computed from; the grid must
/// outlive it and is only read.
///
/// # Examples
/// ```
/// use graphseg_core::{FeatureGrid, GridShape, LabelGrid, SegmentId, SegmentationResult};
///
/// let grid = FeatureGrid::new(1, 3, 1, vec![1.0, 3.0, 10.0])?;
/// let labels = LabelGrid::new(GridShape::new(1, 3)?, [4, 4, 9].map(SegmentId::new).to_vec())?;
/// let result = SegmentationResult::from_label_grid(&grid, labels)?;
///
/// let left = SegmentId::new(4);
/// assert_eq!(result.segment_count(), 2);
/// assert_eq!(result.average_color(left)?, &[2.0]);
/// assert_eq!(result.centroid(left)?.col, 0.5);
/// assert!(result.pixels_of(SegmentId::new(1)).is_err());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug)]
pub struct SegmentationResult<'g> {
    source: &'g FeatureGrid,
    labels: LabelGrid,
    segments: BTreeMap<SegmentId, SegmentEntry>,
}

impl<'g> SegmentationResult<'g> {
    /// Builds the reverse mapping from a label grid, preserving its ids.
    ///
    /// # Errors
    /// Returns [`SegmentationError::ShapeMismatch`] when the label grid and
    /// the source grid differ in size.
    pub fn from_label_grid(source: &'g FeatureGrid, labels: LabelGrid) -> Result<Self> {
        let shape = source.shape();
        if labels.shape() != shape {
            return Err(SegmentationError::ShapeMismatch {
                expected: shape.len(),
                actual: labels.shape().len(),
            });
        }
        let mut members: BTreeMap<SegmentId, Vec<Pixel>> = BTreeMap::new();
        for (index, &id) in labels.as_slice().iter().enumerate() {
            members.entry(id).or_default().push(shape.pixel_at(index));
        }
        let segments = members
            .into_iter()
            .map(|(id, pixels)| (id, SegmentEntry::new(pixels)))
            .collect();
        Ok(Self {
            source,
            labels,
            segments,
        })
    }

    /// Builds the result from a finished forest over the source pixels.
    ///
    /// # Errors
    /// Returns [`SegmentationError::ShapeMismatch`] when the forest does not
    /// track one node per pixel.
    pub fn from_forest(
        source: &'g FeatureGrid,
        forest: &DisjointSetForest,
        mode: LabelMode,
    ) -> Result<Self> {
        let labels = LabelGrid::from_forest(source.shape(), forest, mode)?;
        Self::from_label_grid(source, labels)
    }

    /// Builds the result from an external pixel-to-segment map, preserving
    /// its ids. The map must assign every pixel exactly once.
    ///
    /// # Errors
    /// Returns [`SegmentationError::PixelOutOfBounds`] for keys outside the
    /// grid and [`SegmentationError::MissingPixel`] for pixels without an id.
    pub fn from_pixel_map<S: BuildHasher>(
        source: &'g FeatureGrid,
        map: &HashMap<Pixel, SegmentId, S>,
    ) -> Result<Self> {
        let shape = source.shape();
        if let Some(&pixel) = map.keys().find(|pixel| !shape.contains(**pixel)) {
            return Err(SegmentationError::PixelOutOfBounds {
                pixel,
                rows: shape.rows(),
                cols: shape.cols(),
            });
        }
        let labels = shape
            .pixels()
            .map(|pixel| {
                map.get(&pixel)
                    .copied()
                    .ok_or(SegmentationError::MissingPixel { pixel })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_label_grid(source, LabelGrid::new(shape, labels)?)
    }

    /// The grid the result was computed from.
    #[must_use]
    #[rustfmt::skip]
    pub fn source(&self) -> &'g FeatureGrid { self.source }

    /// The dense label grid.
    #[must_use]
    #[rustfmt::skip]
    pub fn labels(&self) -> &LabelGrid { &self.labels }

    /// Consumes the result, yielding the label grid.
    #[must_use]
    pub fn into_labels(self) -> LabelGrid {
        self.labels
    }

    /// The distinct segment ids in ascending order.
    pub fn segment_ids(&self) -> impl ExactSizeIterator<Item = SegmentId> + '_ {
        self.segments.keys().copied()
    }

    /// Number of distinct segments.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Returns `true` when `id` names a segment of this result.
    #[must_use]
    pub fn contains(&self, id: SegmentId) -> bool {
        self.segments.contains_key(&id)
    }

    /// Member pixels of `id` in row-major order.
    ///
    /// # Errors
    /// Returns [`SegmentQueryError::UnknownSegment`] when `id` is absent.
    pub fn pixels_of(&self, id: SegmentId) -> QueryResult<&[Pixel]> {
        self.entry(id).map(|entry| entry.pixels.as_slice())
    }

    /// Number of member pixels of `id`.
    ///
    /// # Errors
    /// Returns [`SegmentQueryError::UnknownSegment`] when `id` is absent.
    pub fn size_of(&self, id: SegmentId) -> QueryResult<usize> {
        self.entry(id).map(|entry| entry.pixels.len())
    }

    /// Size, mean feature vector and centroid of `id`.
    ///
    /// # Errors
    /// Returns [`SegmentQueryError::UnknownSegment`] when `id` is absent and
    /// [`SegmentQueryError::EmptySegment`] when it has no members.
    pub fn summary(&self, id: SegmentId) -> QueryResult<&SegmentSummary> {
        let entry = self.entry(id)?;
        entry
            .summary
            .get_or_init(|| SegmentSummary::from_pixels(self.source, &entry.pixels))
            .as_ref()
            .ok_or(SegmentQueryError::EmptySegment { id })
    }

    /// Mean of the source channel values over the members of `id`.
    ///
    /// # Errors
    /// Same conditions as [`Self::summary`].
    pub fn average_color(&self, id: SegmentId) -> QueryResult<&[f32]> {
        self.summary(id).map(SegmentSummary::average)
    }

    /// Mean row and column over the members of `id`.
    ///
    /// # Errors
    /// Same conditions as [`Self::summary`].
    pub fn centroid(&self, id: SegmentId) -> QueryResult<Centroid> {
        self.summary(id).map(SegmentSummary::centroid)
    }

    /// Marks pixels whose 4-neighbourhood contains a different segment id.
    #[must_use]
    pub fn boundary_mask(&self) -> Vec<bool> {
        let shape = self.labels.shape();
        let labels = self.labels.as_slice();
        let (rows, cols) = (shape.rows(), shape.cols());
        let mut mask = vec![false; labels.len()];
        for row in 0..rows {
            for col in 0..cols {
                let here = row * cols + col;
                if col + 1 < cols && labels[here] != labels[here + 1] {
                    mask[here] = true;
                    mask[here + 1] = true;
                }
                if row + 1 < rows && labels[here] != labels[here + cols] {
                    mask[here] = true;
                    mask[here + cols] = true;
                }
            }
        }
        mask
    }

    /// Renders every pixel in its segment's palette colour.
    #[must_use]
    pub fn overlay(&self, palette: &mut SegmentPalette) -> OverlayImage {
        let pixels = self
            .labels
            .as_slice()
            .iter()
            .map(|&id| palette.color_for(id))
            .collect();
        OverlayImage {
            shape: self.labels.shape(),
            pixels,
        }
    }

    /// Renders segments like [`Self::overlay`] and paints boundary pixels
    /// with `boundary`.
    #[must_use]
    pub fn overlay_with_boundaries(
        &self,
        palette: &mut SegmentPalette,
        boundary: Rgb,
    ) -> OverlayImage {
        let mut image = self.overlay(palette);
        for (pixel, is_boundary) in image.pixels.iter_mut().zip(self.boundary_mask()) {
            if is_boundary {
                *pixel = boundary;
            }
        }
        image
    }

    fn entry(&self, id: SegmentId) -> QueryResult<&SegmentEntry> {
        self.segments
            .get(&id)
            .ok_or(SegmentQueryError::UnknownSegment { id })
    }
}
