//! Segment identifiers and the dense label grid.

use std::{collections::BTreeSet, fmt};

use crate::{
    Result,
    error::SegmentationError,
    forest::DisjointSetForest,
    grid::{GridShape, Pixel},
};

/// Identifier assigned to a segment once segmentation finishes.
///
/// # Examples
/// ```
/// use graphseg_core::SegmentId;
///
/// let id = SegmentId::new(4);
/// assert_eq!(id.get(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentId(u64);

impl SegmentId {
    /// Creates a segment identifier.
    #[rustfmt::skip]
    #[must_use]
    pub const fn new(id: u64) -> Self { Self(id) }

    /// Returns the underlying numeric identifier.
    #[rustfmt::skip]
    #[must_use]
    pub const fn get(self) -> u64 { self.0 }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How segment ids are derived from the finished forest.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum LabelMode {
    /// Ids `0..N-1`, numbered by first appearance in row-major order.
    #[default]
    Dense,
    /// The linear index of each component's representative pixel.
    Representative,
}

/// One segment id per pixel, stored row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelGrid {
    shape: GridShape,
    labels: Vec<SegmentId>,
}

impl LabelGrid {
    /// Wraps an existing row-major label buffer without relabelling.
    ///
    /// # Errors
    /// Returns [`SegmentationError::ShapeMismatch`] when `labels` does not hold
    /// exactly one id per pixel.
    pub fn new(shape: GridShape, labels: Vec<SegmentId>) -> Result<Self> {
        if labels.len() != shape.len() {
            return Err(SegmentationError::ShapeMismatch {
                expected: shape.len(),
                actual: labels.len(),
            });
        }
        Ok(Self { shape, labels })
    }

    /// Reads component membership from a finished forest.
    ///
    /// # Errors
    /// Returns [`SegmentationError::ShapeMismatch`] when the forest does not
    /// track exactly one node per pixel.
    pub fn from_forest(
        shape: GridShape,
        forest: &DisjointSetForest,
        mode: LabelMode,
    ) -> Result<Self> {
        if forest.len() != shape.len() {
            return Err(SegmentationError::ShapeMismatch {
                expected: shape.len(),
                actual: forest.len(),
            });
        }
        let roots = (0..shape.len()).map(|node| forest.representative(node));
        let labels = match mode {
            LabelMode::Representative => roots.map(|root| SegmentId(root as u64)).collect(),
            LabelMode::Dense => densify(roots, shape.len()),
        };
        Ok(Self { shape, labels })
    }

    /// Grid dimensions.
    #[must_use]
    #[rustfmt::skip]
    pub const fn shape(&self) -> GridShape { self.shape }

    /// Segment id at `pixel`, or `None` outside the grid.
    #[must_use]
    pub fn get(&self, pixel: Pixel) -> Option<SegmentId> {
        self.shape
            .contains(pixel)
            .then(|| self.labels[self.shape.index_of(pixel)])
    }

    /// The row-major label buffer.
    #[must_use]
    pub fn as_slice(&self) -> &[SegmentId] {
        &self.labels
    }

    /// The distinct segment ids.
    #[must_use]
    pub fn segment_ids(&self) -> BTreeSet<SegmentId> {
        self.labels.iter().copied().collect()
    }

    /// Number of distinct segment ids.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.segment_ids().len()
    }

    /// Returns a copy relabelled to `0..N-1` by first appearance in row-major
    /// order. The partition is unchanged.
    ///
    /// # Examples
    /// ```
    /// use graphseg_core::{GridShape, LabelGrid, SegmentId};
    ///
    /// let shape = GridShape::new(1, 3)?;
    /// let ids = [7, 7, 2].map(SegmentId::new).to_vec();
    /// let dense = LabelGrid::new(shape, ids)?.densified();
    /// assert_eq!(dense.as_slice(), &[0, 0, 1].map(SegmentId::new));
    /// # Ok::<(), graphseg_core::SegmentationError>(())
    /// ```
    #[must_use]
    pub fn densified(&self) -> Self {
        let mut mapping = std::collections::HashMap::new();
        let labels = self
            .labels
            .iter()
            .map(|&id| {
                let next = SegmentId(mapping.len() as u64);
                *mapping.entry(id).or_insert(next)
            })
            .collect();
        Self {
            shape: self.shape,
            labels,
        }
    }
}

fn densify(roots: impl Iterator<Item = usize>, node_count: usize) -> Vec<SegmentId> {
    let mut assigned: Vec<Option<SegmentId>> = vec![None; node_count];
    let mut next = 0u64;
    roots
        .map(|root| {
            *assigned[root].get_or_insert_with(|| {
                let id = SegmentId(next);
                next += 1;
                id
            })
        })
        .collect()
}
