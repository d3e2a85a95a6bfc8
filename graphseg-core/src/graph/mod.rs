//! Weighted pixel-adjacency graphs.
//!
//! [`build_grid_edges`] turns a [`FeatureGrid`] into one undirected edge per
//! adjacent pixel pair. [`EdgeList::from_edges`] accepts caller-supplied
//! edges for graphs that are not pixel grids.

mod dissimilarity;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::instrument;

use crate::{Result, error::SegmentationError, grid::FeatureGrid};

pub use self::dissimilarity::{Dissimilarity, Euclidean, WeightedEuclidean};

/// Which neighbouring pixels are considered adjacent.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Connectivity {
    /// Horizontal and vertical neighbours.
    Four,
    /// Horizontal, vertical and diagonal neighbours.
    #[default]
    Eight,
}

impl Connectivity {
    /// Neighbour offsets `(row, col)` visited from each pixel so that every
    /// undirected pair is produced exactly once.
    const fn forward_offsets(self) -> &'static [(isize, isize)] {
        match self {
            Self::Four => &[(0, 1), (1, 0)],
            Self::Eight => &[(0, 1), (1, 0), (1, 1), (-1, 1)],
        }
    }

    /// Number of edges produced for a `rows x cols` grid.
    ///
    /// # Examples
    /// ```
    /// use graphseg_core::Connectivity;
    ///
    /// assert_eq!(Connectivity::Four.edge_count(3, 4), 3 * 4 * 2 - 3 - 4);
    /// assert_eq!(Connectivity::Eight.edge_count(3, 4), 17 + 2 * 2 * 3);
    /// ```
    #[must_use]
    pub const fn edge_count(self, rows: usize, cols: usize) -> usize {
        if rows == 0 || cols == 0 {
            return 0;
        }
        let axial = rows * cols * 2 - rows - cols;
        match self {
            Self::Four => axial,
            Self::Eight => axial + 2 * (rows - 1) * (cols - 1),
        }
    }
}

/// An undirected weighted edge in canonical form (`source < target`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    source: usize,
    target: usize,
    weight: f32,
}

impl Edge {
    /// Creates an edge, ordering the endpoints canonically.
    #[must_use]
    pub fn new(a: usize, b: usize, weight: f32) -> Self {
        let (source, target) = if a <= b { (a, b) } else { (b, a) };
        Self {
            source,
            target,
            weight,
        }
    }

    /// The smaller endpoint.
    #[must_use]
    #[rustfmt::skip]
    pub fn source(&self) -> usize { self.source }

    /// The larger endpoint.
    #[must_use]
    #[rustfmt::skip]
    pub fn target(&self) -> usize { self.target }

    /// The dissimilarity between the endpoints.
    #[must_use]
    #[rustfmt::skip]
    pub fn weight(&self) -> f32 { self.weight }
}

/// A validated edge sequence over `node_count` nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeList {
    node_count: usize,
    edges: Vec<Edge>,
}

impl EdgeList {
    /// Validates caller-supplied edges.
    ///
    /// Self-edges are dropped; the remaining edges keep their input order,
    /// which decides ties during segmentation.
    ///
    /// # Errors
    /// Returns [`SegmentationError::EmptyGraph`] when `node_count == 0`,
    /// [`SegmentationError::InvalidNodeId`] for endpoints outside the graph
    /// and [`SegmentationError::NonFiniteWeight`] for negative or non-finite
    /// weights.
    pub fn from_edges(node_count: usize, edges: Vec<Edge>) -> Result<Self> {
        if node_count == 0 {
            return Err(SegmentationError::EmptyGraph);
        }
        let mut accepted = Vec::with_capacity(edges.len());
        for edge in edges {
            validate_edge(&edge, node_count)?;
            if edge.source != edge.target {
                accepted.push(edge);
            }
        }
        Ok(Self {
            node_count,
            edges: accepted,
        })
    }

    /// Number of nodes in the graph.
    #[must_use]
    #[rustfmt::skip]
    pub fn node_count(&self) -> usize { self.node_count }

    /// The edges in construction order.
    #[must_use]
    #[rustfmt::skip]
    pub fn edges(&self) -> &[Edge] { &self.edges }

    /// Number of edges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Returns `true` when the graph has no edges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Consumes the list, yielding the raw edges.
    #[must_use]
    pub fn into_edges(self) -> Vec<Edge> {
        self.edges
    }
}

fn validate_edge(edge: &Edge, node_count: usize) -> Result<()> {
    for node in [edge.source, edge.target] {
        if node >= node_count {
            return Err(SegmentationError::InvalidNodeId { node, node_count });
        }
    }
    if !edge.weight.is_finite() || edge.weight < 0.0 {
        return Err(SegmentationError::NonFiniteWeight {
            source_node: edge.source,
            target_node: edge.target,
            weight: edge.weight,
        });
    }
    Ok(())
}

/// Builds one edge per adjacent pixel pair, weighted by `metric`.
///
/// Edges are emitted in row-major order of their first pixel, visiting the
/// right, lower, lower-right and upper-right neighbours in that order (the
/// diagonals only for [`Connectivity::Eight`]). The output is a pure function
/// of the grid.
///
/// # Examples
/// ```
/// use graphseg_core::{Connectivity, Euclidean, FeatureGrid, build_grid_edges};
///
/// let grid = FeatureGrid::new(2, 3, 1, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0])?;
/// let edges = build_grid_edges(&grid, Connectivity::Four, &Euclidean)?;
/// assert_eq!(edges.len(), 7);
/// assert_eq!(edges.edges()[0].weight(), 1.0);
/// # Ok::<(), graphseg_core::SegmentationError>(())
/// ```
///
/// # Errors
/// Returns [`SegmentationError::ChannelMismatch`] when the metric rejects the
/// grid's channel count and [`SegmentationError::NonFiniteWeight`] when the
/// metric yields a negative or non-finite weight.
#[instrument(
    name = "core.build_grid_edges",
    err,
    skip(grid, connectivity, metric),
    fields(rows = grid.shape().rows(), cols = grid.shape().cols(), connectivity = ?connectivity),
)]
pub fn build_grid_edges<M>(
    grid: &FeatureGrid,
    connectivity: Connectivity,
    metric: &M,
) -> Result<EdgeList>
where
    M: Dissimilarity + ?Sized,
{
    metric.validate(grid.channels())?;
    let shape = grid.shape();
    let rows = shape.rows();

    let weigh_row = |row: usize| -> Result<Vec<Edge>> {
        let mut edges = Vec::new();
        for col in 0..shape.cols() {
            let here = row * shape.cols() + col;
            for &(dr, dc) in connectivity.forward_offsets() {
                let Some(next_row) = row.checked_add_signed(dr).filter(|&r| r < rows) else {
                    continue;
                };
                let Some(next_col) = col.checked_add_signed(dc).filter(|&c| c < shape.cols())
                else {
                    continue;
                };
                let there = next_row * shape.cols() + next_col;
                let weight = metric.dissimilarity(grid.feature(here), grid.feature(there));
                let edge = Edge::new(here, there, weight);
                validate_edge(&edge, shape.len())?;
                edges.push(edge);
            }
        }
        Ok(edges)
    };

    #[cfg(feature = "parallel")]
    let per_row: Vec<Vec<Edge>> = (0..rows)
        .into_par_iter()
        .map(weigh_row)
        .collect::<Result<_>>()?;
    #[cfg(not(feature = "parallel"))]
    let per_row: Vec<Vec<Edge>> = (0..rows).map(weigh_row).collect::<Result<_>>()?;

    let mut edges = Vec::with_capacity(connectivity.edge_count(rows, shape.cols()));
    for row_edges in per_row {
        edges.extend(row_edges);
    }
    Ok(EdgeList {
        node_count: shape.len(),
        edges,
    })
}
