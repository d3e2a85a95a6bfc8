//! Disjoint-set forest over dense pixel indices.
//!
//! Each component carries its size and an internal merge threshold. The
//! forest is an arena of parallel vectors indexed by node id; roots own the
//! component metadata and stale entries on non-root nodes are never read.
//!
//! `find` compresses every visited node directly onto the root and `union`
//! attaches the smaller component under the larger one, so both run in
//! near-constant amortised time.

/// Partition of `0..len` into components with per-component size and
/// merge threshold.
///
/// # Examples
/// ```
/// use graphseg_core::DisjointSetForest;
///
/// let mut forest = DisjointSetForest::new(3, 1.0);
/// let root = forest.union(0, 1, 0.5, 1.0).expect("distinct components");
/// assert_eq!(forest.size_of(root), 2);
/// assert_eq!(forest.threshold_of(root), 1.0);
/// assert_eq!(forest.component_count(), 2);
/// assert!(forest.union(1, 0, 0.5, 1.0).is_none());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct DisjointSetForest {
    parent: Vec<usize>,
    size: Vec<usize>,
    threshold: Vec<f32>,
    components: usize,
}

impl DisjointSetForest {
    /// Creates `len` singleton components, each with size one and the given
    /// initial threshold.
    #[must_use]
    pub fn new(len: usize, initial_threshold: f32) -> Self {
        Self {
            parent: (0..len).collect(),
            size: vec![1; len],
            threshold: vec![initial_threshold; len],
            components: len,
        }
    }

    /// Number of nodes tracked by the forest.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    /// Returns `true` when the forest tracks no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Number of disjoint components.
    #[must_use]
    #[rustfmt::skip]
    pub fn component_count(&self) -> usize { self.components }

    /// Returns the root of `node`'s component, re-parenting every node on the
    /// path directly to the root.
    ///
    /// # Panics
    /// Panics when `node >= self.len()`.
    pub fn find(&mut self, node: usize) -> usize {
        let root = self.representative(node);
        let mut current = node;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }
        root
    }

    /// Returns the root of `node`'s component without modifying the forest.
    ///
    /// # Panics
    /// Panics when `node >= self.len()`.
    #[must_use]
    pub fn representative(&self, node: usize) -> usize {
        assert!(
            node < self.parent.len(),
            "node {node} is outside a forest of {} nodes",
            self.parent.len()
        );
        let mut root = node;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        root
    }

    /// Returns `true` when both nodes share a component.
    ///
    /// # Panics
    /// Panics when either node is out of range.
    pub fn same_component(&mut self, left: usize, right: usize) -> bool {
        self.find(left) == self.find(right)
    }

    /// Merges the components of `left` and `right` after an edge of
    /// `weight` joined them.
    ///
    /// The smaller component is attached under the larger one; equal sizes
    /// keep the lower root index as parent. The merged threshold becomes
    /// `min(weight, threshold(left), threshold(right)) + granularity / size`.
    ///
    /// Returns the new root, or `None` when both nodes were already in the
    /// same component.
    ///
    /// # Panics
    /// Panics when either node is out of range.
    pub fn union(
        &mut self,
        left: usize,
        right: usize,
        weight: f32,
        granularity: f32,
    ) -> Option<usize> {
        let left_root = self.find(left);
        let right_root = self.find(right);
        if left_root == right_root {
            return None;
        }

        let (parent, child) = choose_parent_child(
            left_root,
            right_root,
            self.size[left_root],
            self.size[right_root],
        );

        let merged_size = self.size[parent] + self.size[child];
        let floor = weight
            .min(self.threshold[parent])
            .min(self.threshold[child]);

        self.parent[child] = parent;
        self.size[parent] = merged_size;
        self.threshold[parent] = floor + granularity / merged_size as f32;
        self.components -= 1;
        Some(parent)
    }

    /// Size of the component rooted at `root`.
    ///
    /// The value is only meaningful for roots.
    ///
    /// # Panics
    /// Panics when `root` is out of range.
    #[must_use]
    pub fn size_of(&self, root: usize) -> usize {
        self.size[root]
    }

    /// Internal merge threshold of the component rooted at `root`.
    ///
    /// The value is only meaningful for roots.
    ///
    /// # Panics
    /// Panics when `root` is out of range.
    #[must_use]
    pub fn threshold_of(&self, root: usize) -> f32 {
        self.threshold[root]
    }

    /// Points every node directly at its root.
    pub fn flatten(&mut self) {
        for node in 0..self.parent.len() {
            self.find(node);
        }
    }

    /// Returns the component roots in ascending order.
    #[must_use]
    pub fn roots(&self) -> Vec<usize> {
        (0..self.parent.len())
            .filter(|&node| self.parent[node] == node)
            .collect()
    }
}

fn choose_parent_child(
    left_root: usize,
    right_root: usize,
    left_size: usize,
    right_size: usize,
) -> (usize, usize) {
    if left_size > right_size {
        return (left_root, right_root);
    }
    if right_size > left_size {
        return (right_root, left_root);
    }
    if left_root <= right_root {
        (left_root, right_root)
    } else {
        (right_root, left_root)
    }
}

#[cfg(test)]
mod tests;
