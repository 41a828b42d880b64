//! Single linkage dendrogram built from the minimum spanning tree.
//!
//! Leaves are the data points `0..n`. Each merge gets the next id from `n` upwards, so a
//! merge's id minus `n` is its position in the dendrogram and lookups by id are O(1).

use crate::data_wrappers::MstEdge;
use crate::mst::sort_edges_by_dist;
use crate::union_find::UnionFind;
use num_traits::Float;

/// A merge of two clusters in the dendrogram.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DendrogramNode<T> {
    /// The merge's id. Always at least the number of data points.
    pub id: usize,
    /// Id of the first merged child, either a data point or an earlier merge.
    pub left: usize,
    /// Id of the second merged child, either a data point or an earlier merge.
    pub right: usize,
    /// The mutual reachability distance at which the children merge.
    pub distance: T,
    /// The number of data points beneath this merge.
    pub size: usize,
}

/// The single linkage hierarchy of a fitted model.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hierarchy<T> {
    n_samples: usize,
    dendrogram: Vec<DendrogramNode<T>>,
    linkage_matrix: Vec<[T; 4]>,
}

impl<T: Float> Hierarchy<T> {
    pub(crate) fn empty(n_samples: usize) -> Self {
        Self {
            n_samples,
            dendrogram: Vec::new(),
            linkage_matrix: Vec::new(),
        }
    }

    /// The merges in the order they happen, i.e. by ascending distance.
    pub fn dendrogram(&self) -> &[DendrogramNode<T>] {
        &self.dendrogram
    }

    /// The dendrogram as rows of `[left, right, distance, size]`, the layout used by SciPy.
    pub fn linkage_matrix(&self) -> &[[T; 4]] {
        &self.linkage_matrix
    }

    /// The number of data points (leaves) in the hierarchy.
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Whether no merges were made, either because fitting short-circuited or there were
    /// fewer than two data points.
    pub fn is_empty(&self) -> bool {
        self.dendrogram.is_empty()
    }

    /// Whether an id refers to a data point rather than a merge.
    pub fn is_leaf(&self, id: usize) -> bool {
        id < self.n_samples
    }

    /// Looks up a merge by its id.
    pub fn node(&self, id: usize) -> Option<&DendrogramNode<T>> {
        id.checked_sub(self.n_samples)
            .and_then(|position| self.dendrogram.get(position))
    }

    /// The final merge, which contains every data point.
    pub fn root(&self) -> Option<&DendrogramNode<T>> {
        self.dendrogram.last()
    }

    /// The number of data points beneath a node. Leaves have size 1.
    pub fn size_of(&self, id: usize) -> usize {
        if self.is_leaf(id) {
            1
        } else {
            self.node(id).map_or(0, |node| node.size)
        }
    }

    /// The data points beneath a node, found with an explicit stack rather than recursion.
    pub fn leaves(&self, id: usize) -> Vec<usize> {
        let mut leaves = Vec::with_capacity(self.size_of(id));
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if self.is_leaf(current) {
                leaves.push(current);
            } else if let Some(node) = self.node(current) {
                stack.push(node.right);
                stack.push(node.left);
            }
        }
        leaves
    }
}

pub(crate) struct HierarchyBuilder {
    n_samples: usize,
}

impl HierarchyBuilder {
    pub(crate) fn new(n_samples: usize) -> Self {
        Self { n_samples }
    }

    /// Merges clusters in ascending order of edge distance. Each point's current top level
    /// cluster is tracked through the union find root of its component.
    pub(crate) fn make_single_linkage_tree<T: Float>(&self, mst: &[MstEdge<T>]) -> Hierarchy<T> {
        let n_samples = self.n_samples;
        let mut edges = mst.to_vec();
        sort_edges_by_dist(&mut edges);

        let mut union_find = UnionFind::new(n_samples);
        let mut cluster_of_root: Vec<usize> = (0..n_samples).collect();
        let mut sizes = vec![1_usize; n_samples];
        sizes.reserve(n_samples.saturating_sub(1));
        let mut dendrogram: Vec<DendrogramNode<T>> =
            Vec::with_capacity(n_samples.saturating_sub(1));

        for edge in edges {
            let left_root = union_find.find(edge.left_node_id);
            let right_root = union_find.find(edge.right_node_id);
            let Some(new_root) = union_find.union(left_root, right_root) else {
                continue;
            };
            let left = cluster_of_root[left_root];
            let right = cluster_of_root[right_root];
            let id = n_samples + dendrogram.len();
            let size = sizes[left] + sizes[right];

            dendrogram.push(DendrogramNode {
                id,
                left,
                right,
                distance: edge.distance,
                size,
            });
            sizes.push(size);
            cluster_of_root[new_root] = id;
        }

        let linkage_matrix = dendrogram.iter().map(linkage_row).collect();
        Hierarchy {
            n_samples,
            dendrogram,
            linkage_matrix,
        }
    }
}

fn linkage_row<T: Float>(node: &DendrogramNode<T>) -> [T; 4] {
    let as_float = |n: usize| T::from(n).unwrap_or_else(T::nan);
    [
        as_float(node.left),
        as_float(node.right),
        node.distance,
        as_float(node.size),
    ]
}
