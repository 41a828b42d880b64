//! Minimum spanning tree over the mutual reachability graph, built with Kruskal's algorithm.
//!
//! Every pair of points is enumerated, so both time and memory are O(n²) whichever nearest
//! neighbour algorithm calculated the core distances.

use crate::data_wrappers::MstEdge;
use crate::distance::DistanceMetric;
use crate::union_find::UnionFind;
use num_traits::Float;
use std::cmp::Ordering;
use tracing::trace;

pub(crate) struct MstBuilder<'a, T> {
    data: &'a [Vec<T>],
    core_distances: &'a [T],
    dist_metric: &'a DistanceMetric<T>,
}

impl<'a, T: Float> MstBuilder<'a, T> {
    pub(crate) fn new(
        data: &'a [Vec<T>],
        core_distances: &'a [T],
        dist_metric: &'a DistanceMetric<T>,
    ) -> Self {
        Self {
            data,
            core_distances,
            dist_metric,
        }
    }

    /// `max(core(a), core(b), dist(a, b))`
    pub(crate) fn calc_mutual_reachability_dist(&self, a: usize, b: usize) -> T {
        let core_dist_a = self.core_distances[a];
        let core_dist_b = self.core_distances[b];
        let dist_a_b = self.dist_metric.calc_dist(&self.data[a], &self.data[b]);

        core_dist_a.max(core_dist_b).max(dist_a_b)
    }

    /// The minimum spanning tree's `n - 1` edges, in ascending order of distance.
    pub(crate) fn kruskals_min_spanning_tree(&self) -> Vec<MstEdge<T>> {
        let mut edges = self.calc_all_edges();
        sort_edges_by_dist(&mut edges);
        kruskal(edges, self.data.len())
    }

    fn calc_all_edges(&self) -> Vec<MstEdge<T>> {
        let n_samples = self.data.len();
        let mut edges = Vec::with_capacity(n_samples * n_samples.saturating_sub(1) / 2);
        for left_node_id in 0..n_samples {
            edges.extend(self.calc_row_edges(left_node_id));
        }
        edges
    }

    fn calc_row_edges(&self, left: usize) -> impl Iterator<Item = MstEdge<T>> + '_ {
        (left + 1..self.data.len()).map(move |right| MstEdge {
            left_node_id: left,
            right_node_id: right,
            distance: self.calc_mutual_reachability_dist(left, right),
        })
    }
}

#[cfg(feature = "parallel")]
impl<'a, T: Float + Send + Sync> MstBuilder<'a, T> {
    /// Same tree as [`Self::kruskals_min_spanning_tree`]. Edge weights are computed in
    /// parallel, collected in enumeration order and stable sorted, so ties resolve identically.
    pub(crate) fn kruskals_min_spanning_tree_par(&self) -> Vec<MstEdge<T>> {
        use rayon::prelude::*;

        let mut edges: Vec<MstEdge<T>> = (0..self.data.len())
            .into_par_iter()
            .flat_map_iter(|left_node_id| self.calc_row_edges(left_node_id))
            .collect();
        edges.par_sort_by(compare_edges);
        kruskal(edges, self.data.len())
    }
}

/// Stable sort, so equal distances keep their enumeration order.
pub(crate) fn sort_edges_by_dist<T: Float>(edges: &mut [MstEdge<T>]) {
    edges.sort_by(compare_edges);
}

fn compare_edges<T: Float>(a: &MstEdge<T>, b: &MstEdge<T>) -> Ordering {
    a.distance
        .partial_cmp(&b.distance)
        .unwrap_or(Ordering::Equal)
}

/// Accepts sorted edges joining two separate components until every point is connected.
fn kruskal<T: Float>(sorted_edges: Vec<MstEdge<T>>, n_samples: usize) -> Vec<MstEdge<T>> {
    let n_edges = n_samples.saturating_sub(1);
    let mut union_find = UnionFind::new(n_samples);
    let mut mst = Vec::with_capacity(n_edges);

    for edge in sorted_edges {
        if mst.len() == n_edges {
            break;
        }
        if union_find
            .union(edge.left_node_id, edge.right_node_id)
            .is_some()
        {
            mst.push(edge);
        }
    }
    trace!(
        n_edges = mst.len(),
        n_components = union_find.n_components(),
        "kruskal finished"
    );
    mst
}
