//! Stability based selection of flat clusters from the dendrogram.
//!
//! Every merge holding at least `min_cluster_size` points is a candidate cluster, scored by
//! `size / distance`: the density at which it forms, weighted by its size. This is a
//! simplification of the excess of mass integral over a condensed tree. Candidates are then
//! taken greedily from most to least stable, skipping any that overlap a cluster already
//! taken.
//!
//! Lambda grows much faster than size as merges get tighter, so small dense merges usually
//! outscore the larger merges containing them. Points on the sparse fringe of a blob then end
//! up as noise.

use crate::hierarchy::Hierarchy;
use crate::model::{Cluster, CondensedNode};
use num_traits::Float;
use std::cmp::Ordering;
use tracing::trace;

/// Floor on merge distances, so zero distance merges get a large but finite lambda.
const LAMBDA_DISTANCE_FLOOR: f64 = 1e-10;

pub(crate) struct Extraction<T> {
    pub(crate) labels: Vec<i32>,
    pub(crate) probabilities: Vec<T>,
    pub(crate) clusters: Vec<Cluster<T>>,
    pub(crate) condensed_tree: Vec<CondensedNode<T>>,
}

pub(crate) struct StabilityExtractor<'a, T> {
    hierarchy: &'a Hierarchy<T>,
    min_cluster_size: usize,
}

impl<'a, T: Float> StabilityExtractor<'a, T> {
    pub(crate) fn new(hierarchy: &'a Hierarchy<T>, min_cluster_size: usize) -> Self {
        Self {
            hierarchy,
            min_cluster_size,
        }
    }

    pub(crate) fn extract_winning_clusters(&self) -> Extraction<T> {
        let n_samples = self.hierarchy.n_samples();
        let condensed_tree = self.condense_tree();

        let mut candidates: Vec<&CondensedNode<T>> = condensed_tree.iter().collect();
        // Stable, so equally stable candidates stay in merge order
        candidates.sort_by(|a, b| {
            b.stability
                .partial_cmp(&a.stability)
                .unwrap_or(Ordering::Equal)
        });

        let mut labels = vec![-1; n_samples];
        let mut probabilities = vec![T::zero(); n_samples];
        let mut clusters: Vec<Cluster<T>> = Vec::new();

        for candidate in candidates {
            let members = self.hierarchy.leaves(candidate.node_id);
            if members.iter().any(|&member| labels[member] != -1) {
                trace!(
                    node_id = candidate.node_id,
                    "candidate overlaps a selected cluster"
                );
                continue;
            }
            let cluster_id = clusters.len();
            let label = cluster_id as i32;
            for &member in &members {
                labels[member] = label;
                probabilities[member] = T::one();
            }
            clusters.push(Cluster {
                cluster_id,
                node_id: candidate.node_id,
                size: members.len(),
                members,
                stability: candidate.stability,
            });
        }

        Extraction {
            labels,
            probabilities,
            clusters,
            condensed_tree,
        }
    }

    /// The merges large enough to be clusters, in merge order, with their stabilities.
    fn condense_tree(&self) -> Vec<CondensedNode<T>> {
        let parents = self.find_parents();
        self.hierarchy
            .dendrogram()
            .iter()
            .filter(|node| node.size >= self.min_cluster_size)
            .map(|node| {
                let lambda = self.calc_lambda(node.distance);
                CondensedNode {
                    node_id: node.id,
                    parent_node_id: parents[node.id],
                    lambda,
                    size: node.size,
                    stability: lambda * T::from(node.size).unwrap_or_else(T::one),
                }
            })
            .collect()
    }

    fn find_parents(&self) -> Vec<Option<usize>> {
        let n_ids = self.hierarchy.n_samples() + self.hierarchy.dendrogram().len();
        let mut parents = vec![None; n_ids];
        for node in self.hierarchy.dendrogram() {
            parents[node.left] = Some(node.id);
            parents[node.right] = Some(node.id);
        }
        parents
    }

    fn calc_lambda(&self, dist: T) -> T {
        let floor = T::from(LAMBDA_DISTANCE_FLOOR).unwrap_or_else(T::epsilon);
        T::one() / dist.max(floor)
    }
}
