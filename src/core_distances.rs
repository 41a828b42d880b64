use crate::{DistanceMetric, HdbscanError};
use num_traits::Float;
use std::cmp::Ordering;
use std::str::FromStr;
use tracing::{debug, warn};

#[cfg(feature = "parallel")]
pub(crate) mod parallel;
pub(crate) mod serial;

/// Up to this many samples, `Auto` sorts pairwise distances rather than building a tree.
pub(crate) const BRUTE_FORCE_N_SAMPLES_LIMIT: usize = 250;

/// The nearest neighbour algorithm options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NnAlgorithm {
    /// HDBSCAN internally selects the nearest neighbour algorithm based on size of the input
    /// data and the distance metric
    Auto,
    /// Sorts the distances from each point to all others
    BruteForce,
    /// K-dimensional tree algorithm. Falls back to exhaustive search for distance metrics
    /// that cannot prune the tree.
    KdTree,
}

impl NnAlgorithm {
    /// Picks a concrete algorithm for a data set.
    pub(crate) fn resolve<T: Float>(
        self,
        n_samples: usize,
        dist_metric: &DistanceMetric<T>,
    ) -> NnAlgorithm {
        match self {
            NnAlgorithm::Auto
                if n_samples <= BRUTE_FORCE_N_SAMPLES_LIMIT
                    || !dist_metric.supports_tree_pruning() =>
            {
                NnAlgorithm::BruteForce
            }
            NnAlgorithm::Auto => NnAlgorithm::KdTree,
            NnAlgorithm::KdTree if !dist_metric.supports_tree_pruning() => {
                debug!(
                    metric = %dist_metric.name(),
                    "metric cannot prune a kd-tree, neighbour searches will be exhaustive"
                );
                NnAlgorithm::KdTree
            }
            other => other,
        }
    }
}

impl FromStr for NnAlgorithm {
    type Err = HdbscanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(NnAlgorithm::Auto),
            "kdtree" | "kd_tree" | "kd-tree" => Ok(NnAlgorithm::KdTree),
            "standard" | "brute_force" | "brute" => Ok(NnAlgorithm::BruteForce),
            _ => Err(HdbscanError::UnknownAlgorithm {
                name: s.to_string(),
            }),
        }
    }
}

/// The neighbour rank used for core distances. A point can have at most `n - 1` neighbours,
/// so larger values of min samples are clamped.
pub(crate) fn effective_k(min_samples: usize, n_samples: usize) -> usize {
    let max_k = n_samples.saturating_sub(1);
    if min_samples > max_k {
        warn!(
            min_samples,
            n_samples, "min_samples exceeds the number of neighbours available, clamping to {max_k}"
        );
        max_k
    } else {
        min_samples
    }
}

/// The k-th smallest distance, counting from 0. Each point's distance to itself is included,
/// so index k is the k-th nearest neighbour excluding the point.
pub(crate) fn kth_smallest<T: Float>(distances: &mut [T], k: usize) -> T {
    if distances.is_empty() {
        return T::zero();
    }
    let k = k.min(distances.len() - 1);
    let (_, kth, _) = distances
        .select_nth_unstable_by(k, |a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    *kth
}
