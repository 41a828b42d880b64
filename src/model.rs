use crate::hierarchy::Hierarchy;
use crate::predict;
use crate::stability::Extraction;
use crate::{DistanceMetric, HdbscanError, HdbscanHyperParams, NnAlgorithm};
use num_traits::Float;

/// A merge in the dendrogram large enough to be considered as a cluster.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CondensedNode<T> {
    /// The id of the dendrogram merge.
    pub node_id: usize,
    /// The id of the merge this one is absorbed into, `None` for the root.
    pub parent_node_id: Option<usize>,
    /// The density at which the merge happens, `1 / distance`.
    pub lambda: T,
    /// The number of data points beneath the merge.
    pub size: usize,
    /// `lambda * size`
    pub stability: T,
}

/// A cluster selected from the hierarchy.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cluster<T> {
    /// The cluster's label. Labels count up from 0 in order of selection, so the most stable
    /// cluster is 0.
    pub cluster_id: usize,
    /// The id of the dendrogram merge the cluster was selected from.
    pub node_id: usize,
    /// Indices of the data points in the cluster.
    pub members: Vec<usize>,
    /// The stability score the cluster was selected on.
    pub stability: T,
    /// The number of data points in the cluster.
    pub size: usize,
}

/// Cluster assignments for points that weren't part of fitting.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Prediction<T> {
    /// A cluster label per query point, -1 for noise.
    pub labels: Vec<i32>,
    /// Confidence in each label, between 0 and 1.
    pub probabilities: Vec<T>,
}

/// The result of fitting HDBSCAN to a data set. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Model<T> {
    labels: Vec<i32>,
    probabilities: Vec<T>,
    hierarchy: Hierarchy<T>,
    condensed_tree: Vec<CondensedNode<T>>,
    stabilities: Vec<Cluster<T>>,
    core_distances: Vec<T>,
    min_cluster_size: usize,
    min_samples: usize,
    dist_metric: DistanceMetric<T>,
    nn_algorithm: NnAlgorithm,
}

impl<T: Float> Model<T> {
    pub(crate) fn new(
        extraction: Extraction<T>,
        hierarchy: Hierarchy<T>,
        core_distances: Vec<T>,
        hp: &HdbscanHyperParams<T>,
    ) -> Self {
        Self {
            labels: extraction.labels,
            probabilities: extraction.probabilities,
            hierarchy,
            condensed_tree: extraction.condensed_tree,
            stabilities: extraction.clusters,
            core_distances,
            min_cluster_size: hp.min_cluster_size,
            min_samples: hp.min_samples,
            dist_metric: hp.dist_metric.clone(),
            nn_algorithm: hp.nn_algo,
        }
    }

    /// The model for a data set too small to hold a single cluster: every point is noise.
    /// No core distances are calculated, so they are all zero.
    pub(crate) fn all_noise(n_samples: usize, hp: &HdbscanHyperParams<T>) -> Self {
        Self {
            labels: vec![-1; n_samples],
            probabilities: vec![T::zero(); n_samples],
            hierarchy: Hierarchy::empty(n_samples),
            condensed_tree: Vec::new(),
            stabilities: Vec::new(),
            core_distances: vec![T::zero(); n_samples],
            min_cluster_size: hp.min_cluster_size,
            min_samples: hp.min_samples,
            dist_metric: hp.dist_metric.clone(),
            nn_algorithm: hp.nn_algo,
        }
    }

    /// A cluster label per data point. Labels count up from 0, and -1 means the point is
    /// noise.
    pub fn labels(&self) -> &[i32] {
        &self.labels
    }

    pub(crate) fn into_labels(self) -> Vec<i32> {
        self.labels
    }

    /// Membership confidence per data point: 1 for points in a cluster, 0 for noise.
    pub fn probabilities(&self) -> &[T] {
        &self.probabilities
    }

    /// The single linkage dendrogram of the mutual reachability minimum spanning tree.
    pub fn hierarchy(&self) -> &Hierarchy<T> {
        &self.hierarchy
    }

    /// Merges large enough to be clusters, with their stability scores.
    pub fn condensed_tree(&self) -> &[CondensedNode<T>] {
        &self.condensed_tree
    }

    /// The selected clusters, indexed by cluster label.
    pub fn stabilities(&self) -> &[Cluster<T>] {
        &self.stabilities
    }

    /// Each data point's distance to its `min_samples`-th nearest neighbour.
    pub fn core_distances(&self) -> &[T] {
        &self.core_distances
    }

    /// The number of clusters found.
    pub fn n_clusters(&self) -> usize {
        self.stabilities.len()
    }

    /// The number of data points labelled noise.
    pub fn n_noise(&self) -> usize {
        self.labels.iter().filter(|&&label| label == -1).count()
    }

    pub fn min_cluster_size(&self) -> usize {
        self.min_cluster_size
    }

    pub fn min_samples(&self) -> usize {
        self.min_samples
    }

    pub fn dist_metric(&self) -> &DistanceMetric<T> {
        &self.dist_metric
    }

    /// The nearest neighbour algorithm requested at fit time, before `Auto` is resolved.
    pub fn nn_algorithm(&self) -> NnAlgorithm {
        self.nn_algorithm
    }

    /// Assigns new points to the clusters of this model. See [`crate::predict`].
    ///
    /// # Parameters
    /// * `query` - the points to label.
    /// * `training` - the data the model was fitted on.
    pub fn predict(
        &self,
        query: &[Vec<T>],
        training: &[Vec<T>],
    ) -> Result<Prediction<T>, HdbscanError> {
        predict::predict(self, query, training)
    }
}
