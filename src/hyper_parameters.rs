use crate::core_distances::NnAlgorithm;
use crate::distance::DistanceMetric;
use crate::HdbscanError;
use num_traits::Float;

// Defaults for parameters
const MIN_CLUSTER_SIZE_DEFAULT: usize = 5;
const NN_ALGORITHM_DEFAULT: NnAlgorithm = NnAlgorithm::Auto;

// Valid minimums/left bounds of parameters
const MIN_CLUSTER_SIZE_MINIMUM: usize = 1;
const MIN_SAMPLES_MINIMUM: usize = 1;

/// A wrapper around the various hyper parameters used in HDBSCAN clustering.
/// Only use if you want to tune hyper parameters. Otherwise use `Hdbscan::default_hyper_params()`
/// to instantiate the model with default hyper parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HdbscanHyperParams<T> {
    pub(crate) min_cluster_size: usize,
    pub(crate) min_samples: usize,
    pub(crate) dist_metric: DistanceMetric<T>,
    pub(crate) nn_algo: NnAlgorithm,
}

/// Builder object to set custom hyper parameters.
#[derive(Debug, Clone)]
pub struct HyperParamBuilder<T> {
    min_cluster_size: Option<usize>,
    min_samples: Option<usize>,
    dist_metric: Option<DistanceMetric<T>>,
    nn_algo: Option<NnAlgorithm>,
}

impl<T: Float> Default for HdbscanHyperParams<T> {
    fn default() -> Self {
        Self {
            min_cluster_size: MIN_CLUSTER_SIZE_DEFAULT,
            min_samples: MIN_CLUSTER_SIZE_DEFAULT,
            dist_metric: DistanceMetric::default(),
            nn_algo: NN_ALGORITHM_DEFAULT,
        }
    }
}

impl<T: Float> HdbscanHyperParams<T> {
    /// Enters the builder pattern, allowing custom hyper parameters to be set using
    /// various setter methods.
    ///
    /// # Returns
    /// * the hyper parameter configuration builder
    pub fn builder() -> HyperParamBuilder<T> {
        HyperParamBuilder {
            min_cluster_size: None,
            min_samples: None,
            dist_metric: None,
            nn_algo: None,
        }
    }

    /// The minimum number of points a cluster must contain.
    pub fn min_cluster_size(&self) -> usize {
        self.min_cluster_size
    }

    /// The neighbour count used for core distances.
    pub fn min_samples(&self) -> usize {
        self.min_samples
    }

    /// The distance metric used between data points.
    pub fn dist_metric(&self) -> &DistanceMetric<T> {
        &self.dist_metric
    }

    /// The nearest neighbour algorithm used for core distances.
    pub fn nn_algorithm(&self) -> &NnAlgorithm {
        &self.nn_algo
    }
}

impl<T: Float> HyperParamBuilder<T> {
    /// Sets the minimum cluster size - the minimum number of samples for a group of
    /// data points to be considered a cluster. If a grouping of data points has fewer
    /// members than this, then they will be considered noise.
    /// This should be considered the main hyper parameter for changing the results of clustering.
    /// Must be at least 1. Defaults to 5.
    ///
    /// # Parameters
    /// * min_cluster_size - the minimum cluster size
    ///
    /// # Returns
    /// * the hyper parameter configuration builder
    pub fn min_cluster_size(mut self, min_cluster_size: usize) -> HyperParamBuilder<T> {
        self.min_cluster_size = Some(min_cluster_size);
        self
    }

    /// Sets min samples. HDBSCAN calculates the core distances between points as a first step
    /// in clustering. The core distance is the distance to the Kth neighbour (not counting the
    /// point itself), where k = min_samples. Defaults to min_cluster_size.
    ///
    /// # Parameters
    /// * min_samples - the number of neighbourhood points considered in distances
    ///
    /// # Returns
    /// * the hyper parameter configuration builder
    pub fn min_samples(mut self, min_samples: usize) -> HyperParamBuilder<T> {
        self.min_samples = Some(min_samples);
        self
    }

    /// Sets the distance metric. HDBSCAN uses this metric to calculate the distance between
    /// data points. Defaults to Euclidean. Options are defined by the DistanceMetric enum, and
    /// can also be parsed from their names, e.g. `"manhattan".parse()`.
    ///
    /// # Parameters
    /// * dist_metric - the distance metric
    ///
    /// # Returns
    /// * the hyper parameter configuration builder
    pub fn dist_metric(mut self, dist_metric: DistanceMetric<T>) -> HyperParamBuilder<T> {
        self.dist_metric = Some(dist_metric);
        self
    }

    /// Sets the nearest neighbour algorithm used to calculate core distances.
    /// The primary reason for changing this parameter is performance. BruteForce sorts the
    /// distances from each point to every other point, which scales poorly. The KD-tree only
    /// speeds up core distances: building the minimum spanning tree still considers every
    /// pair of points.
    /// Defaults to Auto, whereby the algorithm is chosen based on the size of the data and
    /// whether the distance metric can prune the tree.
    ///
    /// # Returns
    /// * the hyper parameter configuration builder
    pub fn nn_algorithm(mut self, nn_algorithm: NnAlgorithm) -> HyperParamBuilder<T> {
        self.nn_algo = Some(nn_algorithm);
        self
    }

    /// Finishes the building of the hyper parameter configuration. A call to this method is
    /// required to exit the builder pattern and complete the construction of the hyper parameters.
    ///
    /// # Returns
    /// * The completed HDBSCAN hyper parameter configuration, or an error if a parameter is
    ///   out of its valid range.
    ///
    /// # Examples
    /// ```
    ///use densitree::{HdbscanError, HdbscanHyperParams};
    ///
    ///let result = HdbscanHyperParams::<f64>::builder().min_cluster_size(0).build();
    ///assert!(matches!(result, Err(HdbscanError::InvalidMinClusterSize { got: 0 })));
    /// ```
    pub fn build(self) -> Result<HdbscanHyperParams<T>, HdbscanError> {
        let min_cluster_size = self.min_cluster_size.unwrap_or(MIN_CLUSTER_SIZE_DEFAULT);
        if min_cluster_size < MIN_CLUSTER_SIZE_MINIMUM {
            return Err(HdbscanError::InvalidMinClusterSize {
                got: min_cluster_size,
            });
        }
        let min_samples = self.min_samples.unwrap_or(min_cluster_size);
        if min_samples < MIN_SAMPLES_MINIMUM {
            return Err(HdbscanError::InvalidMinSamples { got: min_samples });
        }
        let dist_metric = self.dist_metric.unwrap_or_default();
        dist_metric.validate()?;

        Ok(HdbscanHyperParams {
            min_cluster_size,
            min_samples,
            dist_metric,
            nn_algo: self.nn_algo.unwrap_or(NN_ALGORITHM_DEFAULT),
        })
    }
}
