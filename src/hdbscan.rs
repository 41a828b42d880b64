#[cfg(feature = "parallel")]
use crate::core_distances::parallel::CoreDistanceCalculatorPar;
use crate::core_distances::serial::CoreDistanceCalculator;
use crate::data_wrappers::MstEdge;
use crate::hierarchy::HierarchyBuilder;
use crate::model::{Model, Prediction};
use crate::mst::MstBuilder;
use crate::stability::StabilityExtractor;
use crate::validation::DataValidator;
use crate::{predict, HdbscanError, HdbscanHyperParams};
use num_traits::Float;
use std::borrow::Cow;
use tracing::{debug, instrument};

/// The HDBSCAN clustering algorithm in Rust. Generic over floating point numeric types.
///
/// Holds the data to cluster and, once [`Hdbscan::fit`] has been called, the fitted
/// [`Model`]. Prediction and model access before fitting return [`HdbscanError::NotFitted`].
#[derive(Debug, Clone)]
pub struct Hdbscan<'a, T: Float> {
    data: Cow<'a, [Vec<T>]>,
    hp: HdbscanHyperParams<T>,
    model: Option<Model<T>>,
}

impl<'a, T: Float> Hdbscan<'a, T> {
    /// Creates an instance of HDBSCAN clustering model using a custom hyper parameter
    /// configuration.
    ///
    /// # Parameters
    /// * `data` - a reference to the data to cluster, a collection of vectors of floating points
    ///            numbers. The vectors must all be of the same dimensionality and contain no
    ///            infinite values.
    /// * `config` - the hyper parameter configuration.
    ///
    /// # Returns
    /// * The HDBSCAN model instance.
    ///
    /// # Examples
    /// ```
    ///use densitree::{DistanceMetric, Hdbscan, HdbscanHyperParams, NnAlgorithm};
    ///
    ///let data: Vec<Vec<f32>> = vec![
    ///    vec![1.3, 1.1],
    ///    vec![1.3, 1.2],
    ///    vec![1.0, 1.1],
    ///    vec![1.2, 1.2],
    ///    vec![0.9, 1.0],
    ///    vec![0.9, 1.0],
    ///    vec![3.7, 4.0],
    ///    vec![3.9, 3.9],
    ///];
    ///let config = HdbscanHyperParams::builder()
    ///    .min_cluster_size(3)
    ///    .min_samples(2)
    ///    .dist_metric(DistanceMetric::Manhattan)
    ///    .nn_algorithm(NnAlgorithm::BruteForce)
    ///    .build()
    ///    .unwrap();
    ///let clusterer = Hdbscan::new(&data, config);
    /// ```
    pub fn new(data: &'a [Vec<T>], hyper_params: HdbscanHyperParams<T>) -> Self {
        Hdbscan {
            data: Cow::Borrowed(data),
            hp: hyper_params,
            model: None,
        }
    }

    /// Creates an instance of HDBSCAN clustering model using the default hyper parameters.
    ///
    /// # Parameters
    /// * `data` - a reference to the data to cluster, a collection of vectors of floating points
    ///            numbers. The vectors must all be of the same dimensionality and contain no
    ///            infinite values.
    ///
    /// # Returns
    /// * The HDBSCAN model instance.
    pub fn default_hyper_params(data: &'a [Vec<T>]) -> Self {
        Hdbscan::new(data, HdbscanHyperParams::default())
    }

    /// The data being clustered. After [`Hdbscan::partial_fit`] this includes the new points.
    pub fn data(&self) -> &[Vec<T>] {
        &self.data
    }

    pub fn hyper_params(&self) -> &HdbscanHyperParams<T> {
        &self.hp
    }

    pub fn is_fitted(&self) -> bool {
        self.model.is_some()
    }

    /// The fitted model.
    ///
    /// # Returns
    /// * The model from the latest call to [`Hdbscan::fit`] or [`Hdbscan::partial_fit`], or
    ///   [`HdbscanError::NotFitted`] if neither has succeeded yet.
    pub fn model(&self) -> Result<&Model<T>, HdbscanError> {
        self.model.as_ref().ok_or(HdbscanError::NotFitted)
    }

    /// Performs clustering on the list of vectors passed to the constructor and stores the
    /// resulting model.
    ///
    /// # Returns
    /// * A result that, if successful, contains the fitted model. An error is returned if the
    ///   dimensionality of the input vectors is mismatched or if any vector contains non-finite
    ///   coordinates. A data set with fewer points than the minimum cluster size is not an
    ///   error: every point is labelled noise.
    ///
    /// # Examples
    /// ```
    ///use std::collections::HashSet;
    ///use densitree::Hdbscan;
    ///
    ///let data: Vec<Vec<f32>> = vec![
    ///    vec![1.5, 2.2],
    ///    vec![1.0, 1.1],
    ///    vec![1.2, 1.4],
    ///    vec![0.8, 1.0],
    ///    vec![1.1, 1.0],
    ///    vec![3.7, 4.0],
    ///    vec![3.9, 3.9],
    ///    vec![3.6, 4.1],
    ///    vec![3.8, 3.9],
    ///    vec![4.0, 4.1],
    ///    vec![10.0, 10.0],
    ///];
    ///let mut clusterer = Hdbscan::default_hyper_params(&data);
    ///let model = clusterer.fit().unwrap();
    ///assert_eq!(data.len(), model.labels().len());
    ///let clustered: usize = model.stabilities().iter().map(|c| c.size).sum();
    ///assert_eq!(data.len(), model.n_noise() + clustered);
    /// ```
    pub fn fit(&mut self) -> Result<&Model<T>, HdbscanError> {
        let model = fit(&self.data, &self.hp)?;
        Ok(&*self.model.insert(model))
    }

    /// Performs clustering without storing the model, returning only the labels.
    ///
    /// # Returns
    /// * A result that, if successful, contains a cluster label per data point. Non-negative
    ///   integers mean a data point belongs to a cluster of that label. -1 labels mean that a
    ///   data point is noise and does not belong to any cluster.
    pub fn cluster(&self) -> Result<Vec<i32>, HdbscanError> {
        fit(&self.data, &self.hp).map(Model::into_labels)
    }

    /// Adds new points to the data and fits again over all of it. The previous model is
    /// replaced, not updated: this is a full re-fit. If the new points are invalid, the data
    /// and any previous model are left unchanged.
    ///
    /// # Examples
    /// ```
    ///use densitree::{Hdbscan, HdbscanHyperParams};
    ///
    ///let data = vec![vec![0.0, 0.0], vec![0.0, 0.1], vec![0.1, 0.0]];
    ///let hp = HdbscanHyperParams::builder().min_cluster_size(3).build().unwrap();
    ///let mut clusterer = Hdbscan::new(&data, hp);
    ///clusterer.fit().unwrap();
    ///
    ///let model = clusterer.partial_fit(&[vec![9.0, 9.0], vec![9.1, 9.0]]).unwrap();
    ///assert_eq!(5, model.labels().len());
    ///assert_eq!(5, clusterer.data().len());
    /// ```
    pub fn partial_fit(&mut self, new_points: &[Vec<T>]) -> Result<&Model<T>, HdbscanError> {
        let mut combined = Vec::with_capacity(self.data.len() + new_points.len());
        combined.extend_from_slice(&self.data);
        combined.extend_from_slice(new_points);
        let model = fit(&combined, &self.hp)?;
        debug!(
            n_new = new_points.len(),
            n_samples = combined.len(),
            "refitted with new points"
        );
        self.data = Cow::Owned(combined);
        Ok(&*self.model.insert(model))
    }

    /// Assigns new points to the clusters of the fitted model. See [`crate::predict`].
    pub fn predict(&self, query: &[Vec<T>]) -> Result<Prediction<T>, HdbscanError> {
        predict(self.model()?, query, &self.data)
    }
}

#[cfg(feature = "parallel")]
impl<'a, T: Float + Send + Sync> Hdbscan<'a, T> {
    /// Same as [`Hdbscan::fit`], computing core distances and edge weights in parallel. The
    /// result is identical. Not recommended for small datasets.
    pub fn fit_par(&mut self) -> Result<&Model<T>, HdbscanError> {
        let model = fit_par(&self.data, &self.hp)?;
        Ok(&*self.model.insert(model))
    }

    /// Same as [`Hdbscan::cluster`], with some parallelism.
    pub fn cluster_par(&self) -> Result<Vec<i32>, HdbscanError> {
        fit_par(&self.data, &self.hp).map(Model::into_labels)
    }
}

/// Fits HDBSCAN to a data set.
///
/// # Parameters
/// * `data` - the points to cluster, all of the same dimensionality with finite coordinates.
/// * `hp` - the hyper parameter configuration.
///
/// # Returns
/// * The fitted model, or an error if the data is malformed. Fewer points than the minimum
///   cluster size gives a model where every point is noise.
///
/// # Examples
/// ```
///use densitree::{fit, HdbscanHyperParams};
///
///let data = vec![vec![0.0, 0.0], vec![1000.0, 1000.0], vec![0.1, 0.1], vec![1000.1, 1000.0]];
///let hp = HdbscanHyperParams::builder().min_cluster_size(5).build().unwrap();
///let model = fit(&data, &hp).unwrap();
///assert_eq!(0, model.n_clusters());
///assert_eq!(vec![-1; 4], model.labels());
///assert!(model.hierarchy().is_empty());
/// ```
#[instrument(
    level = "debug",
    skip_all,
    fields(
        n_samples = data.len(),
        min_cluster_size = hp.min_cluster_size,
        min_samples = hp.min_samples,
        metric = %hp.dist_metric.name(),
    )
)]
pub fn fit<T: Float>(
    data: &[Vec<T>],
    hp: &HdbscanHyperParams<T>,
) -> Result<Model<T>, HdbscanError> {
    validate_fit_input(data, hp)?;
    if data.len() < hp.min_cluster_size {
        debug!("fewer points than min_cluster_size, every point is noise");
        return Ok(Model::all_noise(data.len(), hp));
    }
    let core_distances = CoreDistanceCalculator::new(data, hp).calc_core_distances();
    debug!("calculated core distances");
    let min_spanning_tree = MstBuilder::new(data, &core_distances, &hp.dist_metric)
        .kruskals_min_spanning_tree();
    let model = build_model(data.len(), hp, core_distances, &min_spanning_tree);
    Ok(model)
}

/// Same as [`fit`], computing core distances and edge weights in parallel.
#[cfg(feature = "parallel")]
#[instrument(
    level = "debug",
    skip_all,
    fields(
        n_samples = data.len(),
        min_cluster_size = hp.min_cluster_size,
        min_samples = hp.min_samples,
        metric = %hp.dist_metric.name(),
    )
)]
pub fn fit_par<T: Float + Send + Sync>(
    data: &[Vec<T>],
    hp: &HdbscanHyperParams<T>,
) -> Result<Model<T>, HdbscanError> {
    validate_fit_input(data, hp)?;
    if data.len() < hp.min_cluster_size {
        debug!("fewer points than min_cluster_size, every point is noise");
        return Ok(Model::all_noise(data.len(), hp));
    }
    let core_distances = CoreDistanceCalculatorPar::new(data, hp)
        .calc_core_distances();
    debug!("calculated core distances");
    let min_spanning_tree = MstBuilder::new(data, &core_distances, &hp.dist_metric)
        .kruskals_min_spanning_tree_par();
    let model = build_model(data.len(), hp, core_distances, &min_spanning_tree);
    Ok(model)
}

fn validate_fit_input<T: Float>(
    data: &[Vec<T>],
    hp: &HdbscanHyperParams<T>,
) -> Result<(), HdbscanError> {
    if hp.min_cluster_size == 0 {
        return Err(HdbscanError::InvalidMinClusterSize { got: 0 });
    }
    if hp.min_samples == 0 {
        return Err(HdbscanError::InvalidMinSamples { got: 0 });
    }
    hp.dist_metric.validate()?;
    DataValidator::new(data).validate_input_data()
}

fn build_model<T: Float>(
    n_samples: usize,
    hp: &HdbscanHyperParams<T>,
    core_distances: Vec<T>,
    min_spanning_tree: &[MstEdge<T>],
) -> Model<T> {
    debug!(
        n_edges = min_spanning_tree.len(),
        "built minimum spanning tree"
    );
    let hierarchy = HierarchyBuilder::new(n_samples)
        .make_single_linkage_tree(min_spanning_tree);
    debug!(
        n_merges = hierarchy.dendrogram().len(),
        "built single linkage tree"
    );
    let extraction = StabilityExtractor::new(&hierarchy, hp.min_cluster_size)
        .extract_winning_clusters();
    let model = Model::new(extraction, hierarchy, core_distances, hp);
    debug!(
        n_clusters = model.n_clusters(),
        n_noise = model.n_noise(),
        "extracted clusters"
    );
    model
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DistanceMetric;

    fn cluster_test_data() -> Vec<Vec<f32>> {
        vec![
            vec![1.5, 2.2],
            vec![1.0, 1.1],
            vec![1.2, 1.4],
            vec![0.8, 1.0],
            vec![1.1, 1.0],
            vec![3.7, 4.0],
            vec![3.9, 3.9],
            vec![3.6, 4.1],
            vec![3.8, 3.9],
            vec![4.0, 4.1],
            vec![10.0, 10.0],
        ]
    }

    #[test]
    fn not_fitted() {
        let data = cluster_test_data();
        let clusterer = Hdbscan::default_hyper_params(&data);
        assert!(!clusterer.is_fitted());
        assert_eq!(Err(HdbscanError::NotFitted), clusterer.model().map(|_| ()));
        assert_eq!(
            Err(HdbscanError::NotFitted),
            clusterer.predict(&[vec![1.0, 1.0]]).map(|_| ())
        );
    }

    #[test]
    fn fit_stores_model() {
        let data = cluster_test_data();
        let mut clusterer = Hdbscan::default_hyper_params(&data);
        let labels = clusterer.fit().unwrap().labels().to_vec();
        assert!(clusterer.is_fitted());
        assert_eq!(labels, clusterer.cluster().unwrap());
        assert_eq!(labels, clusterer.model().unwrap().labels());
    }

    #[test]
    fn failed_partial_fit_keeps_previous_state() {
        let data = cluster_test_data();
        let mut clusterer = Hdbscan::default_hyper_params(&data);
        let before = clusterer.fit().unwrap().clone();
        let result = clusterer.partial_fit(&[vec![1.0]]);
        let expected = HdbscanError::WrongDimension {
            index: 11,
            expected: 2,
            got: 1,
        };
        assert_eq!(Err(expected), result.map(|_| ()));
        assert_eq!(data.len(), clusterer.data().len());
        assert_eq!(&before, clusterer.model().unwrap());
    }

    #[test]
    fn partial_fit_from_unfitted() {
        let data = cluster_test_data();
        let mut clusterer = Hdbscan::default_hyper_params(&data[..6]);
        let model = clusterer.partial_fit(&data[6..]).unwrap().clone();
        let refit = fit(&data, clusterer.hyper_params()).unwrap();
        assert_eq!(refit, model);
    }

    #[test]
    fn invalid_hyper_params_are_rejected_at_fit() {
        let data = cluster_test_data();
        let hp = HdbscanHyperParams {
            dist_metric: DistanceMetric::Minkowski(-1.0),
            ..HdbscanHyperParams::default()
        };
        assert!(fit(&data, &hp).unwrap_err().is_configuration_error());
        let hp = HdbscanHyperParams {
            min_cluster_size: 0,
            ..HdbscanHyperParams::default()
        };
        assert_eq!(
            Err(HdbscanError::InvalidMinClusterSize { got: 0 }),
            fit(&data, &hp).map(|_| ())
        );
    }

    #[test]
    fn empty_data_is_all_noise() {
        let data: Vec<Vec<f32>> = Vec::new();
        let model = fit(&data, &HdbscanHyperParams::default()).unwrap();
        assert!(model.labels().is_empty());
        assert_eq!(0, model.n_clusters());
    }

    #[test]
    fn single_point() {
        let data = vec![vec![1.0_f64, 2.0]];
        let hp = HdbscanHyperParams::builder()
            .min_cluster_size(1)
            .build()
            .unwrap();
        let model = fit(&data, &hp).unwrap();
        assert_eq!(vec![-1], model.labels());
        assert_eq!(vec![0.0], model.core_distances());
        assert!(model.hierarchy().is_empty());
    }
}
