use crate::model::{Model, Prediction};
use crate::validation::DataValidator;
use crate::HdbscanError;
use num_traits::Float;
use tracing::instrument;

/// Assigns points that weren't part of fitting to the clusters of a fitted model.
///
/// Each query point takes the label of its nearest training point, as long as it lies within
/// that point's core distance, i.e. somewhere the training point considers dense. Its
/// probability falls linearly from 1 at the training point to 0 at the edge of the core
/// distance. Points further away, or whose nearest training point is noise, are noise.
///
/// The nearest neighbour search compares each query with every training point. For large
/// query batches, index the training data with a [`crate::KdTree`] instead.
///
/// # Parameters
/// * `model` - the fitted model.
/// * `query` - the points to label. Must have the dimensionality of the training data.
/// * `training` - the data the model was fitted on, in the same order.
///
/// # Returns
/// * A label and probability for each query point, or an error if the training data doesn't
///   match the model or the query data is malformed.
///
/// # Examples
/// ```
///use densitree::{fit, predict, HdbscanHyperParams};
///
///let data: Vec<Vec<f64>> = vec![
///    vec![1.0, 1.0],
///    vec![1.1, 1.0],
///    vec![1.0, 1.1],
///    vec![5.0, 5.0],
///    vec![5.1, 5.0],
///    vec![5.0, 5.1],
///];
///let hp = HdbscanHyperParams::builder().min_cluster_size(3).min_samples(2).build().unwrap();
///let model = fit(&data, &hp).unwrap();
///let prediction = predict(&model, &[vec![1.0, 1.0], vec![20.0, 20.0]], &data).unwrap();
///assert_eq!(model.labels()[0], prediction.labels[0]);
///assert_eq!(1.0, prediction.probabilities[0]);
///assert_eq!(-1, prediction.labels[1]);
/// ```
#[instrument(
    level = "debug",
    skip_all,
    fields(n_queries = query.len(), n_training = training.len())
)]
pub fn predict<T: Float>(
    model: &Model<T>,
    query: &[Vec<T>],
    training: &[Vec<T>],
) -> Result<Prediction<T>, HdbscanError> {
    let predictor = ClusterPredictor::new(model, training)?;
    let validator = DataValidator::new(query);
    match training.first() {
        Some(first) => validator.validate_against_dims(first.len())?,
        None => validator.validate_input_data()?,
    }

    let (labels, probabilities) = query
        .iter()
        .map(|point| predictor.predict_point(point))
        .unzip();
    Ok(Prediction {
        labels,
        probabilities,
    })
}

struct ClusterPredictor<'a, T> {
    model: &'a Model<T>,
    training: &'a [Vec<T>],
}

impl<'a, T: Float> ClusterPredictor<'a, T> {
    fn new(model: &'a Model<T>, training: &'a [Vec<T>]) -> Result<Self, HdbscanError> {
        if training.len() != model.labels().len() {
            return Err(HdbscanError::TrainingSizeMismatch {
                expected: model.labels().len(),
                got: training.len(),
            });
        }
        DataValidator::new(training).validate_input_data()?;
        Ok(Self { model, training })
    }

    fn predict_point(&self, point: &[T]) -> (i32, T) {
        let Some((nearest, distance)) = self.find_nearest(point) else {
            return (-1, T::zero());
        };
        let label = self.model.labels()[nearest];
        let core_distance = self.model.core_distances()[nearest];
        if label == -1 || distance > core_distance {
            return (-1, T::zero());
        }
        let probability = if core_distance > T::zero() {
            (T::one() - distance / core_distance).max(T::zero())
        } else {
            // Only reachable when the query sits exactly on the training point
            T::one()
        };
        (label, probability)
    }

    /// Ties go to the lowest index.
    fn find_nearest(&self, point: &[T]) -> Option<(usize, T)> {
        let metric = self.model.dist_metric();
        self.training
            .iter()
            .enumerate()
            .map(|(index, other)| (index, metric.calc_dist(point, other)))
            .fold(None, |nearest, (index, distance)| match nearest {
                Some((_, nearest_distance)) if nearest_distance <= distance => nearest,
                _ => Some((index, distance)),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{fit, HdbscanHyperParams};

    fn training_data() -> Vec<Vec<f64>> {
        vec![
            vec![0.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
            vec![10.0, 10.0],
            vec![10.0, 11.0],
            vec![11.0, 10.0],
            vec![11.0, 11.0],
            vec![50.0, -50.0],
        ]
    }

    fn fitted_model(data: &[Vec<f64>]) -> Model<f64> {
        let hp = HdbscanHyperParams::builder()
            .min_cluster_size(4)
            .min_samples(2)
            .build()
            .unwrap();
        fit(data, &hp).unwrap()
    }

    #[test]
    fn identical_point_has_full_probability() {
        let data = training_data();
        let model = fitted_model(&data);
        let prediction = predict(&model, &[vec![10.0, 11.0]], &data).unwrap();
        assert_eq!(vec![model.labels()[5]], prediction.labels);
        assert_ne!(-1, prediction.labels[0]);
        assert_eq!(vec![1.0], prediction.probabilities);
    }

    #[test]
    fn probability_falls_with_distance() {
        let data = training_data();
        let model = fitted_model(&data);
        // Core distance of every corner point is 1
        assert_eq!(1.0, model.core_distances()[0]);
        let query = vec![vec![-0.5, 0.0], vec![-0.9, 0.0]];
        let prediction = predict(&model, &query, &data).unwrap();
        assert_eq!(vec![model.labels()[0]; 2], prediction.labels);
        assert!((prediction.probabilities[0] - 0.5).abs() < 1e-12);
        assert!((prediction.probabilities[1] - 0.1).abs() < 1e-12);
    }

    #[test]
    fn far_points_and_noise_neighbours_are_noise() {
        let data = training_data();
        let model = fitted_model(&data);
        assert_eq!(-1, model.labels()[8]);
        let query = vec![vec![-3.0, -3.0], vec![50.0, -50.0]];
        let prediction = predict(&model, &query, &data).unwrap();
        assert_eq!(vec![-1, -1], prediction.labels);
        assert_eq!(vec![0.0, 0.0], prediction.probabilities);
    }

    #[test]
    fn training_data_must_match_model() {
        let data = training_data();
        let model = fitted_model(&data);
        let result = predict(&model, &[vec![0.0, 0.0]], &data[..5]);
        assert_eq!(
            Err(HdbscanError::TrainingSizeMismatch {
                expected: 9,
                got: 5,
            }),
            result
        );
    }

    #[test]
    fn query_dimensions_must_match_training() {
        let data = training_data();
        let model = fitted_model(&data);
        let result = predict(&model, &[vec![0.0, 0.0, 0.0]], &data);
        assert!(matches!(result, Err(HdbscanError::WrongDimension { .. })));
        let result = predict(&model, &[vec![f64::NAN, 0.0]], &data);
        assert_eq!(Err(HdbscanError::NonFiniteCoordinate { index: 0 }), result);
    }

    #[test]
    fn empty_query() {
        let data = training_data();
        let model = fitted_model(&data);
        let prediction = predict(&model, &[], &data).unwrap();
        assert!(prediction.labels.is_empty());
        assert!(prediction.probabilities.is_empty());
    }
}
