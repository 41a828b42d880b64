use super::{effective_k, kth_smallest, NnAlgorithm};
use crate::distance::DistanceMetric;
use crate::kd_tree::KdTree;
use crate::HdbscanHyperParams;
use num_traits::Float;

pub(crate) struct CoreDistanceCalculator<'a, T> {
    data: &'a [Vec<T>],
    nn_algo: NnAlgorithm,
    dist_metric: &'a DistanceMetric<T>,
    k: usize,
}

impl<'a, T: Float> CoreDistanceCalculator<'a, T> {
    pub(crate) fn new(data: &'a [Vec<T>], hp: &'a HdbscanHyperParams<T>) -> Self {
        Self {
            data,
            nn_algo: hp.nn_algo.resolve(data.len(), &hp.dist_metric),
            dist_metric: &hp.dist_metric,
            k: effective_k(hp.min_samples, data.len()),
        }
    }

    pub(crate) fn calc_core_distances(&self) -> Vec<T> {
        match self.nn_algo {
            NnAlgorithm::KdTree => self.calc_core_distances_kd_tree(),
            NnAlgorithm::Auto | NnAlgorithm::BruteForce => self.calc_core_distances_brute_force(),
        }
    }

    fn calc_core_distances_brute_force(&self) -> Vec<T> {
        self.data
            .iter()
            .map(|point| {
                let mut distances: Vec<T> = self
                    .data
                    .iter()
                    .map(|other| self.dist_metric.calc_dist(point, other))
                    .collect();
                kth_smallest(&mut distances, self.k)
            })
            .collect()
    }

    fn calc_core_distances_kd_tree(&self) -> Vec<T> {
        let tree = KdTree::new(self.data, self.dist_metric.clone());
        self.data
            .iter()
            .map(|point| {
                // The point itself is among the k + 1 nearest
                tree.knn(point, self.k + 1)
                    .last()
                    .map_or_else(T::zero, |neighbour| neighbour.distance)
            })
            .collect()
    }
}
