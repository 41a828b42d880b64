#![cfg(feature = "parallel")]
use super::{effective_k, kth_smallest, NnAlgorithm};
use crate::distance::DistanceMetric;
use crate::kd_tree::KdTree;
use crate::HdbscanHyperParams;
use num_traits::Float;
use rayon::prelude::*;

const BRUTE_CHUNK_DATASET_THRESHOLD: usize = 10_000;

pub(crate) struct CoreDistanceCalculatorPar<'a, T> {
    data: &'a [Vec<T>],
    nn_algo: NnAlgorithm,
    dist_metric: &'a DistanceMetric<T>,
    k: usize,
}

impl<'a, T: Float + Send + Sync> CoreDistanceCalculatorPar<'a, T> {
    pub(crate) fn new(data: &'a [Vec<T>], hp: &'a HdbscanHyperParams<T>) -> Self {
        Self {
            data,
            nn_algo: hp.nn_algo.resolve(data.len(), &hp.dist_metric),
            dist_metric: &hp.dist_metric,
            k: effective_k(hp.min_samples, data.len()),
        }
    }

    pub(crate) fn calc_core_distances(&self) -> Vec<T> {
        match (self.nn_algo, self.data.len()) {
            (NnAlgorithm::KdTree, _) => self.calc_core_distances_kd_tree(),
            (_, usize::MIN..=BRUTE_CHUNK_DATASET_THRESHOLD) => self.calc_core_distances_direct(),
            (_, _) => self.calc_core_distances_chunked(),
        }
    }

    fn calc_core_distances_direct(&self) -> Vec<T> {
        self.data
            .par_iter()
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

    fn calc_core_distances_chunked(&self) -> Vec<T> {
        let chunk_size = (self.data.len() / rayon::current_num_threads()).max(100);
        self.data
            .par_chunks(chunk_size)
            .flat_map_iter(|chunk| {
                // One distance buffer per chunk rather than per point
                let mut distances = Vec::with_capacity(self.data.len());
                let metric = self.dist_metric;
                chunk
                    .iter()
                    .map(|point| {
                        distances.clear();
                        distances.extend(
                            self.data.iter().map(|other| metric.calc_dist(point, other)),
                        );
                        kth_smallest(&mut distances, self.k)
                    })
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    fn calc_core_distances_kd_tree(&self) -> Vec<T> {
        let tree = KdTree::new(self.data, self.dist_metric.clone());
        self.data
            .par_iter()
            .map(|point| {
                tree.knn(point, self.k + 1)
                    .last()
                    .map_or_else(T::zero, |neighbour| neighbour.distance)
            })
            .collect()
    }
}
