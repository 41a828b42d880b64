#![cfg(feature = "parallel")]
use densitree::{HdbscanError, HdbscanHyperParams, Model};

mod common;

macro_rules! define_parallel_test {
    ($test_fn:ident) => {
        #[test]
        fn $test_fn() {
            fn fit_fn(
                data: &[Vec<f64>],
                hp: &HdbscanHyperParams<f64>,
            ) -> Result<Model<f64>, HdbscanError> {
                densitree::fit_par(data, hp)
            }

            common::$test_fn(fit_fn);
        }
    };
}

define_parallel_test!(test_two_ring_blobs);
define_parallel_test!(test_dense_core_wins_over_fringe);
define_parallel_test!(test_outlier_is_noise);
define_parallel_test!(test_too_few_points);
define_parallel_test!(test_duplicate_points);
define_parallel_test!(test_metrics);
define_parallel_test!(test_custom_metric);
define_parallel_test!(test_kd_tree_matches_brute_force);
define_parallel_test!(test_hierarchy_shape);
define_parallel_test!(test_empty_data);
define_parallel_test!(test_mismatched_dimensions);
define_parallel_test!(test_non_finite_coordinate);
