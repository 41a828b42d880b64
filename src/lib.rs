//! Hierarchical Density-Based Spatial Clustering of Applications with Noise ("HDBSCAN") clustering
//! algorithm in Rust. Generic over floating point numeric types.
//!
//! HDBSCAN finds clusters of varying densities without being told how many there are, and
//! labels points that belong to no cluster as noise. Fitting runs in four stages:
//!  1. Core distances. Each point's distance to its `min_samples`-th nearest neighbour, found
//!     by brute force or with a [`KdTree`];
//!  2. A minimum spanning tree over the mutual reachability graph, where the weight between two
//!     points is the largest of their distance and both their core distances;
//!  3. A single linkage dendrogram ([`Hierarchy`]) built by merging along the tree's edges in
//!     ascending order; and
//!  4. Selection of the most stable, non-overlapping merges with at least `min_cluster_size`
//!     points as the flat clusters.
//!
//! A fitted [`Model`] can then assign new points to its clusters with [`predict`].
//!
//! # Examples
//! ```
//!use densitree::{Hdbscan, HdbscanHyperParams};
//!
//!let data: Vec<Vec<f64>> = vec![
//!    vec![0.0, 0.0],
//!    vec![0.0, 0.5],
//!    vec![0.5, 0.0],
//!    vec![0.5, 0.5],
//!    vec![10.0, 10.0],
//!    vec![10.0, 10.5],
//!    vec![10.5, 10.0],
//!    vec![10.5, 10.5],
//!    vec![50.0, -50.0],
//!];
//!let hp = HdbscanHyperParams::builder()
//!    .min_cluster_size(4)
//!    .min_samples(2)
//!    .build()
//!    .unwrap();
//!let mut clusterer = Hdbscan::new(&data, hp);
//!let model = clusterer.fit().unwrap();
//!assert_eq!(model.labels(), &[0, 0, 0, 0, 1, 1, 1, 1, -1]);
//!
//!let prediction = clusterer.predict(&[vec![10.2, 10.2]]).unwrap();
//!assert_eq!(vec![1], prediction.labels);
//! ```
//!
//! # Features
//! * `parallel` - adds [`fit_par`] and the `_par` methods on [`Hdbscan`], which spread core
//!   distance and edge weight calculation over a rayon thread pool.
//! * `serde` - serialisation of fitted models and hyper parameters.
//!
//! # References
//! * [Campello, R.J.G.B.; Moulavi, D.; Sander, J. Density-based clustering based on hierarchical density estimates.](https://link.springer.com/chapter/10.1007/978-3-642-37456-2_14)
//! * [How HDBSCAN Works](https://hdbscan.readthedocs.io/en/latest/how_hdbscan_works.html)

pub use crate::core_distances::NnAlgorithm;
pub use crate::distance::{DistanceFn, DistanceMetric};
pub use crate::error::HdbscanError;
#[cfg(feature = "parallel")]
pub use crate::hdbscan::fit_par;
pub use crate::hdbscan::{fit, Hdbscan};
pub use crate::hierarchy::{DendrogramNode, Hierarchy};
pub use crate::hyper_parameters::{HdbscanHyperParams, HyperParamBuilder};
pub use crate::kd_tree::{KdTree, Neighbour};
pub use crate::model::{Cluster, CondensedNode, Model, Prediction};
pub use crate::predict::predict;

mod core_distances;
mod data_wrappers;
mod distance;
mod error;
mod hdbscan;
mod hierarchy;
mod hyper_parameters;
mod kd_tree;
mod model;
mod mst;
mod predict;
mod stability;
mod union_find;
mod validation;
