use densitree::{DistanceMetric, HdbscanError, HdbscanHyperParams, Model, NnAlgorithm};
use std::collections::HashSet;
use std::f64::consts::PI;

pub type FitFn = fn(&[Vec<f64>], &HdbscanHyperParams<f64>) -> Result<Model<f64>, HdbscanError>;

/// Evenly spaced points on a circle, so every point has the same core distance.
pub fn ring(centre: (f64, f64), radius: f64, n_points: usize) -> Vec<Vec<f64>> {
    (0..n_points)
        .map(|i| {
            let angle = 2.0 * PI * i as f64 / n_points as f64;
            vec![
                centre.0 + radius * angle.cos(),
                centre.1 + radius * angle.sin(),
            ]
        })
        .collect()
}

/// Two unit squares far apart and an outlier.
pub fn squares_and_outlier() -> Vec<Vec<f64>> {
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

/// Deterministic scatter around a few centres.
pub fn scattered_points(n_points: usize) -> Vec<Vec<f64>> {
    let centres = [(0.0, 0.0), (20.0, 5.0), (-15.0, 25.0)];
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next = move || {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (state >> 11) as f64 / (1_u64 << 53) as f64
    };
    (0..n_points)
        .map(|i| {
            let (x, y) = centres[i % centres.len()];
            vec![x + 4.0 * next() - 2.0, y + 4.0 * next() - 2.0]
        })
        .collect()
}

fn unique_labels(labels: &[i32]) -> HashSet<i32> {
    labels.iter().copied().collect()
}

pub fn test_two_ring_blobs(fit_fn: FitFn) {
    let mut data = ring((0.0, 0.0), 0.5, 20);
    data.extend(ring((50.0, 50.0), 0.5, 20));
    let hp = HdbscanHyperParams::builder()
        .min_cluster_size(5)
        .build()
        .unwrap();
    let model = fit_fn(&data, &hp).unwrap();

    assert_eq!(2, model.n_clusters());
    assert_eq!(0, model.n_noise());
    let first = unique_labels(&model.labels()[..20]);
    let second = unique_labels(&model.labels()[20..]);
    assert_eq!(1, first.len());
    assert_eq!(1, second.len());
    assert_ne!(first, second);
    assert!(model.probabilities().iter().all(|&p| p == 1.0));
}

/// A tight square with four stragglers two units out, so density falls off towards the edge.
fn dense_core_with_fringe(centre: (f64, f64)) -> Vec<Vec<f64>> {
    let offsets = [
        (0.0, 0.0),
        (0.0, 0.1),
        (0.1, 0.0),
        (0.1, 0.1),
        (2.0, 0.0),
        (0.0, 2.0),
        (-2.0, 0.0),
        (0.0, -2.0),
    ];
    offsets
        .iter()
        .map(|(x, y)| vec![centre.0 + x, centre.1 + y])
        .collect()
}

pub fn test_dense_core_wins_over_fringe(fit_fn: FitFn) {
    let mut data = dense_core_with_fringe((0.0, 0.0));
    data.extend(dense_core_with_fringe((50.0, 50.0)));
    let hp = HdbscanHyperParams::builder()
        .min_cluster_size(4)
        .min_samples(2)
        .build()
        .unwrap();
    let model = fit_fn(&data, &hp).unwrap();

    // Each tight square outscores its whole blob, stragglers are left out
    assert_eq!(2, model.n_clusters());
    assert_eq!(8, model.n_noise());
    for blob in [&model.labels()[..8], &model.labels()[8..]] {
        assert_eq!(1, unique_labels(&blob[..4]).len());
        assert_ne!(-1, blob[0]);
        assert_eq!(&[-1; 4], &blob[4..]);
    }
    assert_ne!(model.labels()[0], model.labels()[8]);
    for cluster in model.stabilities() {
        assert_eq!(4, cluster.size);
        assert!(cluster.stability > 10.0);
    }
    let dendrogram = model.hierarchy().dendrogram();
    let blob = dendrogram.iter().find(|node| node.size == 8);
    assert!(blob.is_some_and(|node| 8.0 / node.distance < 10.0));
}

pub fn test_outlier_is_noise(fit_fn: FitFn) {
    let mut data = ring((0.0, 0.0), 0.5, 20);
    data.extend(ring((50.0, 50.0), 0.5, 20));
    data.push(vec![-100.0, 100.0]);
    let hp = HdbscanHyperParams::builder()
        .min_cluster_size(5)
        .build()
        .unwrap();
    let model = fit_fn(&data, &hp).unwrap();

    assert_eq!(2, model.n_clusters());
    assert_eq!(1, model.n_noise());
    assert_eq!(-1, model.labels()[40]);
    assert_eq!(0.0, model.probabilities()[40]);
}

pub fn test_too_few_points(fit_fn: FitFn) {
    let data = vec![
        vec![0.0, 0.0],
        vec![0.1, 0.1],
        vec![1000.0, 1000.0],
        vec![1000.1, 1000.0],
    ];
    let hp = HdbscanHyperParams::builder()
        .min_cluster_size(5)
        .build()
        .unwrap();
    let model = fit_fn(&data, &hp).unwrap();

    assert_eq!(0, model.n_clusters());
    assert_eq!(vec![-1; 4], model.labels());
    assert_eq!(vec![0.0; 4], model.probabilities());
    assert!(model.hierarchy().is_empty());
}

pub fn test_duplicate_points(fit_fn: FitFn) {
    let mut data = vec![vec![1.0, 1.0]; 6];
    data.extend(vec![vec![5.0, 5.0]; 6]);
    let hp = HdbscanHyperParams::builder()
        .min_cluster_size(3)
        .build()
        .unwrap();
    let model = fit_fn(&data, &hp).unwrap();

    assert!(model.core_distances().iter().all(|&d| d == 0.0));
    let hierarchy = model.hierarchy();
    assert_eq!(11, hierarchy.dendrogram().len());
    assert_eq!(12, hierarchy.root().unwrap().size);
    let first_merges = &hierarchy.dendrogram()[..10];
    assert!(first_merges.iter().all(|node| node.distance == 0.0));
    let condensed = model.condensed_tree();
    assert!(condensed.iter().all(|node| node.stability.is_finite()));

    assert_eq!(2, model.n_clusters());
    assert_eq!(0, model.n_noise());
    assert_eq!(1, unique_labels(&model.labels()[..6]).len());
    assert_eq!(1, unique_labels(&model.labels()[6..]).len());
}

pub fn test_metrics(fit_fn: FitFn) {
    let data = squares_and_outlier();
    let metrics = vec![
        DistanceMetric::Euclidean,
        DistanceMetric::Manhattan,
        DistanceMetric::Chebyshev,
        DistanceMetric::Minkowski(3.0),
    ];
    for metric in metrics {
        let hp = HdbscanHyperParams::builder()
            .min_cluster_size(4)
            .min_samples(2)
            .dist_metric(metric.clone())
            .build()
            .unwrap();
        let model = fit_fn(&data, &hp).unwrap();
        assert_eq!(
            &[0, 0, 0, 0, 1, 1, 1, 1, -1],
            model.labels(),
            "metric: {metric:?}"
        );
        assert_eq!(&metric, model.dist_metric());
    }
}

pub fn test_custom_metric(fit_fn: FitFn) {
    let data = squares_and_outlier();
    let metric = DistanceMetric::custom(|a: &[f64], b: &[f64]| {
        a.iter()
            .zip(b)
            .map(|(x, y)| (x - y).abs())
            .sum::<f64>()
    });
    let hp = HdbscanHyperParams::builder()
        .min_cluster_size(4)
        .min_samples(2)
        .dist_metric(metric)
        .nn_algorithm(NnAlgorithm::KdTree)
        .build()
        .unwrap();
    let model = fit_fn(&data, &hp).unwrap();
    assert_eq!(&[0, 0, 0, 0, 1, 1, 1, 1, -1], model.labels());
}

pub fn test_kd_tree_matches_brute_force(fit_fn: FitFn) {
    let data = scattered_points(300);
    let fit_with = |nn_algorithm| {
        let hp = HdbscanHyperParams::builder()
            .min_cluster_size(10)
            .min_samples(6)
            .nn_algorithm(nn_algorithm)
            .build()
            .unwrap();
        fit_fn(&data, &hp).unwrap()
    };
    let brute_force = fit_with(NnAlgorithm::BruteForce);
    let kd_tree = fit_with(NnAlgorithm::KdTree);
    let auto = fit_with(NnAlgorithm::Auto);

    assert_eq!(brute_force.core_distances(), kd_tree.core_distances());
    assert_eq!(brute_force.labels(), kd_tree.labels());
    assert_eq!(brute_force.labels(), auto.labels());
    assert!(brute_force.n_clusters() >= 1);
}

pub fn test_hierarchy_shape(fit_fn: FitFn) {
    let data = scattered_points(60);
    let hp = HdbscanHyperParams::builder()
        .min_cluster_size(4)
        .build()
        .unwrap();
    let model = fit_fn(&data, &hp).unwrap();
    let hierarchy = model.hierarchy();

    assert_eq!(59, hierarchy.dendrogram().len());
    assert_eq!(59, hierarchy.linkage_matrix().len());
    assert_eq!(60, hierarchy.root().unwrap().size);
    for (position, node) in hierarchy.dendrogram().iter().enumerate() {
        assert_eq!(60 + position, node.id);
        assert!(node.left < node.id && node.right < node.id);
        let children = hierarchy.size_of(node.left) + hierarchy.size_of(node.right);
        assert_eq!(children, node.size);
    }
    assert!(hierarchy
        .dendrogram()
        .windows(2)
        .all(|pair| pair[0].distance <= pair[1].distance));

    let sizes: usize = model.stabilities().iter().map(|cluster| cluster.size).sum();
    assert_eq!(60, model.n_noise() + sizes);
}

pub fn test_empty_data(fit_fn: FitFn) {
    let data: Vec<Vec<f64>> = Vec::new();
    let model = fit_fn(&data, &HdbscanHyperParams::default()).unwrap();
    assert!(model.labels().is_empty());
    assert!(model.probabilities().is_empty());
    assert!(model.hierarchy().is_empty());
}

pub fn test_mismatched_dimensions(fit_fn: FitFn) {
    let data = vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0]];
    let result = fit_fn(&data, &HdbscanHyperParams::default());
    assert_eq!(
        Err(HdbscanError::WrongDimension {
            index: 2,
            expected: 2,
            got: 1,
        }),
        result
    );
}

pub fn test_non_finite_coordinate(fit_fn: FitFn) {
    let data = vec![vec![1.5, f64::INFINITY], vec![1.0, 2.0]];
    let result = fit_fn(&data, &HdbscanHyperParams::default());
    assert_eq!(Err(HdbscanError::NonFiniteCoordinate { index: 0 }), result);

    let data = vec![vec![1.5, 2.0], vec![f64::NAN, 2.0]];
    let result = fit_fn(&data, &HdbscanHyperParams::default());
    assert_eq!(Err(HdbscanError::NonFiniteCoordinate { index: 1 }), result);
}
