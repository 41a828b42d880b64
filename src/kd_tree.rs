//! A balanced KD-tree over borrowed data points, used to find nearest neighbours when
//! calculating core distances.
//!
//! Nodes live in a flat arena and refer to their children by index. The tree splits on the
//! median along an axis that cycles with depth, ordering ties by original point index, so
//! construction is deterministic even when every point is identical.

use crate::distance::DistanceMetric;
use num_traits::Float;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A neighbouring data point found by a tree search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbour<T> {
    /// Index of the point in the data the tree was built from.
    pub index: usize,
    /// Distance from the query point.
    pub distance: T,
}

#[derive(Debug, Clone)]
struct KdNode<T> {
    point_id: usize,
    axis: usize,
    split: T,
    left: Option<usize>,
    right: Option<usize>,
}

/// K-dimensional tree supporting k-nearest-neighbour and radius queries.
///
/// Branches are only pruned for metrics where [`DistanceMetric::supports_tree_pruning`] is
/// true. Any other metric falls back to comparing the query against every point, so results
/// are always exact.
///
/// # Examples
/// ```
///use densitree::{DistanceMetric, KdTree};
///
///let data = vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![5.0, 5.0], vec![0.0, 2.0]];
///let tree = KdTree::new(&data, DistanceMetric::Euclidean);
///let neighbours = tree.knn(&[0.1, 0.0], 2);
///assert_eq!(vec![0, 1], neighbours.iter().map(|n| n.index).collect::<Vec<_>>());
///
///let within = tree.radius_search(&[0.0, 0.0], 2.0);
///assert_eq!(vec![0, 1, 3], within.iter().map(|n| n.index).collect::<Vec<_>>());
/// ```
#[derive(Debug, Clone)]
pub struct KdTree<'a, T> {
    data: &'a [Vec<T>],
    dist_metric: DistanceMetric<T>,
    nodes: Vec<KdNode<T>>,
    root: Option<usize>,
}

impl<'a, T: Float> KdTree<'a, T> {
    /// Builds a balanced tree over all points in `data`. The points must share one
    /// dimensionality.
    pub fn new(data: &'a [Vec<T>], dist_metric: DistanceMetric<T>) -> Self {
        let n_dims = data.first().map_or(0, Vec::len);
        let mut point_ids: Vec<usize> = (0..data.len()).collect();
        let mut nodes = Vec::with_capacity(data.len());
        let root = build_subtree(data, n_dims, &mut point_ids, 0, &mut nodes);
        Self {
            data,
            dist_metric,
            nodes,
            root,
        }
    }

    /// The number of points in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds no points.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The number of nodes on the longest path from the root to a leaf.
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack: Vec<(usize, usize)> = self.root.map(|root| (root, 1)).into_iter().collect();
        while let Some((node_id, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            let node = &self.nodes[node_id];
            stack.extend(node.left.map(|child| (child, depth + 1)));
            stack.extend(node.right.map(|child| (child, depth + 1)));
        }
        max_depth
    }

    /// Finds the `k` points closest to `query`, nearest first. Points at equal distance are
    /// ordered by their index. Fewer than `k` neighbours are returned if the tree is smaller.
    pub fn knn(&self, query: &[T], k: usize) -> Vec<Neighbour<T>> {
        if k == 0 {
            return Vec::new();
        }
        if !self.dist_metric.supports_tree_pruning() {
            let mut candidates = self.exhaustive_candidates(query);
            candidates.sort();
            candidates.truncate(k);
            return candidates
                .into_iter()
                .map(Candidate::into_neighbour)
                .collect();
        }

        let mut heap = BinaryHeap::with_capacity(k + 1);
        self.search_knn(self.root, query, k, &mut heap);
        heap.into_sorted_vec()
            .into_iter()
            .map(Candidate::into_neighbour)
            .collect()
    }

    /// Finds every point within `radius` of `query` (inclusive), nearest first.
    pub fn radius_search(&self, query: &[T], radius: T) -> Vec<Neighbour<T>> {
        let mut found = if self.dist_metric.supports_tree_pruning() {
            self.search_radius(query, radius)
        } else {
            self.exhaustive_candidates(query)
                .into_iter()
                .filter(|candidate| candidate.distance <= radius)
                .collect()
        };
        found.sort();
        found.into_iter().map(Candidate::into_neighbour).collect()
    }

    fn search_knn(
        &self,
        node_id: Option<usize>,
        query: &[T],
        k: usize,
        heap: &mut BinaryHeap<Candidate<T>>,
    ) {
        let Some(node_id) = node_id else {
            return;
        };
        let node = &self.nodes[node_id];
        let candidate = Candidate {
            distance: self.dist_metric.calc_dist(query, &self.data[node.point_id]),
            index: node.point_id,
        };
        if heap.len() < k {
            heap.push(candidate);
        } else if heap.peek().is_some_and(|worst| candidate < *worst) {
            heap.pop();
            heap.push(candidate);
        }

        let gap = coordinate(query, node.axis) - node.split;
        let (near, far) = if gap < T::zero() {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };
        self.search_knn(near, query, k, heap);

        // Equal distances must still be visited, a lower index wins the tie
        let worst = heap.peek().map(|worst| worst.distance);
        match worst {
            Some(worst) if heap.len() >= k && gap.abs() > worst => {}
            _ => self.search_knn(far, query, k, heap),
        }
    }

    fn search_radius(&self, query: &[T], radius: T) -> Vec<Candidate<T>> {
        let mut found = Vec::new();
        let mut stack: Vec<usize> = self.root.into_iter().collect();

        while let Some(node_id) = stack.pop() {
            let node = &self.nodes[node_id];
            let distance = self.dist_metric.calc_dist(query, &self.data[node.point_id]);
            if distance <= radius {
                found.push(Candidate {
                    distance,
                    index: node.point_id,
                });
            }
            let gap = coordinate(query, node.axis) - node.split;
            let (near, far) = if gap < T::zero() {
                (node.left, node.right)
            } else {
                (node.right, node.left)
            };
            stack.extend(near);
            if gap.abs() <= radius {
                stack.extend(far);
            }
        }
        found
    }

    fn exhaustive_candidates(&self, query: &[T]) -> Vec<Candidate<T>> {
        self.data
            .iter()
            .enumerate()
            .map(|(index, datapoint)| Candidate {
                distance: self.dist_metric.calc_dist(query, datapoint),
                index,
            })
            .collect()
    }
}

fn build_subtree<T: Float>(
    data: &[Vec<T>],
    n_dims: usize,
    point_ids: &mut [usize],
    depth: usize,
    nodes: &mut Vec<KdNode<T>>,
) -> Option<usize> {
    if point_ids.is_empty() {
        return None;
    }
    let axis = if n_dims == 0 { 0 } else { depth % n_dims };
    let median = point_ids.len() / 2;
    point_ids.select_nth_unstable_by(median, |&a, &b| {
        coordinate(&data[a], axis)
            .partial_cmp(&coordinate(&data[b], axis))
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(&b))
    });

    let point_id = point_ids[median];
    let node_id = nodes.len();
    nodes.push(KdNode {
        point_id,
        axis,
        split: coordinate(&data[point_id], axis),
        left: None,
        right: None,
    });

    let (lower, upper) = point_ids.split_at_mut(median);
    let left = build_subtree(data, n_dims, lower, depth + 1, nodes);
    let right = build_subtree(data, n_dims, &mut upper[1..], depth + 1, nodes);
    nodes[node_id].left = left;
    nodes[node_id].right = right;
    Some(node_id)
}

fn coordinate<T: Float>(point: &[T], axis: usize) -> T {
    point.get(axis).copied().unwrap_or_else(T::zero)
}

/// Search candidate ordered by distance then index, so the max-heap's top is the worst
/// neighbour found so far.
#[derive(Debug, Clone, Copy)]
struct Candidate<T> {
    distance: T,
    index: usize,
}

impl<T> Candidate<T> {
    fn into_neighbour(self) -> Neighbour<T> {
        Neighbour {
            index: self.index,
            distance: self.distance,
        }
    }
}

impl<T: Float> Ord for Candidate<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .partial_cmp(&other.distance)
            .unwrap_or(Ordering::Equal)
            .then(self.index.cmp(&other.index))
    }
}

impl<T: Float> PartialOrd for Candidate<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: Float> PartialEq for Candidate<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T: Float> Eq for Candidate<T> {}
