use crate::HdbscanError;
use num_traits::Float;
use std::fmt::{Debug, Formatter};
use std::str::FromStr;
use std::sync::Arc;

/// Signature of a caller supplied distance function.
pub type DistanceFn<T> = dyn Fn(&[T], &[T]) -> T + Send + Sync;

/// Possible distance metrics that can be used in the HDBSCAN algorithm when
/// calculating the distances between data points.
///
/// Only the Lp norms (Euclidean, Manhattan, Chebyshev and Minkowski) can be used to prune
/// the KD-tree when searching for nearest neighbours. Other metrics still work with the tree,
/// but searches fall back to scanning every point.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DistanceMetric<T> {
    /// Straight line distance, the L2 norm of the difference.
    Euclidean,
    /// Sum of absolute differences, the L1 norm of the difference.
    Manhattan,
    /// The Lp norm of the difference for a given `p >= 1`.
    Minkowski(f64),
    /// Largest absolute difference along any one dimension.
    Chebyshev,
    /// One minus the cosine similarity of the two vectors.
    Cosine,
    /// Proportion of coordinates that differ.
    Hamming,
    /// Sum of absolute differences, each scaled by the sum of absolute coordinates.
    Canberra,
    /// A caller supplied function. Must be symmetric and non-negative.
    #[cfg_attr(feature = "serde", serde(skip))]
    Custom(Arc<DistanceFn<T>>),
}

impl<T: Float> DistanceMetric<T> {
    /// Wraps a function as a custom distance metric.
    ///
    /// # Examples
    /// ```
    ///use densitree::DistanceMetric;
    ///
    ///let metric = DistanceMetric::custom(|a: &[f64], b: &[f64]| (a[0] - b[0]).abs());
    ///assert_eq!(2.0, metric.calc_dist(&[1.0, 5.0], &[3.0, 9.0]));
    /// ```
    pub fn custom<F>(dist_func: F) -> Self
    where
        F: Fn(&[T], &[T]) -> T + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(dist_func))
    }

    /// Calculates the distance between two points of equal dimensionality.
    pub fn calc_dist(&self, a: &[T], b: &[T]) -> T {
        match self {
            Self::Euclidean => euclidean_distance(a, b),
            Self::Manhattan => manhattan_distance(a, b),
            Self::Minkowski(p) => minkowski_distance(a, b, T::from(*p).unwrap_or_else(T::one)),
            Self::Chebyshev => chebyshev_distance(a, b),
            Self::Cosine => cosine_distance(a, b),
            Self::Hamming => hamming_distance(a, b),
            Self::Canberra => canberra_distance(a, b),
            Self::Custom(dist_func) => dist_func(a, b),
        }
    }

    /// The gap between a query and a splitting plane along one axis is a lower bound
    /// on the distance to anything beyond the plane. This holds for the Lp norms only.
    pub fn supports_tree_pruning(&self) -> bool {
        matches!(
            self,
            Self::Euclidean | Self::Manhattan | Self::Chebyshev | Self::Minkowski(_)
        )
    }

    pub(crate) fn validate(&self) -> Result<(), HdbscanError> {
        match self {
            Self::Minkowski(p) if !p.is_finite() || *p < 1.0 => {
                Err(HdbscanError::InvalidMinkowskiP { p: *p })
            }
            _ => Ok(()),
        }
    }
}

impl<T> DistanceMetric<T> {
    /// The canonical name of the metric, as accepted by [`str::parse`].
    pub fn name(&self) -> String {
        match self {
            Self::Euclidean => String::from("euclidean"),
            Self::Manhattan => String::from("manhattan"),
            Self::Minkowski(p) => format!("minkowski:{p}"),
            Self::Chebyshev => String::from("chebyshev"),
            Self::Cosine => String::from("cosine"),
            Self::Hamming => String::from("hamming"),
            Self::Canberra => String::from("canberra"),
            Self::Custom(_) => String::from("custom"),
        }
    }
}

impl<T> Default for DistanceMetric<T> {
    fn default() -> Self {
        Self::Euclidean
    }
}

impl<T> Clone for DistanceMetric<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Euclidean => Self::Euclidean,
            Self::Manhattan => Self::Manhattan,
            Self::Minkowski(p) => Self::Minkowski(*p),
            Self::Chebyshev => Self::Chebyshev,
            Self::Cosine => Self::Cosine,
            Self::Hamming => Self::Hamming,
            Self::Canberra => Self::Canberra,
            Self::Custom(dist_func) => Self::Custom(Arc::clone(dist_func)),
        }
    }
}

impl<T> Debug for DistanceMetric<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Minkowski(p) => f.debug_tuple("Minkowski").field(p).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
            _ => f.write_str(&self.name()),
        }
    }
}

/// Custom metrics are only equal if they share the same function.
impl<T> PartialEq for DistanceMetric<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Minkowski(p), Self::Minkowski(q)) => p == q,
            (Self::Custom(a), Self::Custom(b)) => Arc::ptr_eq(a, b),
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

impl<T: Float> FromStr for DistanceMetric<T> {
    type Err = HdbscanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown_metric = || HdbscanError::UnknownMetric {
            name: s.to_string(),
        };
        let name = s.trim().to_ascii_lowercase();
        let metric = match name.as_str() {
            "euclidean" | "l2" => Self::Euclidean,
            "manhattan" | "cityblock" | "l1" => Self::Manhattan,
            "chebyshev" => Self::Chebyshev,
            "cosine" => Self::Cosine,
            "hamming" => Self::Hamming,
            "canberra" => Self::Canberra,
            "minkowski" => Self::Minkowski(2.0),
            other => match other.strip_prefix("minkowski:") {
                Some(p) => {
                    let p = p.trim().parse::<f64>().map_err(|_| unknown_metric())?;
                    Self::Minkowski(p)
                }
                None => return Err(unknown_metric()),
            },
        };
        metric.validate()?;
        Ok(metric)
    }
}

pub(crate) fn euclidean_distance<T: Float>(a: &[T], b: &[T]) -> T {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (*x - *y) * (*x - *y))
        .fold(T::zero(), std::ops::Add::add)
        .sqrt()
}

pub(crate) fn manhattan_distance<T: Float>(a: &[T], b: &[T]) -> T {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (*x - *y).abs())
        .fold(T::zero(), std::ops::Add::add)
}

pub(crate) fn minkowski_distance<T: Float>(a: &[T], b: &[T], p: T) -> T {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (*x - *y).abs().powf(p))
        .fold(T::zero(), std::ops::Add::add)
        .powf(p.recip())
}

pub(crate) fn chebyshev_distance<T: Float>(a: &[T], b: &[T]) -> T {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (*x - *y).abs())
        .fold(T::zero(), T::max)
}

pub(crate) fn cosine_distance<T: Float>(a: &[T], b: &[T]) -> T {
    let (dot, norm_a, norm_b) = a.iter().zip(b.iter()).fold(
        (T::zero(), T::zero(), T::zero()),
        |(dot, norm_a, norm_b), (x, y)| (dot + *x * *y, norm_a + *x * *x, norm_b + *y * *y),
    );
    match (norm_a == T::zero(), norm_b == T::zero()) {
        (true, true) => T::zero(),
        (true, false) | (false, true) => T::one(),
        (false, false) => {
            let similarity = dot / (norm_a.sqrt() * norm_b.sqrt());
            let two = T::one() + T::one();
            (T::one() - similarity).max(T::zero()).min(two)
        }
    }
}

pub(crate) fn hamming_distance<T: Float>(a: &[T], b: &[T]) -> T {
    if a.is_empty() {
        return T::zero();
    }
    let n_diff = a.iter().zip(b.iter()).filter(|(x, y)| x != y).count();
    let n_diff = T::from(n_diff).unwrap_or_else(T::zero);
    let n_dims = T::from(a.len()).unwrap_or_else(T::one);
    n_diff / n_dims
}

pub(crate) fn canberra_distance<T: Float>(a: &[T], b: &[T]) -> T {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let denominator = x.abs() + y.abs();
            if denominator == T::zero() {
                T::zero()
            } else {
                (*x - *y).abs() / denominator
            }
        })
        .fold(T::zero(), std::ops::Add::add)
}
