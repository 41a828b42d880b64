use thiserror::Error;

/// Possible errors that arise from invalid configuration, malformed input data or calling
/// prediction before a model has been fitted.
///
/// Too few data points for the configured minimum cluster size is not an error: fitting
/// returns a model where every point is noise.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HdbscanError {
    /// The minimum cluster size must be at least 1.
    #[error("min_cluster_size must be at least 1 (got {got})")]
    InvalidMinClusterSize { got: usize },
    /// The minimum number of samples must be at least 1.
    #[error("min_samples must be at least 1 (got {got})")]
    InvalidMinSamples { got: usize },
    /// Minkowski distances are only metrics for finite `p >= 1`.
    #[error("minkowski p must be finite and at least 1 (got {p})")]
    InvalidMinkowskiP { p: f64 },
    /// A distance metric name that isn't recognised.
    #[error("unknown distance metric: {name}")]
    UnknownMetric { name: String },
    /// A nearest neighbour algorithm name that isn't recognised.
    #[error("unknown nearest neighbour algorithm: {name}")]
    UnknownAlgorithm { name: String },
    /// A data point's dimensionality doesn't match the rest of the data.
    #[error("input vectors have mismatched dimensions: point {index} has {got}, expected {expected}")]
    WrongDimension {
        index: usize,
        expected: usize,
        got: usize,
    },
    /// A data point contains an infinite or NaN coordinate.
    #[error("non finite coordinate: point {index} contains non-finite element(s)")]
    NonFiniteCoordinate { index: usize },
    /// The training points passed to prediction are not the ones the model was fitted on.
    #[error("model was fitted on {expected} points but {got} training points were given")]
    TrainingSizeMismatch { expected: usize, got: usize },
    /// Prediction or a model accessor was called before fitting.
    #[error("model has not been fitted, call `Hdbscan::fit` first")]
    NotFitted,
}

impl HdbscanError {
    /// Whether this error was caused by an invalid hyper parameter configuration.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidMinClusterSize { .. }
                | Self::InvalidMinSamples { .. }
                | Self::InvalidMinkowskiP { .. }
                | Self::UnknownMetric { .. }
                | Self::UnknownAlgorithm { .. }
        )
    }

    /// Whether this error was caused by data points of inconsistent dimensionality.
    pub fn is_dimension_error(&self) -> bool {
        matches!(self, Self::WrongDimension { .. })
    }
}
