//! Error taxonomy for local statistics.
//!
//! Every variant is fatal for the call that raised it. Non-fatal
//! conditions are reported as [`InferenceWarning`](crate::stats::losh::InferenceWarning)s.

use lisa_weights::WeightsError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LisaError {
    #[error("Unsupported join count case '{0}' (expected 'BJC' or 'CLC')")]
    UnsupportedCase(String),

    #[error("Unsupported inference mode '{0}' (expected 'none' or 'chi-square')")]
    UnsupportedInference(String),

    #[error("Invalid parallelism '{0}' (expected a positive integer or 'all')")]
    InvalidParallelism(String),

    #[error("Length mismatch: expected {expected} values, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    #[error("{statistic} expects {expected} value layer(s), got {got}")]
    WrongLayerCount {
        statistic: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("At least one value layer is required")]
    NoLayers,

    #[error("Value {value} at unit {index} is not binary (0/1)")]
    NonBinary { index: usize, value: f64 },

    #[error("Values have zero variance and cannot be standardized")]
    ZeroVariance,

    #[error("Exponent must be positive and finite, got {0}")]
    InvalidExponent(f64),

    #[error("Need at least {min} units, got {n}")]
    TooFewUnits { n: usize, min: usize },

    #[error(
        "Unit {unit} has {cardinality} neighbors but only {pool} candidates are available"
    )]
    CandidatePoolTooSmall {
        unit: usize,
        cardinality: usize,
        pool: usize,
    },

    #[error("Edge ({focal}, {neighbor}) refers to a unit outside 0..{n}")]
    EdgeOutOfRange {
        focal: usize,
        neighbor: usize,
        n: usize,
    },

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(String),

    #[error(transparent)]
    Weights(#[from] WeightsError),
}

pub type Result<T> = std::result::Result<T, LisaError>;
