//! lisa-core: local indicators of spatial association
//!
//! Implements local Geary, local join counts (univariate, bivariate and
//! multivariate) and local spatial heteroscedasticity on top of a shared
//! neighbor-aggregation engine and a conditional randomization engine
//! with seeded, worker-count-independent replicates.

pub mod aggregate;
pub mod crand;
pub mod error;
pub mod kernel;
pub mod stats;
pub mod util;

pub use crand::{CrandConfig, CrandOutput, Parallelism, SimulationMatrix};
pub use error::{LisaError, Result};
pub use kernel::{EdgeKernel, JoinCase};
pub use stats::geary::{local_geary, local_geary_mv};
pub use stats::join_count::{local_join_count, local_join_count_bv, local_join_count_mv};
pub use stats::losh::losh;
pub use stats::{
    InferenceWarning, LocalFit, LocalStatistic, LoshConfig, LoshDetails, LoshInference,
};
