//! Local Geary statistic.
//!
//!   c_i = sum_j w_ij (z_i - z_j)^2
//!
//! with z standardized over the full sample (population standard deviation)
//! and row-standardized weights. Small values indicate positive local
//! association. The multivariate form averages the squared differences over
//! k standardized layers:
//!
//!   c_i = (1/k) sum_v sum_j w_ij (z_vi - z_vj)^2

use lisa_weights::{Transform, WeightsGraph};
use tracing::info;

use crate::crand::CrandConfig;
use crate::error::{LisaError, Result};
use crate::kernel::EdgeKernel;
use crate::stats::{fit_kernel, LocalFit, LocalStatistic};
use crate::util::math::{check_len, standardize};

/// Univariate local Geary with conditional randomization.
pub fn local_geary(graph: &WeightsGraph, x: &[f64], config: &CrandConfig) -> Result<LocalFit> {
    check_len(x, graph.n())?;
    info!(
        "Local Geary: {} units, {} permutations",
        graph.n(),
        config.permutations
    );

    let w = graph.with_transform(Transform::Row);
    let kernel = EdgeKernel::Geary { z: standardize(x)? };
    fit_kernel(LocalStatistic::Geary, &w, &kernel, config)
}

/// Multivariate local Geary over `k >= 1` continuous layers.
pub fn local_geary_mv(
    graph: &WeightsGraph,
    layers: &[&[f64]],
    config: &CrandConfig,
) -> Result<LocalFit> {
    if layers.is_empty() {
        return Err(LisaError::NoLayers);
    }
    for layer in layers {
        check_len(layer, graph.n())?;
    }
    info!(
        "Multivariate local Geary: {} units, {} layers, {} permutations",
        graph.n(),
        layers.len(),
        config.permutations
    );

    let w = graph.with_transform(Transform::Row);
    let standardized = layers
        .iter()
        .map(|layer| standardize(layer))
        .collect::<Result<Vec<_>>>()?;
    let kernel = EdgeKernel::GearyMultivariate {
        layers: standardized,
    };
    fit_kernel(LocalStatistic::GearyMultivariate, &w, &kernel, config)
}
