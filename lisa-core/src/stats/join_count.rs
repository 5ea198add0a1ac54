//! Local join counts for binary data.
//!
//! All variants use binary weights with self-loops removed:
//!
//! - univariate:   BB_i = sum_j w_ij y_i y_j
//! - bivariate:    BJC_i = sum_j w_ij x_i (1 - z_i) (1 - x_j) z_j
//!                 CLC_i = sum_j w_ij x_i z_i x_j z_j
//! - multivariate: CLC_i = sum_j w_ij prod_v x_vi prod_v x_vj
//!
//! Units whose observed count is 0 get a NaN p-value.

use lisa_weights::{Transform, WeightsGraph};
use tracing::info;

use crate::crand::CrandConfig;
use crate::error::{LisaError, Result};
use crate::kernel::{EdgeKernel, JoinCase};
use crate::stats::{fit_kernel, LocalFit, LocalStatistic};
use crate::util::math::{check_binary, check_len};

/// Univariate local join count.
pub fn local_join_count(
    graph: &WeightsGraph,
    y: &[f64],
    config: &CrandConfig,
) -> Result<LocalFit> {
    check_binary_layer(y, graph.n())?;
    info!(
        "Local join count: {} units, {} permutations",
        graph.n(),
        config.permutations
    );

    let w = binary_graph(graph);
    let kernel = EdgeKernel::JoinCount { y: y.to_vec() };
    fit_kernel(LocalStatistic::JoinCount, &w, &kernel, config)
}

/// Bivariate local join count for two binary layers.
pub fn local_join_count_bv(
    graph: &WeightsGraph,
    x: &[f64],
    z: &[f64],
    case: JoinCase,
    config: &CrandConfig,
) -> Result<LocalFit> {
    check_binary_layer(x, graph.n())?;
    check_binary_layer(z, graph.n())?;
    info!(
        "Bivariate local join count ({}): {} units, {} permutations",
        case,
        graph.n(),
        config.permutations
    );

    let w = binary_graph(graph);
    let kernel = EdgeKernel::JoinCountBivariate {
        x: x.to_vec(),
        z: z.to_vec(),
        case,
    };
    fit_kernel(LocalStatistic::JoinCountBivariate(case), &w, &kernel, config)
}

/// Multivariate local co-location count over `k >= 1` binary layers.
///
/// Randomization samples the joint indicator across layers.
pub fn local_join_count_mv(
    graph: &WeightsGraph,
    layers: &[&[f64]],
    config: &CrandConfig,
) -> Result<LocalFit> {
    if layers.is_empty() {
        return Err(LisaError::NoLayers);
    }
    for layer in layers {
        check_binary_layer(layer, graph.n())?;
    }
    info!(
        "Multivariate local join count: {} units, {} layers, {} permutations",
        graph.n(),
        layers.len(),
        config.permutations
    );

    let ext: Vec<f64> = (0..graph.n())
        .map(|i| layers.iter().map(|layer| layer[i]).product())
        .collect();
    let w = binary_graph(graph);
    let kernel = EdgeKernel::JoinCountMultivariate { ext };
    fit_kernel(LocalStatistic::JoinCountMultivariate, &w, &kernel, config)
}

fn check_binary_layer(values: &[f64], n: usize) -> Result<()> {
    check_len(values, n)?;
    check_binary(values)
}

fn binary_graph(graph: &WeightsGraph) -> WeightsGraph {
    graph.without_self_loops().with_transform(Transform::Binary)
}
