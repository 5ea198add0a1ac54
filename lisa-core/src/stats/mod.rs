//! Local statistics and the fitted result they share.
//!
//! [`LocalStatistic`] is the closed set of supported statistics. Every
//! edge-sum variant runs through the same aggregation and conditional
//! randomization engines; LOSH uses its own analytic inference.

pub mod geary;
pub mod join_count;
pub mod losh;

use lisa_weights::WeightsGraph;
use serde::{Deserialize, Serialize};

use crate::crand::{conditional_randomization, CrandConfig, CrandOutput, SimulationMatrix};
use crate::error::{LisaError, Result};
use crate::kernel::{EdgeKernel, JoinCase};

pub use losh::{InferenceWarning, LoshConfig, LoshDetails, LoshInference};

/// A local indicator of spatial association.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LocalStatistic {
    Geary,
    GearyMultivariate,
    JoinCount,
    JoinCountBivariate(JoinCase),
    JoinCountMultivariate,
    Losh(LoshConfig),
}

impl LocalStatistic {
    pub fn name(&self) -> &'static str {
        match self {
            LocalStatistic::Geary => "local_geary",
            LocalStatistic::GearyMultivariate => "local_geary_mv",
            LocalStatistic::JoinCount => "local_join_count",
            LocalStatistic::JoinCountBivariate(_) => "local_join_count_bv",
            LocalStatistic::JoinCountMultivariate => "local_join_count_mv",
            LocalStatistic::Losh(_) => "losh",
        }
    }

    /// Fit the statistic on `layers` (one per input variable).
    ///
    /// `crand` is ignored by LOSH, which has no randomization path.
    pub fn fit(
        &self,
        graph: &WeightsGraph,
        layers: &[&[f64]],
        crand: &CrandConfig,
    ) -> Result<LocalFit> {
        match self {
            LocalStatistic::Geary => {
                let [x] = exact_layers::<1>(self.name(), layers)?;
                geary::local_geary(graph, x, crand)
            }
            LocalStatistic::GearyMultivariate => geary::local_geary_mv(graph, layers, crand),
            LocalStatistic::JoinCount => {
                let [y] = exact_layers::<1>(self.name(), layers)?;
                join_count::local_join_count(graph, y, crand)
            }
            LocalStatistic::JoinCountBivariate(case) => {
                let [x, z] = exact_layers::<2>(self.name(), layers)?;
                join_count::local_join_count_bv(graph, x, z, *case, crand)
            }
            LocalStatistic::JoinCountMultivariate => {
                join_count::local_join_count_mv(graph, layers, crand)
            }
            LocalStatistic::Losh(config) => {
                let [y] = exact_layers::<1>(self.name(), layers)?;
                losh::losh(graph, y, config)
            }
        }
    }
}

fn exact_layers<'a, const K: usize>(
    statistic: &'static str,
    layers: &[&'a [f64]],
) -> Result<[&'a [f64]; K]> {
    <[&'a [f64]; K]>::try_from(layers).map_err(|_| LisaError::WrongLayerCount {
        statistic,
        expected: K,
        got: layers.len(),
    })
}

/// Observed statistic plus conditional randomization for an edge-sum kernel.
pub(crate) fn fit_kernel(
    statistic: LocalStatistic,
    graph: &WeightsGraph,
    kernel: &EdgeKernel,
    config: &CrandConfig,
) -> Result<LocalFit> {
    let observed = kernel.observed(graph);
    let crand = conditional_randomization(graph, kernel, &observed, config)?;
    Ok(LocalFit::from_crand(statistic, observed, crand))
}

/// Result of fitting a local statistic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalFit {
    pub statistic: LocalStatistic,
    /// Observed statistic, one value per unit in graph id order.
    pub values: Vec<f64>,
    /// Conditional randomization pseudo p-values.
    pub p_sim: Option<Vec<f64>>,
    /// Simulated null distribution, if retained.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub simulations: Option<SimulationMatrix>,
    /// Seed used by the randomization run.
    pub seed: Option<u64>,
    /// LOSH-specific outputs.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub losh: Option<LoshDetails>,
}

impl LocalFit {
    pub(crate) fn from_crand(
        statistic: LocalStatistic,
        values: Vec<f64>,
        crand: Option<CrandOutput>,
    ) -> Self {
        let (p_sim, simulations, seed) = match crand {
            Some(out) => (Some(out.p_sim), out.simulations, Some(out.seed)),
            None => (None, None, None),
        };
        Self {
            statistic,
            values,
            p_sim,
            simulations,
            seed,
            losh: None,
        }
    }

    pub fn n(&self) -> usize {
        self.values.len()
    }
}
