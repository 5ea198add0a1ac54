//! Edge-score kernels shared by the aggregation and randomization engines.
//!
//! A kernel owns the per-unit values a statistic needs and scores a single
//! directed edge. The observed statistic sums the score over a unit's true
//! neighbors; a conditional replicate sums it over a random substitute set,
//! holding the focal value fixed and applying the focal weights positionally.

use lisa_weights::WeightsGraph;
use serde::{Deserialize, Serialize};

use crate::aggregate::aggregate;
use crate::error::LisaError;

/// Bivariate join count pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinCase {
    /// Focal is (x=1, z=0), neighbor is (x=0, z=1).
    Bjc,
    /// Focal and neighbor are both (x=1, z=1).
    Clc,
}

impl std::str::FromStr for JoinCase {
    type Err = LisaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BJC" | "bjc" => Ok(JoinCase::Bjc),
            "CLC" | "clc" => Ok(JoinCase::Clc),
            other => Err(LisaError::UnsupportedCase(other.to_string())),
        }
    }
}

impl std::fmt::Display for JoinCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JoinCase::Bjc => write!(f, "BJC"),
            JoinCase::Clc => write!(f, "CLC"),
        }
    }
}

/// Per-edge scoring rule for an edge-sum statistic.
#[derive(Debug, Clone)]
pub enum EdgeKernel {
    /// `w * (z_i - z_j)^2` on standardized values.
    Geary { z: Vec<f64> },
    /// `w * sum_v (z_vi - z_vj)^2 / k` over k standardized layers.
    GearyMultivariate { layers: Vec<Vec<f64>> },
    /// `w * [y_i = 1 and y_j = 1]`.
    JoinCount { y: Vec<f64> },
    /// Two binary layers scored by [`JoinCase`].
    JoinCountBivariate {
        x: Vec<f64>,
        z: Vec<f64>,
        case: JoinCase,
    },
    /// `w * ext_i * ext_j`, where `ext` is the joint indicator across layers.
    JoinCountMultivariate { ext: Vec<f64> },
}

impl EdgeKernel {
    /// Number of units the kernel holds values for.
    pub fn n(&self) -> usize {
        match self {
            EdgeKernel::Geary { z } => z.len(),
            EdgeKernel::GearyMultivariate { layers } => layers.first().map_or(0, Vec::len),
            EdgeKernel::JoinCount { y } => y.len(),
            EdgeKernel::JoinCountBivariate { x, .. } => x.len(),
            EdgeKernel::JoinCountMultivariate { ext } => ext.len(),
        }
    }

    /// Score the directed edge `(focal, neighbor)` with weight `w`.
    #[inline]
    pub fn edge_score(&self, focal: usize, neighbor: usize, w: f64) -> f64 {
        match self {
            EdgeKernel::Geary { z } => {
                let d = z[focal] - z[neighbor];
                w * d * d
            }
            EdgeKernel::GearyMultivariate { layers } => {
                let sum: f64 = layers
                    .iter()
                    .map(|z| {
                        let d = z[focal] - z[neighbor];
                        d * d
                    })
                    .sum();
                w * sum / layers.len() as f64
            }
            EdgeKernel::JoinCount { y } => w * indicator(y[focal] == 1.0 && y[neighbor] == 1.0),
            EdgeKernel::JoinCountBivariate { x, z, case } => {
                let hit = match case {
                    JoinCase::Bjc => {
                        x[focal] == 1.0 && z[focal] == 0.0 && x[neighbor] == 0.0 && z[neighbor] == 1.0
                    }
                    JoinCase::Clc => {
                        x[focal] == 1.0 && z[focal] == 1.0 && x[neighbor] == 1.0 && z[neighbor] == 1.0
                    }
                };
                w * indicator(hit)
            }
            EdgeKernel::JoinCountMultivariate { ext } => w * ext[focal] * ext[neighbor],
        }
    }

    /// Observed statistic over the graph's true neighbors.
    pub fn observed(&self, graph: &WeightsGraph) -> Vec<f64> {
        aggregate(graph, |i, j, w| self.edge_score(i, j, w))
    }

    /// Statistic for `focal` with `sample` substituted for its neighbors.
    ///
    /// `weights` are the focal unit's true edge weights, applied by position.
    #[inline]
    pub fn simulate(&self, focal: usize, sample: &[usize], weights: &[f64]) -> f64 {
        debug_assert_eq!(sample.len(), weights.len());
        sample
            .iter()
            .zip(weights.iter())
            .fold(self.identity(), |acc, (&j, &w)| acc + self.edge_score(focal, j, w))
    }

    /// Value of the statistic over an empty neighbor set.
    pub fn identity(&self) -> f64 {
        0.0
    }

    /// Whether an observed identity value makes the p-value undefined.
    pub fn nan_on_identity(&self) -> bool {
        matches!(
            self,
            EdgeKernel::JoinCount { .. }
                | EdgeKernel::JoinCountBivariate { .. }
                | EdgeKernel::JoinCountMultivariate { .. }
        )
    }
}

#[inline]
fn indicator(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_case() {
        assert_eq!("BJC".parse::<JoinCase>().unwrap(), JoinCase::Bjc);
        assert_eq!("CLC".parse::<JoinCase>().unwrap(), JoinCase::Clc);
        assert_eq!(
            "XYZ".parse::<JoinCase>(),
            Err(LisaError::UnsupportedCase("XYZ".into()))
        );
    }

    #[test]
    fn test_simulate_uses_positional_weights() {
        let k = EdgeKernel::Geary {
            z: vec![0.0, 1.0, 2.0, 3.0],
        };
        // focal 0 with substitutes 3, 1 weighted 0.25, 0.75
        let s = k.simulate(0, &[3, 1], &[0.25, 0.75]);
        assert!((s - (0.25 * 9.0 + 0.75 * 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_simulate_empty_sample_is_identity() {
        let k = EdgeKernel::JoinCount {
            y: vec![1.0, 1.0],
        };
        assert_eq!(k.simulate(0, &[], &[]), k.identity());
    }

    #[test]
    fn test_bivariate_patterns() {
        let bjc = EdgeKernel::JoinCountBivariate {
            x: vec![1.0, 0.0],
            z: vec![0.0, 1.0],
            case: JoinCase::Bjc,
        };
        assert_eq!(bjc.edge_score(0, 1, 1.0), 1.0);
        assert_eq!(bjc.edge_score(1, 0, 1.0), 0.0);

        let clc = EdgeKernel::JoinCountBivariate {
            x: vec![1.0, 1.0],
            z: vec![1.0, 1.0],
            case: JoinCase::Clc,
        };
        assert_eq!(clc.edge_score(0, 1, 1.0), 1.0);
    }

    #[test]
    fn test_nan_on_identity() {
        assert!(!EdgeKernel::Geary { z: vec![] }.nan_on_identity());
        assert!(EdgeKernel::JoinCountMultivariate { ext: vec![] }.nan_on_identity());
    }
}
