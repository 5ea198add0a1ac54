//! Conditional randomization inference.
//!
//! For each unit i with k_i neighbors, each replicate replaces the true
//! neighbor set by k_i units drawn without replacement from the other
//! n - 1 units, keeps the focal value and focal weights fixed, and
//! recomputes the statistic. The pseudo p-value folds the count of
//! replicates at least as large as the observed value into the smaller
//! tail:
//!
//!   larger = #{r : sim_ir >= obs_i}
//!   larger = min(larger, permutations - larger)
//!   p_i    = (larger + 1) / (permutations + 1)
//!
//! Unit i draws from stream i of a ChaCha8 generator seeded once per call,
//! so results are reproducible for a given seed whatever the worker count.

pub mod parallel;
pub mod sampler;
pub mod simulation;

use std::ops::Range;

use lisa_weights::WeightsGraph;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LisaError, Result};
use crate::kernel::EdgeKernel;
use crate::util::math::check_len;

pub use parallel::{partition_units, Parallelism};
pub use sampler::UnitSampler;
pub use simulation::SimulationMatrix;

/// Configuration for conditional randomization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrandConfig {
    /// Number of replicates per unit. 0 disables randomization.
    pub permutations: usize,
    /// Seed for the replicate generator. Drawn from OS entropy when absent.
    pub seed: Option<u64>,
    /// Worker count for the per-unit loop.
    pub parallelism: Parallelism,
    /// Return the full simulation matrix alongside the p-values.
    pub keep_simulations: bool,
}

impl Default for CrandConfig {
    fn default() -> Self {
        Self {
            permutations: 999,
            seed: None,
            parallelism: Parallelism::default(),
            keep_simulations: true,
        }
    }
}

/// Output of a randomization run.
#[derive(Debug, Clone)]
pub struct CrandOutput {
    /// Pseudo p-values in (0, 1], or NaN where undefined.
    pub p_sim: Vec<f64>,
    /// Simulated statistics, if retained.
    pub simulations: Option<SimulationMatrix>,
    /// Seed actually used, for reproducing the run.
    pub seed: u64,
}

/// Run conditional randomization for an edge-sum statistic.
///
/// Returns `Ok(None)` when `config.permutations` is 0. The graph must be the
/// one the observed statistic was computed on.
pub fn conditional_randomization(
    graph: &WeightsGraph,
    kernel: &EdgeKernel,
    observed: &[f64],
    config: &CrandConfig,
) -> Result<Option<CrandOutput>> {
    let permutations = config.permutations;
    if permutations == 0 {
        return Ok(None);
    }

    let n = graph.n();
    check_len(observed, n)?;
    if kernel.n() != n {
        return Err(LisaError::LengthMismatch {
            expected: n,
            got: kernel.n(),
        });
    }

    let seed = config.seed.unwrap_or_else(|| rand::rngs::OsRng.gen());
    let workers = config.parallelism.resolve().min(n.max(1));
    debug!(
        "Conditional randomization: {} units, {} permutations, {} workers, seed {}",
        n, permutations, workers, seed
    );

    let partitions = partition_units(n, workers);
    let run = |range: &Range<usize>| {
        simulate_partition(graph, kernel, range.clone(), permutations, seed)
    };

    let blocks: Vec<Vec<f64>> = if workers == 1 {
        partitions.iter().map(run).collect::<Result<Vec<_>>>()?
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| LisaError::ThreadPool(e.to_string()))?;
        pool.install(|| partitions.par_iter().map(run).collect::<Result<Vec<_>>>())?
    };

    let data: Vec<f64> = blocks.into_iter().flatten().collect();
    let simulations = SimulationMatrix::from_row_major(n, permutations, data);

    let mut p_sim = pseudo_p_values(observed, &simulations);
    for i in 0..n {
        let undefined = graph.cardinality(i) == 0
            || (kernel.nan_on_identity() && observed[i] == kernel.identity());
        if undefined {
            p_sim[i] = f64::NAN;
        }
    }

    Ok(Some(CrandOutput {
        p_sim,
        simulations: config.keep_simulations.then_some(simulations),
        seed,
    }))
}

/// Simulate every unit in `range`; rows are returned flattened in index order.
fn simulate_partition(
    graph: &WeightsGraph,
    kernel: &EdgeKernel,
    range: Range<usize>,
    permutations: usize,
    seed: u64,
) -> Result<Vec<f64>> {
    let n = graph.n();
    let mut out = Vec::with_capacity(range.len() * permutations);
    let mut sampler = UnitSampler::new(n, range.start);

    for i in range {
        let k = graph.cardinality(i);
        let weights = graph.weights(i);
        sampler.reset(i);
        if k > sampler.pool_size() {
            return Err(LisaError::CandidatePoolTooSmall {
                unit: i,
                cardinality: k,
                pool: sampler.pool_size(),
            });
        }

        let mut rng = unit_rng(seed, i);
        for _ in 0..permutations {
            let sample = sampler.draw(&mut rng, k);
            out.push(kernel.simulate(i, sample, weights));
        }
    }

    Ok(out)
}

/// Generator for unit `i`: stream `i` of the seeded ChaCha8 generator.
pub fn unit_rng(seed: u64, unit: usize) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(unit as u64);
    rng
}

/// Two-sided folded pseudo p-values with add-one smoothing.
pub fn pseudo_p_values(observed: &[f64], simulations: &SimulationMatrix) -> Vec<f64> {
    let permutations = simulations.permutations();
    observed
        .iter()
        .zip(simulations.rows())
        .map(|(&obs, row)| {
            let mut larger = row.iter().filter(|&&s| s >= obs).count();
            if permutations - larger < larger {
                larger = permutations - larger;
            }
            (larger as f64 + 1.0) / (permutations as f64 + 1.0)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::JoinCase;
    use lisa_weights::{lattice, Contiguity, Transform};

    fn join_count_setup() -> (WeightsGraph, EdgeKernel, Vec<f64>) {
        let g = lattice(4, 4, Contiguity::Rook)
            .unwrap()
            .with_transform(Transform::Binary);
        let mut y = vec![0.0; 16];
        y[8..].iter_mut().for_each(|v| *v = 1.0);
        let kernel = EdgeKernel::JoinCount { y };
        let obs = kernel.observed(&g);
        (g, kernel, obs)
    }

    #[test]
    fn test_zero_permutations_disables() {
        let (g, kernel, obs) = join_count_setup();
        let config = CrandConfig {
            permutations: 0,
            ..Default::default()
        };
        assert!(conditional_randomization(&g, &kernel, &obs, &config)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_seed_reproducible() {
        let (g, kernel, obs) = join_count_setup();
        let config = CrandConfig {
            permutations: 99,
            seed: Some(12345),
            ..Default::default()
        };
        let a = conditional_randomization(&g, &kernel, &obs, &config).unwrap().unwrap();
        let b = conditional_randomization(&g, &kernel, &obs, &config).unwrap().unwrap();
        assert_eq!(a.simulations, b.simulations);
        assert_eq!(a.seed, 12345);
    }

    #[test]
    fn test_nan_where_join_count_is_zero() {
        let (g, kernel, obs) = join_count_setup();
        let config = CrandConfig {
            permutations: 49,
            seed: Some(1),
            ..Default::default()
        };
        let out = conditional_randomization(&g, &kernel, &obs, &config).unwrap().unwrap();
        for i in 0..16 {
            if obs[i] == 0.0 {
                assert!(out.p_sim[i].is_nan());
            } else {
                assert!(out.p_sim[i] > 0.0 && out.p_sim[i] <= 1.0);
            }
        }
    }

    #[test]
    fn test_pool_too_small() {
        // Unit 0 lists both units, itself included, as neighbors.
        let g = WeightsGraph::from_binary_neighbors(
            vec!["a".into(), "b".into()],
            vec![vec![0, 1], vec![0]],
        )
        .unwrap();
        let kernel = EdgeKernel::Geary { z: vec![-1.0, 1.0] };
        let obs = kernel.observed(&g);
        let config = CrandConfig {
            permutations: 9,
            seed: Some(0),
            ..Default::default()
        };
        let err = conditional_randomization(&g, &kernel, &obs, &config).unwrap_err();
        assert_eq!(
            err,
            LisaError::CandidatePoolTooSmall {
                unit: 0,
                cardinality: 2,
                pool: 1
            }
        );
    }

    #[test]
    fn test_pseudo_p_values_fold() {
        // 4 replicates; obs=5 has 0 larger -> p=1/5; obs=0 has 4 larger -> folded to 0 -> 1/5;
        // obs=3 has 2 larger -> 3/5.
        let sims = SimulationMatrix::from_row_major(
            3,
            4,
            vec![1.0, 2.0, 3.0, 4.0, 1.0, 2.0, 3.0, 4.0, 1.0, 2.0, 3.0, 4.0],
        );
        let p = pseudo_p_values(&[5.0, 0.0, 3.0], &sims);
        assert!((p[0] - 0.2).abs() < 1e-12);
        assert!((p[1] - 0.2).abs() < 1e-12);
        assert!((p[2] - 0.6).abs() < 1e-12);
    }

    fn complete_graph(n: usize) -> WeightsGraph {
        let ids = (0..n).map(|i| i.to_string()).collect();
        let neighbors = (0..n)
            .map(|i| (0..n).filter(|&j| j != i).collect())
            .collect();
        WeightsGraph::from_binary_neighbors(ids, neighbors).unwrap()
    }

    fn seeded(permutations: usize, seed: u64) -> CrandConfig {
        CrandConfig {
            permutations,
            seed: Some(seed),
            ..Default::default()
        }
    }

    #[test]
    fn test_complete_graph_geary_replicates_equal_observed() {
        // k_i = n - 1, so every draw is the whole pool in some order.
        let g = complete_graph(6).with_transform(Transform::Row);
        let kernel = EdgeKernel::Geary {
            z: vec![-1.2, 0.4, 2.0, -0.3, 0.9, -1.8],
        };
        let obs = kernel.observed(&g);
        let out = conditional_randomization(&g, &kernel, &obs, &seeded(25, 8))
            .unwrap()
            .unwrap();
        let sims = out.simulations.unwrap();
        for i in 0..6 {
            for &s in sims.row(i) {
                assert!((s - obs[i]).abs() < 1e-12, "unit {}: {} vs {}", i, s, obs[i]);
            }
        }
    }

    #[test]
    fn test_complete_graph_join_cases_replicates_equal_observed() {
        let g = complete_graph(7);
        let x = vec![1.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0];
        let z = vec![0.0, 1.0, 1.0, 1.0, 0.0, 0.0, 1.0];
        for case in [JoinCase::Bjc, JoinCase::Clc] {
            let kernel = EdgeKernel::JoinCountBivariate {
                x: x.clone(),
                z: z.clone(),
                case,
            };
            let obs = kernel.observed(&g);
            let out = conditional_randomization(&g, &kernel, &obs, &seeded(20, 3))
                .unwrap()
                .unwrap();
            let sims = out.simulations.unwrap();
            for i in 0..7 {
                assert!(
                    sims.row(i).iter().all(|&s| s == obs[i]),
                    "{} unit {}",
                    case,
                    i
                );
            }
        }
    }

    #[test]
    fn test_replicates_use_focal_value_and_positional_weights() {
        // Unequal weights so a wrong weight slice or focal index shows up.
        let g = WeightsGraph::from_neighbors(
            (0..5).map(|i| i.to_string()).collect(),
            vec![vec![1, 3], vec![0], vec![1, 3, 4], vec![2], vec![]],
            vec![vec![0.5, 2.0], vec![3.0], vec![1.0, 0.25, 4.0], vec![1.5], vec![]],
        )
        .unwrap();
        let z = vec![0.3, -1.1, 2.4, 0.0, -0.7];
        let kernel = EdgeKernel::Geary { z: z.clone() };
        let obs = kernel.observed(&g);
        let seed = 77;
        let out = conditional_randomization(&g, &kernel, &obs, &seeded(15, seed))
            .unwrap()
            .unwrap();
        let sims = out.simulations.unwrap();

        for i in 0..5 {
            let weights = g.weights(i);
            let mut sampler = UnitSampler::new(5, i);
            let mut rng = unit_rng(seed, i);
            for r in 0..15 {
                let sample = sampler.draw(&mut rng, weights.len());
                let expected = sample
                    .iter()
                    .zip(weights)
                    .fold(0.0, |acc, (&j, &w)| acc + w * (z[i] - z[j]).powi(2));
                assert!(
                    (sims.row(i)[r] - expected).abs() < 1e-12,
                    "unit {} replicate {}",
                    i,
                    r
                );
            }
        }
    }

    #[test]
    fn test_bivariate_replicate_follows_substituted_z() {
        // Unit 0 is (x=1, z=0) with one neighbor. Candidates 1 and 2 both have
        // x = 0 and differ only in z, so a BJC replicate is 1 exactly when
        // unit 1 (z = 1) is drawn.
        let g = WeightsGraph::from_binary_neighbors(
            vec!["a".into(), "b".into(), "c".into()],
            vec![vec![1], vec![0], vec![]],
        )
        .unwrap();
        let kernel = EdgeKernel::JoinCountBivariate {
            x: vec![1.0, 0.0, 0.0],
            z: vec![0.0, 1.0, 0.0],
            case: JoinCase::Bjc,
        };
        let obs = kernel.observed(&g);
        assert_eq!(obs, vec![1.0, 0.0, 0.0]);
        let seed = 2024;
        let out = conditional_randomization(&g, &kernel, &obs, &seeded(200, seed))
            .unwrap()
            .unwrap();
        let row = out.simulations.unwrap().row(0).to_vec();

        let mut sampler = UnitSampler::new(3, 0);
        let mut rng = unit_rng(seed, 0);
        for &s in &row {
            let drawn = sampler.draw(&mut rng, 1)[0];
            assert_eq!(s, if drawn == 1 { 1.0 } else { 0.0 });
        }
        assert!(row.contains(&0.0) && row.contains(&1.0));
    }

    #[test]
    fn test_discard_simulations() {
        let (g, kernel, obs) = join_count_setup();
        let config = CrandConfig {
            permutations: 19,
            seed: Some(2),
            keep_simulations: false,
            ..Default::default()
        };
        let out = conditional_randomization(&g, &kernel, &obs, &config).unwrap().unwrap();
        assert!(out.simulations.is_none());
        assert_eq!(out.p_sim.len(), 16);
    }
}
