//! Worker-count policy and unit partitioning.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::LisaError;

/// Requested degree of parallelism for the per-unit simulation loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Parallelism {
    /// A fixed number of workers. `Workers(0)` means every available core,
    /// the same as parsing `"0"`.
    Workers(usize),
    /// One worker per available core.
    AllAvailable,
}

impl Default for Parallelism {
    fn default() -> Self {
        Parallelism::Workers(1)
    }
}

impl Parallelism {
    /// Resolve to a concrete worker count. Never blocks.
    pub fn resolve(self) -> usize {
        match self {
            Parallelism::Workers(0) | Parallelism::AllAvailable => {
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1)
            }
            Parallelism::Workers(n) => n,
        }
    }
}

impl std::str::FromStr for Parallelism {
    type Err = LisaError;

    /// `"all"`, `"-1"` and `"0"` request every available core.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") || s == "-1" || s == "0" {
            return Ok(Parallelism::AllAvailable);
        }
        match s.parse::<usize>() {
            Ok(n) => Ok(Parallelism::Workers(n)),
            Err(_) => Err(LisaError::InvalidParallelism(s.to_string())),
        }
    }
}

/// Split `0..n` into at most `workers` contiguous ranges in index order.
pub fn partition_units(n: usize, workers: usize) -> Vec<Range<usize>> {
    if n == 0 {
        return Vec::new();
    }
    let workers = workers.clamp(1, n);
    let chunk = n.div_ceil(workers);
    (0..n)
        .step_by(chunk)
        .map(|start| start..(start + chunk).min(n))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("4".parse::<Parallelism>().unwrap(), Parallelism::Workers(4));
        assert_eq!("all".parse::<Parallelism>().unwrap(), Parallelism::AllAvailable);
        assert_eq!("-1".parse::<Parallelism>().unwrap(), Parallelism::AllAvailable);
        assert!(matches!(
            "many".parse::<Parallelism>(),
            Err(LisaError::InvalidParallelism(_))
        ));
    }

    #[test]
    fn test_resolve() {
        assert_eq!(Parallelism::Workers(3).resolve(), 3);
        assert_eq!(
            Parallelism::Workers(0).resolve(),
            Parallelism::AllAvailable.resolve()
        );
        assert_eq!(
            "0".parse::<Parallelism>().unwrap().resolve(),
            Parallelism::Workers(0).resolve()
        );
        assert!(Parallelism::AllAvailable.resolve() >= 1);
    }

    #[test]
    fn test_partitions_cover_in_order() {
        let parts = partition_units(10, 3);
        assert_eq!(parts, vec![0..4, 4..8, 8..10]);
        let parts = partition_units(2, 8);
        assert_eq!(parts, vec![0..1, 1..2]);
        assert!(partition_units(0, 4).is_empty());
    }
}
