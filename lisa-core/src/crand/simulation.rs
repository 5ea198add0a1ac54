//! Simulated null distributions, one row per unit.

use serde::{Deserialize, Serialize};

/// Row-major `n x permutations` matrix of simulated statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationMatrix {
    n_units: usize,
    permutations: usize,
    data: Vec<f64>,
}

impl SimulationMatrix {
    /// Wrap a flat row-major buffer.
    pub fn from_row_major(n_units: usize, permutations: usize, data: Vec<f64>) -> Self {
        assert_eq!(data.len(), n_units * permutations);
        Self {
            n_units,
            permutations,
            data,
        }
    }

    pub fn n_units(&self) -> usize {
        self.n_units
    }

    pub fn permutations(&self) -> usize {
        self.permutations
    }

    /// Replicates for unit `i`.
    pub fn row(&self, i: usize) -> &[f64] {
        let start = i * self.permutations;
        &self.data[start..start + self.permutations]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        (0..self.n_units).map(move |i| self.row(i))
    }
}
