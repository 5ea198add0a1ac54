//! Regular lattice contiguity graphs.
//!
//! Units are numbered in row-major order, with string ids `"0".."n-1"`.

use serde::{Deserialize, Serialize};

use crate::error::WeightsError;
use crate::graph::WeightsGraph;

/// Contiguity rule for lattice neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Contiguity {
    /// Shared edges only (4 neighbors in the interior).
    #[default]
    Rook,
    /// Shared edges or corners (8 neighbors in the interior).
    Queen,
}

/// Build a binary-weighted `rows x cols` lattice graph.
pub fn lattice(rows: usize, cols: usize, contiguity: Contiguity) -> Result<WeightsGraph, WeightsError> {
    if rows == 0 || cols == 0 {
        return Err(WeightsError::EmptyLattice { rows, cols });
    }

    let n = rows * cols;
    let mut neighbors = Vec::with_capacity(n);
    for row in 0..rows {
        for col in 0..cols {
            let mut nbrs = Vec::with_capacity(8);
            for dr in -1_isize..=1 {
                for dc in -1_isize..=1 {
                    if dr == 0 && dc == 0 {
                        continue;
                    }
                    if contiguity == Contiguity::Rook && dr != 0 && dc != 0 {
                        continue;
                    }
                    let nr = row as isize + dr;
                    let nc = col as isize + dc;
                    if nr >= 0 && nc >= 0 && (nr as usize) < rows && (nc as usize) < cols {
                        nbrs.push(nr as usize * cols + nc as usize);
                    }
                }
            }
            neighbors.push(nbrs);
        }
    }

    let ids = (0..n).map(|i| i.to_string()).collect();
    WeightsGraph::from_binary_neighbors(ids, neighbors)
}
