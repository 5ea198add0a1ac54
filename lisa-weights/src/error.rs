//! Errors raised while building or transforming a weights graph.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WeightsError {
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Unit {unit} has {neighbors} neighbors but {weights} weights")]
    CardinalityMismatch {
        unit: usize,
        neighbors: usize,
        weights: usize,
    },

    #[error("Neighbor index {index} of unit {unit} is out of range for {n} units")]
    NeighborOutOfRange { unit: usize, index: usize, n: usize },

    #[error("Duplicate unit id '{0}'")]
    DuplicateId(String),

    #[error("Connectivity matrix must be square, got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    #[error("Lattice dimensions must be non-zero, got {rows}x{cols}")]
    EmptyLattice { rows: usize, cols: usize },
}
