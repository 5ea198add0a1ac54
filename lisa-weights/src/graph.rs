#![allow(clippy::needless_range_loop)]
//! Spatial weights graph stored as a flat CSR edge arena.
//!
//! Each unit owns a contiguous slice of the `neighbors` / `weights`
//! arrays, delimited by `offsets[i]..offsets[i + 1]`. Edges are kept
//! even when their weight is exactly zero so that unit indexing stays
//! stable under every transform.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sprs::{CsMatI, TriMatI};

use crate::error::WeightsError;
use crate::transform::Transform;

/// A directed edge record `(focal, neighbor, weight)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub focal: usize,
    pub neighbor: usize,
    pub weight: f64,
}

/// Immutable neighbor graph over `n` units in a fixed id order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightsGraph {
    id_order: Vec<String>,
    offsets: Vec<usize>,
    neighbors: Vec<usize>,
    /// Weights under the current transform.
    weights: Vec<f64>,
    /// Weights exactly as supplied at construction.
    original: Vec<f64>,
    transform: Transform,
}

impl WeightsGraph {
    /// Build a graph from ragged per-unit neighbor and weight lists.
    ///
    /// `neighbors[i]` holds indices into `id_order`; `weights[i]` must have
    /// the same length. Each unit's edges are stored sorted by neighbor index.
    pub fn from_neighbors(
        id_order: Vec<String>,
        neighbors: Vec<Vec<usize>>,
        weights: Vec<Vec<f64>>,
    ) -> Result<Self, WeightsError> {
        let n = id_order.len();
        if neighbors.len() != n {
            return Err(WeightsError::DimensionMismatch {
                expected: n,
                got: neighbors.len(),
            });
        }
        if weights.len() != n {
            return Err(WeightsError::DimensionMismatch {
                expected: n,
                got: weights.len(),
            });
        }
        check_unique_ids(&id_order)?;

        let nnz: usize = neighbors.iter().map(Vec::len).sum();
        let mut offsets = Vec::with_capacity(n + 1);
        let mut flat_neighbors = Vec::with_capacity(nnz);
        let mut flat_weights = Vec::with_capacity(nnz);
        offsets.push(0);

        for (unit, (nbrs, wts)) in neighbors.iter().zip(weights.iter()).enumerate() {
            if nbrs.len() != wts.len() {
                return Err(WeightsError::CardinalityMismatch {
                    unit,
                    neighbors: nbrs.len(),
                    weights: wts.len(),
                });
            }
            let mut row: Vec<(usize, f64)> = Vec::with_capacity(nbrs.len());
            for (&j, &w) in nbrs.iter().zip(wts.iter()) {
                if j >= n {
                    return Err(WeightsError::NeighborOutOfRange { unit, index: j, n });
                }
                row.push((j, w));
            }
            // Canonical row order: per-unit reductions then never depend on input order.
            row.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)));
            for (j, w) in row {
                flat_neighbors.push(j);
                flat_weights.push(w);
            }
            offsets.push(flat_neighbors.len());
        }

        Ok(Self {
            id_order,
            offsets,
            neighbors: flat_neighbors,
            weights: flat_weights.clone(),
            original: flat_weights,
            transform: Transform::Original,
        })
    }

    /// Build a graph from binary neighbor lists (every weight is 1).
    pub fn from_binary_neighbors(
        id_order: Vec<String>,
        neighbors: Vec<Vec<usize>>,
    ) -> Result<Self, WeightsError> {
        let weights = neighbors.iter().map(|nb| vec![1.0; nb.len()]).collect();
        Self::from_neighbors(id_order, neighbors, weights)
    }

    /// Build a graph from a square sprs connectivity matrix.
    ///
    /// Every stored entry becomes an edge, including explicitly stored zeros.
    pub fn from_sparse(
        mat: &CsMatI<f64, usize>,
        id_order: Vec<String>,
    ) -> Result<Self, WeightsError> {
        if mat.rows() != mat.cols() {
            return Err(WeightsError::NotSquare {
                rows: mat.rows(),
                cols: mat.cols(),
            });
        }
        if mat.rows() != id_order.len() {
            return Err(WeightsError::DimensionMismatch {
                expected: id_order.len(),
                got: mat.rows(),
            });
        }

        let csr = if mat.is_csr() { mat.clone() } else { mat.to_csr() };
        let mut neighbors = vec![Vec::new(); csr.rows()];
        let mut weights = vec![Vec::new(); csr.rows()];
        for (row, vec) in csr.outer_iterator().enumerate() {
            for (col, &val) in vec.iter() {
                neighbors[row].push(col);
                weights[row].push(val);
            }
        }
        Self::from_neighbors(id_order, neighbors, weights)
    }

    /// Export the current (transformed) weights as an sprs CSR matrix.
    pub fn to_sparse(&self) -> CsMatI<f64, usize> {
        let n = self.n();
        let mut tri = TriMatI::new((n, n));
        for edge in self.edges() {
            tri.add_triplet(edge.focal, edge.neighbor, edge.weight);
        }
        tri.to_csr()
    }

    /// Number of units.
    pub fn n(&self) -> usize {
        self.id_order.len()
    }

    /// Unit identifiers in canonical order.
    pub fn id_order(&self) -> &[String] {
        &self.id_order
    }

    /// Transform currently applied to the weights.
    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Total number of directed edges.
    pub fn n_edges(&self) -> usize {
        self.neighbors.len()
    }

    /// Neighbor indices of unit `i`.
    pub fn neighbors(&self, i: usize) -> &[usize] {
        &self.neighbors[self.offsets[i]..self.offsets[i + 1]]
    }

    /// Edge weights of unit `i`, parallel to [`neighbors`](Self::neighbors).
    pub fn weights(&self, i: usize) -> &[f64] {
        &self.weights[self.offsets[i]..self.offsets[i + 1]]
    }

    /// Number of neighbors of unit `i`.
    pub fn cardinality(&self, i: usize) -> usize {
        self.offsets[i + 1] - self.offsets[i]
    }

    pub fn cardinalities(&self) -> Vec<usize> {
        (0..self.n()).map(|i| self.cardinality(i)).collect()
    }

    pub fn max_cardinality(&self) -> usize {
        (0..self.n()).map(|i| self.cardinality(i)).max().unwrap_or(0)
    }

    /// Units without any neighbor.
    pub fn islands(&self) -> Vec<usize> {
        (0..self.n()).filter(|&i| self.cardinality(i) == 0).collect()
    }

    /// Iterate all directed edges in focal order.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        (0..self.n()).flat_map(move |i| {
            self.neighbors(i)
                .iter()
                .zip(self.weights(i).iter())
                .map(move |(&j, &w)| Edge {
                    focal: i,
                    neighbor: j,
                    weight: w,
                })
        })
    }

    /// Return a copy with the given transform applied to the supplied weights.
    pub fn with_transform(&self, transform: Transform) -> Self {
        let mut out = self.clone();
        out.weights = transform.apply(&self.offsets, &self.original);
        out.transform = transform;
        out
    }

    /// Return a copy without diagonal (self-loop) edges.
    pub fn without_self_loops(&self) -> Self {
        let n = self.n();
        let mut offsets = Vec::with_capacity(n + 1);
        let mut neighbors = Vec::with_capacity(self.n_edges());
        let mut original = Vec::with_capacity(self.n_edges());
        offsets.push(0);
        for i in 0..n {
            let range = self.offsets[i]..self.offsets[i + 1];
            for idx in range {
                if self.neighbors[idx] != i {
                    neighbors.push(self.neighbors[idx]);
                    original.push(self.original[idx]);
                }
            }
            offsets.push(neighbors.len());
        }
        let weights = self.transform.apply(&offsets, &original);
        Self {
            id_order: self.id_order.clone(),
            offsets,
            neighbors,
            weights,
            original,
            transform: self.transform,
        }
    }

    /// Whether any unit lists itself as a neighbor.
    pub fn has_self_loops(&self) -> bool {
        (0..self.n()).any(|i| self.neighbors(i).contains(&i))
    }

    /// Spatial lag: `lag[i] = sum_j w_ij * values[j]`.
    pub fn lag(&self, values: &[f64]) -> Result<Vec<f64>, WeightsError> {
        if values.len() != self.n() {
            return Err(WeightsError::DimensionMismatch {
                expected: self.n(),
                got: values.len(),
            });
        }
        let mut result = vec![0.0; self.n()];
        for i in 0..self.n() {
            let mut sum = 0.0;
            for idx in self.offsets[i]..self.offsets[i + 1] {
                sum += self.weights[idx] * values[self.neighbors[idx]];
            }
            result[i] = sum;
        }
        Ok(result)
    }

    /// Sum of edge weights per unit.
    pub fn row_sums(&self) -> Vec<f64> {
        (0..self.n())
            .map(|i| self.weights(i).iter().sum::<f64>())
            .collect()
    }

    /// Sum of squared edge weights per unit.
    pub fn squared_row_sums(&self) -> Vec<f64> {
        (0..self.n())
            .map(|i| self.weights(i).iter().map(|w| w * w).sum::<f64>())
            .collect()
    }
}

fn check_unique_ids(ids: &[String]) -> Result<(), WeightsError> {
    let mut seen = HashSet::with_capacity(ids.len());
    for id in ids {
        if !seen.insert(id.as_str()) {
            return Err(WeightsError::DuplicateId(id.clone()));
        }
    }
    Ok(())
}
