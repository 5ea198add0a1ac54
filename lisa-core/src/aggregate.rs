//! Neighbor aggregation: per-edge scores summed per focal unit.
//!
//!   S_i = sum_{j in N(i)} score(i, j, w_ij)
//!
//! Units without edges get 0. Zero-weight edges are still visited so that
//! the grouping never skips a unit. Scores are reduced in canonical
//! `(focal, neighbor, weight)` order, which makes the result independent of
//! the order in which edges are supplied.

use std::cmp::Ordering;

use lisa_weights::{Edge, WeightsGraph};

use crate::error::{LisaError, Result};

/// Aggregate edge scores over the graph's CSR edge arena.
pub fn aggregate<F>(graph: &WeightsGraph, edge_score: F) -> Vec<f64>
where
    F: Fn(usize, usize, f64) -> f64,
{
    (0..graph.n())
        .map(|i| {
            graph
                .neighbors(i)
                .iter()
                .zip(graph.weights(i).iter())
                .fold(0.0, |acc, (&j, &w)| acc + edge_score(i, j, w))
        })
        .collect()
}

/// Aggregate edge scores over an arbitrary edge list for `n` units.
///
/// The edge list may be in any order. An edge whose endpoints fall outside
/// `0..n` is an `EdgeOutOfRange` error.
pub fn aggregate_edges<F>(n: usize, edges: &[Edge], edge_score: F) -> Result<Vec<f64>>
where
    F: Fn(usize, usize, f64) -> f64,
{
    if let Some(bad) = edges.iter().find(|e| e.focal >= n || e.neighbor >= n) {
        return Err(LisaError::EdgeOutOfRange {
            focal: bad.focal,
            neighbor: bad.neighbor,
            n,
        });
    }

    let mut sorted: Vec<&Edge> = edges.iter().collect();
    sorted.sort_by(|a, b| canonical_order(a, b));

    let mut result = vec![0.0; n];
    for edge in sorted {
        result[edge.focal] += edge_score(edge.focal, edge.neighbor, edge.weight);
    }
    Ok(result)
}

fn canonical_order(a: &Edge, b: &Edge) -> Ordering {
    a.focal
        .cmp(&b.focal)
        .then(a.neighbor.cmp(&b.neighbor))
        .then(a.weight.total_cmp(&b.weight))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lisa_weights::{lattice, Contiguity};

    #[test]
    fn test_degree_count() {
        let g = lattice(3, 3, Contiguity::Rook).unwrap();
        let deg = aggregate(&g, |_, _, w| w);
        assert_eq!(deg, vec![2.0, 3.0, 2.0, 3.0, 4.0, 3.0, 2.0, 3.0, 2.0]);
    }

    #[test]
    fn test_isolated_unit_is_zero() {
        let g = WeightsGraph::from_binary_neighbors(
            vec!["a".into(), "b".into(), "c".into()],
            vec![vec![1], vec![0], vec![]],
        )
        .unwrap();
        let s = aggregate(&g, |_, _, _| 1.0);
        assert_eq!(s, vec![1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_edge_list_matches_graph() {
        let g = lattice(3, 4, Contiguity::Queen).unwrap();
        let values: Vec<f64> = (0..12).map(|i| (i as f64 * 0.37).sin()).collect();
        let score = |i: usize, j: usize, w: f64| w * (values[i] - values[j]).powi(2);

        let mut edges: Vec<Edge> = g.edges().collect();
        edges.reverse();
        assert_eq!(
            aggregate_edges(g.n(), &edges, score).unwrap(),
            aggregate(&g, score)
        );
    }

    #[test]
    fn test_zero_weight_edge_contributes_zero() {
        let edges = vec![
            Edge { focal: 0, neighbor: 1, weight: 0.0 },
            Edge { focal: 1, neighbor: 0, weight: 2.0 },
        ];
        let s = aggregate_edges(3, &edges, |_, _, w| w * 5.0).unwrap();
        assert_eq!(s, vec![0.0, 10.0, 0.0]);
    }

    #[test]
    fn test_edge_out_of_range() {
        let edges = vec![
            Edge { focal: 0, neighbor: 1, weight: 1.0 },
            Edge { focal: 1, neighbor: 4, weight: 1.0 },
        ];
        let err = aggregate_edges(2, &edges, |_, _, w| w).unwrap_err();
        assert_eq!(
            err,
            LisaError::EdgeOutOfRange {
                focal: 1,
                neighbor: 4,
                n: 2
            }
        );
    }
}
