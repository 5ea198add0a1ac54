//! Edge-weight transforms.

use serde::{Deserialize, Serialize};

/// How the supplied edge weights are rescaled before use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Transform {
    /// Weights exactly as supplied.
    #[default]
    Original,
    /// Every stored edge has weight 1.
    Binary,
    /// Each unit's weights are divided by their sum.
    Row,
}

impl Transform {
    /// Apply the transform to a CSR weight array.
    ///
    /// Always works from the supplied weights, so transforms never compound.
    /// Rows summing to zero are left unchanged.
    pub(crate) fn apply(self, offsets: &[usize], original: &[f64]) -> Vec<f64> {
        match self {
            Transform::Original => original.to_vec(),
            Transform::Binary => vec![1.0; original.len()],
            Transform::Row => {
                let mut out = original.to_vec();
                for bounds in offsets.windows(2) {
                    let row = &mut out[bounds[0]..bounds[1]];
                    let sum: f64 = row.iter().sum();
                    if sum != 0.0 {
                        row.iter_mut().for_each(|w| *w /= sum);
                    }
                }
                out
            }
        }
    }
}

impl std::fmt::Display for Transform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            Transform::Original => "O",
            Transform::Binary => "B",
            Transform::Row => "R",
        };
        write!(f, "{}", tag)
    }
}
