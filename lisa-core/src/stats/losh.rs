//! Local spatial heteroscedasticity (LOSH).
//!
//! With row sums r_i and the spatial mean ybar_i = lag(y)_i / r_i:
//!
//!   e_i  = |y_i - ybar_i|^a
//!   H_i  = lag(e)_i / (mean(e) * r_i)
//!
//! Under a = 2 the statistic has the closed-form variance
//!
//!   VarH_i = (n - 1)^-1 * (mean(e) r_i)^-2 * (mean(e^2) - mean(e)^2)
//!            * (n sum_j w_ij^2 - r_i^2)
//!
//! and 2 H_i / VarH_i is approximately chi-square with 2 / VarH_i degrees of
//! freedom.

use std::str::FromStr;

use lisa_weights::WeightsGraph;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF};
use tracing::{info, warn};

use crate::error::{LisaError, Result};
use crate::stats::{LocalFit, LocalStatistic};
use crate::util::math::{check_len, mean};

/// Inference mode for LOSH.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoshInference {
    /// Statistic only.
    #[default]
    None,
    /// Analytic chi-square approximation.
    ChiSquare,
}

impl FromStr for LoshInference {
    type Err = LisaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(LoshInference::None),
            "chi-square" | "chi2" => Ok(LoshInference::ChiSquare),
            _ => Err(LisaError::UnsupportedInference(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoshConfig {
    /// Residual exponent `a`.
    pub exponent: f64,
    pub inference: LoshInference,
}

impl Default for LoshConfig {
    fn default() -> Self {
        Self {
            exponent: 2.0,
            inference: LoshInference::None,
        }
    }
}

/// Non-fatal conditions raised while fitting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InferenceWarning {
    /// Chi-square inference was requested with an exponent other than 2,
    /// where the variance derivation does not hold.
    ExponentNotTwo { exponent: f64 },
}

impl std::fmt::Display for InferenceWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InferenceWarning::ExponentNotTwo { exponent } => write!(
                f,
                "chi-square inference assumes exponent 2, got {}",
                exponent
            ),
        }
    }
}

/// Per-unit LOSH intermediates and analytic inference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoshDetails {
    /// Spatial mean of y.
    pub ylag: Vec<f64>,
    /// Residuals `|y - ylag|^a`.
    pub yresid: Vec<f64>,
    pub var_hi: Vec<f64>,
    /// Upper-tail chi-square p-values, when requested.
    pub p_chi2: Option<Vec<f64>>,
    #[serde(default)]
    pub warnings: Vec<InferenceWarning>,
}

/// Fit LOSH on the graph as given (no weight transform).
///
/// Units whose weights sum to 0 (no neighbors, or only zero-weight edges)
/// keep their own value as spatial mean and get NaN for `Hi`, `VarHi` and
/// the p-value.
pub fn losh(graph: &WeightsGraph, y: &[f64], config: &LoshConfig) -> Result<LocalFit> {
    let n = graph.n();
    check_len(y, n)?;
    let a = config.exponent;
    if !a.is_finite() || a <= 0.0 {
        return Err(LisaError::InvalidExponent(a));
    }
    if n < 2 {
        return Err(LisaError::TooFewUnits { n, min: 2 });
    }
    info!("LOSH: {} units, exponent {}", n, a);

    let rowsum = graph.row_sums();
    let squared = graph.squared_row_sums();
    let lag_y = graph.lag(y)?;

    let ylag: Vec<f64> = (0..n)
        .map(|i| {
            if rowsum[i] == 0.0 {
                y[i]
            } else {
                lag_y[i] / rowsum[i]
            }
        })
        .collect();
    let yresid: Vec<f64> = y
        .iter()
        .zip(&ylag)
        .map(|(yi, li)| (yi - li).abs().powf(a))
        .collect();

    let resid_mean = mean(&yresid);
    if resid_mean == 0.0 {
        return Err(LisaError::ZeroVariance);
    }
    let resid_sq_mean = yresid.iter().map(|e| e * e).sum::<f64>() / n as f64;
    let spread = resid_sq_mean - resid_mean * resid_mean;
    let nf = n as f64;

    let lag_resid = graph.lag(&yresid)?;
    let mut hi = vec![f64::NAN; n];
    let mut var_hi = vec![f64::NAN; n];
    for i in 0..n {
        if rowsum[i] == 0.0 {
            continue;
        }
        let denom = resid_mean * rowsum[i];
        hi[i] = lag_resid[i] / denom;
        var_hi[i] = (nf * squared[i] - rowsum[i] * rowsum[i]) * spread
            / ((nf - 1.0) * denom * denom);
    }

    let mut warnings = Vec::new();
    let p_chi2 = match config.inference {
        LoshInference::None => None,
        LoshInference::ChiSquare => {
            if a != 2.0 {
                warn!("Chi-square inference assumes exponent 2, got {}", a);
                warnings.push(InferenceWarning::ExponentNotTwo { exponent: a });
            }
            Some(chi_square_pvalues(&hi, &var_hi))
        }
    };

    Ok(LocalFit {
        statistic: LocalStatistic::Losh(config.clone()),
        values: hi,
        p_sim: None,
        simulations: None,
        seed: None,
        losh: Some(LoshDetails {
            ylag,
            yresid,
            var_hi,
            p_chi2,
            warnings,
        }),
    })
}

/// Upper-tail chi-square p-values with `2 / VarHi` degrees of freedom at
/// `2 Hi / VarHi`. NaN where the variance is not positive and finite.
pub fn chi_square_pvalues(hi: &[f64], var_hi: &[f64]) -> Vec<f64> {
    hi.iter()
        .zip(var_hi)
        .map(|(&h, &v)| {
            if !(v.is_finite() && v > 0.0 && h.is_finite()) {
                return f64::NAN;
            }
            match ChiSquared::new(2.0 / v) {
                Ok(chi2) => chi2.sf(2.0 * h / v),
                Err(_) => f64::NAN,
            }
        })
        .collect()
}
