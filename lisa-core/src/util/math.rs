//! Mathematical utility functions.

use crate::error::{LisaError, Result};

/// Arithmetic mean. Returns NaN for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance (denominator n).
pub fn population_variance(values: &[f64]) -> f64 {
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}

/// Standardize to zero mean and unit population standard deviation.
pub fn standardize(values: &[f64]) -> Result<Vec<f64>> {
    let m = mean(values);
    let sd = population_variance(values).sqrt();
    if !sd.is_finite() || sd < f64::EPSILON {
        return Err(LisaError::ZeroVariance);
    }
    Ok(values.iter().map(|v| (v - m) / sd).collect())
}

/// Check that every value is exactly 0 or 1.
pub fn check_binary(values: &[f64]) -> Result<()> {
    for (index, &value) in values.iter().enumerate() {
        if value != 0.0 && value != 1.0 {
            return Err(LisaError::NonBinary { index, value });
        }
    }
    Ok(())
}

/// Check that a value vector is aligned with `n` units.
pub fn check_len(values: &[f64], n: usize) -> Result<()> {
    if values.len() != n {
        return Err(LisaError::LengthMismatch {
            expected: n,
            got: values.len(),
        });
    }
    Ok(())
}
