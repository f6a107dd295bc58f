//! Time-series decomposition.
//!
//! [`seasonal`] splits a single series into trend, seasonal cycle, and
//! residual by moving averages; [`ssa`] reconstructs additive components
//! from the spectrum of the trajectory matrix.

pub mod seasonal;
pub mod ssa;

pub use seasonal::{DecompositionModel, SeasonalOptions, seasonal};
pub use ssa::{SsaGrouping, SsaOptions, SsaWindow, ssa};

use crate::error::{Result, StatsError};

/// Collapse optional values to plain floats, rejecting nulls, NaN, and
/// infinities. Decomposition has no sensible answer for a gappy series.
pub(crate) fn finite_values(values: Vec<Option<f64>>, operation: &str) -> Result<Vec<f64>> {
    values
        .into_iter()
        .map(|value| match value {
            Some(v) if v.is_finite() => Ok(v),
            _ => Err(StatsError::invalid(format!(
                "{operation} does not handle missing values"
            ))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finite_values_accepts_clean_input() {
        let values = vec![Some(1.0), Some(-2.5), Some(0.0)];
        assert_eq!(finite_values(values, "x").unwrap(), vec![1.0, -2.5, 0.0]);
    }

    #[test]
    fn test_finite_values_rejects_null_nan_and_infinity() {
        for bad in [None, Some(f64::NAN), Some(f64::INFINITY)] {
            let values = vec![Some(1.0), bad];
            assert!(matches!(
                finite_values(values, "ssa"),
                Err(StatsError::InvalidParameter { reason })
                    if reason == "ssa does not handle missing values"
            ));
        }
    }
}
