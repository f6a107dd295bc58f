//! Autocorrelation function with Bartlett confidence bands.

use std::str::FromStr;

use derive_more::Display;
use polars::prelude::*;

use crate::columns::single_column;
use crate::error::{Result, StatsError};

use super::{autocovariance, normal_quantile};

/// Treatment of missing observations before the lags are computed.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingPolicy {
    /// Keep missing values; every statistic that touches one comes back NaN.
    #[default]
    #[display("none")]
    None,
    /// Drop missing values and compute on the compacted series.
    #[display("drop")]
    Drop,
    /// Refuse to compute when the series has any missing value.
    #[display("raise")]
    Raise,
}

impl FromStr for MissingPolicy {
    type Err = StatsError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "none" => Ok(Self::None),
            "drop" => Ok(Self::Drop),
            "raise" => Ok(Self::Raise),
            other => Err(StatsError::unsupported("missing", other)),
        }
    }
}

/// Options for [`acf`].
#[derive(Debug, Clone)]
pub struct AcfOptions {
    /// Divide lag `k` by `n - k` instead of `n`.
    pub unbiased: bool,
    /// Largest lag to return; capped at `n - 1`.
    pub nlags: usize,
    /// Confidence level for the bands, e.g. `0.05` for 95%.
    pub alpha: Option<f64>,
    /// What to do with nulls and NaNs in the series.
    pub missing: MissingPolicy,
}

impl Default for AcfOptions {
    fn default() -> Self {
        Self {
            unbiased: false,
            nlags: 40,
            alpha: None,
            missing: MissingPolicy::None,
        }
    }
}

/// Autocorrelation function of a single series.
///
/// Returns one row per lag from 0 through `nlags` (capped at `n - 1`) in a
/// column named `acf`. With `alpha` set, confidence bands computed from
/// Bartlett's variance formula are attached as `lower` and `upper`.
pub fn acf(
    frame: &DataFrame,
    options: &AcfOptions,
    headers: Option<&[String]>,
) -> Result<DataFrame> {
    if let Some(alpha) = options.alpha {
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(StatsError::invalid("alpha must be in (0, 1)"));
        }
    }
    let (_, values) = single_column(frame, headers, "acf")?;
    let x = resolve_missing(values, options.missing)?;
    if x.len() < 2 {
        return Err(StatsError::InsufficientData {
            required: 2,
            actual: x.len(),
        });
    }

    let n = x.len();
    let nlags = options.nlags.min(n - 1);
    let acov = autocovariance(&x, nlags, options.unbiased);
    let correlations: Vec<f64> = acov.iter().map(|c| c / acov[0]).collect();

    let mut columns: Vec<Column> = vec![Series::new("acf".into(), correlations.clone()).into()];
    if let Some(alpha) = options.alpha {
        let z = normal_quantile(1.0 - alpha / 2.0);
        let (lower, upper): (Vec<f64>, Vec<f64>) = correlations
            .iter()
            .enumerate()
            .map(|(lag, r)| {
                let band = z * bartlett_variance(&correlations, lag, n).sqrt();
                (r - band, r + band)
            })
            .unzip();
        columns.push(Series::new("lower".into(), lower).into());
        columns.push(Series::new("upper".into(), upper).into());
    }
    Ok(DataFrame::new(columns)?)
}

/// Bartlett's large-sample variance of the autocorrelation at `lag`.
fn bartlett_variance(correlations: &[f64], lag: usize, n: usize) -> f64 {
    match lag {
        0 => 0.0,
        1 => 1.0 / n as f64,
        _ => {
            let tail: f64 = correlations[1..lag].iter().map(|r| r * r).sum();
            (1.0 + 2.0 * tail) / n as f64
        }
    }
}

/// Apply the missing-value policy; nulls become NaN under
/// [`MissingPolicy::None`].
fn resolve_missing(values: Vec<Option<f64>>, policy: MissingPolicy) -> Result<Vec<f64>> {
    match policy {
        MissingPolicy::None => Ok(values
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect()),
        MissingPolicy::Drop => Ok(values
            .into_iter()
            .flatten()
            .filter(|v| !v.is_nan())
            .collect()),
        MissingPolicy::Raise => {
            if values.iter().any(|v| v.is_none() || v.is_some_and(f64::is_nan)) {
                return Err(StatsError::invalid("series contains missing values"));
            }
            Ok(values.into_iter().flatten().collect())
        }
    }
}
