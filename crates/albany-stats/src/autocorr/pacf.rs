//! Partial autocorrelation function.

use std::str::FromStr;

use derive_more::Display;
use polars::prelude::*;

use crate::columns::single_column;
use crate::error::{Result, StatsError};

use super::{autocovariance, normal_quantile};

/// A pivot at or below this is treated as a singular regression.
const PIVOT_TOLERANCE: f64 = 1e-12;

/// Estimator behind [`pacf`].
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Default)]
pub enum PacfMethod {
    /// Yule-Walker on the unbiased autocovariance. The default.
    #[default]
    #[display("ywunbiased")]
    YwUnbiased,
    /// Yule-Walker on the biased (maximum-likelihood) autocovariance.
    #[display("ywmle")]
    YwMle,
    /// Per-order least squares on lagged regressors.
    #[display("ols")]
    Ols,
    /// Levinson-Durbin recursion on the unbiased autocovariance.
    #[display("ldunbiased")]
    LdUnbiased,
    /// Levinson-Durbin recursion on the biased autocovariance.
    #[display("ldbiased")]
    LdBiased,
}

impl FromStr for PacfMethod {
    type Err = StatsError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "yw" | "ywunbiased" => Ok(Self::YwUnbiased),
            "ywm" | "ywmle" => Ok(Self::YwMle),
            "ols" => Ok(Self::Ols),
            "ld" | "ldunbiased" => Ok(Self::LdUnbiased),
            "ldb" | "ldbiased" => Ok(Self::LdBiased),
            other => Err(StatsError::unsupported("method", other)),
        }
    }
}

/// Options for [`pacf`].
#[derive(Debug, Clone)]
pub struct PacfOptions {
    /// Largest lag to return; must stay below half the series length.
    pub nlags: usize,
    /// Estimator to use.
    pub method: PacfMethod,
    /// Confidence level for the `±z/√n` bands, e.g. `0.05` for 95%.
    pub alpha: Option<f64>,
}

impl Default for PacfOptions {
    fn default() -> Self {
        Self {
            nlags: 40,
            method: PacfMethod::default(),
            alpha: None,
        }
    }
}

/// Partial autocorrelation function of a single series.
///
/// Returns lags 0 through `nlags` in a column named `pacf`, with the lag-0
/// entry pinned at 1.0. With `alpha` set, `lower`/`upper` bands at `±z/√n`
/// are attached; the lag-0 band collapses onto the point.
pub fn pacf(
    frame: &DataFrame,
    options: &PacfOptions,
    headers: Option<&[String]>,
) -> Result<DataFrame> {
    if let Some(alpha) = options.alpha {
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(StatsError::invalid("alpha must be in (0, 1)"));
        }
    }
    let (_, values) = single_column(frame, headers, "pacf")?;
    let x: Vec<f64> = values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect();
    let n = x.len();
    if options.nlags >= n / 2 {
        return Err(StatsError::invalid(format!(
            "nlags {} must be smaller than n/2 = {}",
            options.nlags,
            n / 2
        )));
    }

    let partials = match options.method {
        PacfMethod::YwUnbiased | PacfMethod::LdUnbiased => {
            durbin_levinson(&autocovariance(&x, options.nlags, true))
        }
        PacfMethod::YwMle | PacfMethod::LdBiased => {
            durbin_levinson(&autocovariance(&x, options.nlags, false))
        }
        PacfMethod::Ols => pacf_ols(&x, options.nlags),
    };

    let mut columns: Vec<Column> = vec![Series::new("pacf".into(), partials.clone()).into()];
    if let Some(alpha) = options.alpha {
        let band = normal_quantile(1.0 - alpha / 2.0) / (n as f64).sqrt();
        let mut lower: Vec<f64> = partials.iter().map(|p| p - band).collect();
        let mut upper: Vec<f64> = partials.iter().map(|p| p + band).collect();
        lower[0] = partials[0];
        upper[0] = partials[0];
        columns.push(Series::new("lower".into(), lower).into());
        columns.push(Series::new("upper".into(), upper).into());
    }
    Ok(DataFrame::new(columns)?)
}

/// Durbin-Levinson recursion from an autocovariance sequence.
///
/// `acov` holds lags `0..=nlags`; the returned reflection coefficients have
/// the same length with the lag-0 entry fixed at 1.0.
fn durbin_levinson(acov: &[f64]) -> Vec<f64> {
    let nlags = acov.len() - 1;
    let mut partials = vec![1.0; nlags + 1];
    if nlags == 0 {
        return partials;
    }
    // phi[j] holds the order-(k-1) AR coefficients, 1-indexed by lag.
    let mut phi = vec![0.0; nlags + 1];
    phi[1] = acov[1] / acov[0];
    partials[1] = phi[1];
    let mut error = acov[0] * (1.0 - phi[1] * phi[1]);
    for k in 2..=nlags {
        let residual = acov[k] - (1..k).map(|j| phi[j] * acov[k - j]).sum::<f64>();
        let reflection = residual / error;
        let previous = phi.clone();
        for j in 1..k {
            phi[j] = previous[j] - reflection * previous[k - j];
        }
        phi[k] = reflection;
        partials[k] = reflection;
        error *= 1.0 - reflection * reflection;
    }
    partials
}

/// Per-order least-squares estimate of the partial autocorrelations.
///
/// For each lag `k` this regresses `x[t]` on an intercept and
/// `x[t-1] ..= x[t-k]` over `t = k..n`; the coefficient on `x[t-k]` is the
/// order-`k` partial. A singular regression yields NaN at that lag.
fn pacf_ols(x: &[f64], nlags: usize) -> Vec<f64> {
    let n = x.len();
    let mut partials = vec![1.0; nlags + 1];
    for k in 1..=nlags {
        let mut gram = vec![vec![0.0; k + 1]; k + 1];
        let mut moment = vec![0.0; k + 1];
        for t in k..n {
            let mut row = Vec::with_capacity(k + 1);
            row.push(1.0);
            for j in 1..=k {
                row.push(x[t - j]);
            }
            for i in 0..=k {
                for j in 0..=k {
                    gram[i][j] += row[i] * row[j];
                }
                moment[i] += row[i] * x[t];
            }
        }
        partials[k] = match solve(gram, moment) {
            Some(beta) => beta[k],
            None => f64::NAN,
        };
    }
    partials
}

/// Gaussian elimination with partial pivoting; `None` on a collapsed pivot.
fn solve(mut matrix: Vec<Vec<f64>>, mut rhs: Vec<f64>) -> Option<Vec<f64>> {
    let size = rhs.len();
    for pivot in 0..size {
        let best = (pivot..size).max_by(|&a, &b| {
            matrix[a][pivot]
                .abs()
                .partial_cmp(&matrix[b][pivot].abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })?;
        if matrix[best][pivot].abs() <= PIVOT_TOLERANCE {
            return None;
        }
        matrix.swap(pivot, best);
        rhs.swap(pivot, best);
        for row in pivot + 1..size {
            let factor = matrix[row][pivot] / matrix[pivot][pivot];
            for column in pivot..size {
                matrix[row][column] -= factor * matrix[pivot][column];
            }
            rhs[row] -= factor * rhs[pivot];
        }
    }
    let mut solution = vec![0.0; size];
    for row in (0..size).rev() {
        let mut value = rhs[row];
        for column in row + 1..size {
            value -= matrix[row][column] * solution[column];
        }
        solution[row] = value / matrix[row][row];
    }
    Some(solution)
}
