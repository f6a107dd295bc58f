//! Seasonal decomposition by moving averages.

use std::str::FromStr;

use derive_more::Display;
use polars::prelude::*;

use crate::columns::single_column;
use crate::error::{Result, StatsError};
use crate::lang::{Language, Word};

use super::finite_values;

/// How the seasonal component combines with the trend.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecompositionModel {
    /// `observed = trend + seasonal + resid`. The default.
    #[default]
    #[display("additive")]
    Additive,
    /// `observed = trend * seasonal * resid`; requires positive values.
    #[display("multiplicative")]
    Multiplicative,
}

impl FromStr for DecompositionModel {
    type Err = StatsError;

    /// Any prefix of the full word is accepted, down to `"a"` and `"m"`.
    fn from_str(value: &str) -> Result<Self> {
        match value {
            v if !v.is_empty() && "additive".starts_with(v) => Ok(Self::Additive),
            v if !v.is_empty() && "multiplicative".starts_with(v) => Ok(Self::Multiplicative),
            other => Err(StatsError::unsupported("model", other)),
        }
    }
}

/// Options for [`seasonal`].
#[derive(Debug, Clone)]
pub struct SeasonalOptions {
    /// Additive or multiplicative decomposition.
    pub model: DecompositionModel,
    /// Length of the seasonal cycle in rows, at least 1.
    pub period: usize,
    /// Center the moving-average window on each point; `false` ends the
    /// window at it instead, using past values only.
    pub two_sided: bool,
    /// When positive, extend the trend over its NaN edges by a linear fit
    /// through this many (+1) closest valid points.
    pub extrapolate_trend: usize,
    /// Language for the output column names.
    pub language: Language,
}

impl SeasonalOptions {
    /// Defaults for the given cycle length: additive, two-sided, no trend
    /// extrapolation.
    pub fn new(period: usize) -> Self {
        Self {
            model: DecompositionModel::default(),
            period,
            two_sided: true,
            extrapolate_trend: 0,
            language: Language::default(),
        }
    }
}

/// Seasonal decomposition of a single series using moving averages.
///
/// Output has one row per observation and four localized columns: the
/// observed series, the seasonal cycle, the moving-average trend, and the
/// residual. Rows where the trend window hangs off the series come back
/// null unless `extrapolate_trend` covers them.
pub fn seasonal(
    frame: &DataFrame,
    options: &SeasonalOptions,
    headers: Option<&[String]>,
) -> Result<DataFrame> {
    if options.period < 1 {
        return Err(StatsError::invalid("period must be >= 1"));
    }
    let (_, values) = single_column(frame, headers, "seasonal decomposition")?;
    let x = finite_values(values, "seasonal decomposition")?;
    let n = x.len();
    if n < 2 * options.period {
        return Err(StatsError::InsufficientData {
            required: 2 * options.period,
            actual: n,
        });
    }
    let multiplicative = options.model == DecompositionModel::Multiplicative;
    if multiplicative && x.iter().any(|&v| v <= 0.0) {
        return Err(StatsError::invalid(
            "multiplicative seasonality requires strictly positive values",
        ));
    }

    let filt = seasonal_filter(options.period);
    let mut trend = convolve(&x, &filt, options.two_sided);
    if options.extrapolate_trend > 0 {
        extrapolate_edges(&mut trend, options.extrapolate_trend + 1);
    }

    let detrended: Vec<f64> = x
        .iter()
        .zip(&trend)
        .map(|(&v, &t)| if multiplicative { v / t } else { v - t })
        .collect();
    let cycle = phase_means(&detrended, options.period, multiplicative);
    let seasonal: Vec<f64> = (0..n).map(|t| cycle[t % options.period]).collect();
    let resid: Vec<f64> = if multiplicative {
        x.iter()
            .zip(&seasonal)
            .zip(&trend)
            .map(|((&v, &s), &t)| v / s / t)
            .collect()
    } else {
        detrended.iter().zip(&seasonal).map(|(&d, &s)| d - s).collect()
    };

    let word = |w: Word| -> PlSmallStr { options.language.word(w).into() };
    Ok(DataFrame::new(vec![
        Series::new(word(Word::Observed), nullable(&x)).into(),
        Series::new(word(Word::Seasonal), nullable(&seasonal)).into(),
        Series::new(word(Word::Trend), nullable(&trend)).into(),
        Series::new(word(Word::Resid), nullable(&resid)).into(),
    ])?)
}

/// NaN back to null for presentation.
fn nullable(values: &[f64]) -> Vec<Option<f64>> {
    values.iter().map(|&v| (!v.is_nan()).then_some(v)).collect()
}

/// Default moving-average coefficients for the period.
///
/// Even periods get half-weighted endpoints over `period + 1` points so the
/// window stays centered; odd periods use a plain average. Either way the
/// filter length is odd and the weights sum to one.
fn seasonal_filter(period: usize) -> Vec<f64> {
    if period % 2 == 0 {
        let mut filt = vec![1.0 / period as f64; period + 1];
        filt[0] = 0.5 / period as f64;
        filt[period] = 0.5 / period as f64;
        filt
    } else {
        vec![1.0 / period as f64; period]
    }
}

/// Weighted moving average with NaN where the window hangs off the series.
///
/// Two-sided centers the window on each point; one-sided ends it there.
fn convolve(x: &[f64], filt: &[f64], two_sided: bool) -> Vec<f64> {
    let n = x.len();
    let width = filt.len();
    let offset = if two_sided { (width - 1) / 2 } else { width - 1 };
    (0..n)
        .map(|t| {
            if t < offset || t + width > n + offset {
                return f64::NAN;
            }
            let start = t - offset;
            filt.iter()
                .zip(&x[start..start + width])
                .map(|(w, v)| w * v)
                .sum()
        })
        .collect()
}

/// Replace the NaN edges of the trend with values from a least-squares line
/// through the `npoints` closest valid entries.
fn extrapolate_edges(trend: &mut [f64], npoints: usize) {
    let Some(front) = trend.iter().position(|v| !v.is_nan()) else {
        return;
    };
    let Some(back) = trend.iter().rposition(|v| !v.is_nan()) else {
        return;
    };
    let front_end = (front + npoints).min(back);
    let (slope, intercept) = fit_line(trend, front, front_end);
    for t in 0..front {
        trend[t] = slope * t as f64 + intercept;
    }
    let back_start = front.max(back.saturating_sub(npoints));
    let (slope, intercept) = fit_line(trend, back_start, back + 1);
    for t in back + 1..trend.len() {
        trend[t] = slope * t as f64 + intercept;
    }
}

/// Least-squares line through `trend[start..end]` against its indices.
fn fit_line(trend: &[f64], start: usize, end: usize) -> (f64, f64) {
    let count = (end - start) as f64;
    let t_mean = (start..end).map(|t| t as f64).sum::<f64>() / count;
    let y_mean = trend[start..end].iter().sum::<f64>() / count;
    let mut cov = 0.0;
    let mut var = 0.0;
    for (t, y) in (start..end).zip(&trend[start..end]) {
        cov += (t as f64 - t_mean) * (y - y_mean);
        var += (t as f64 - t_mean) * (t as f64 - t_mean);
    }
    let slope = if var == 0.0 { 0.0 } else { cov / var };
    (slope, y_mean - slope * t_mean)
}

/// Per-phase means of the detrended series, NaN entries skipped, centered
/// so the cycle carries no net effect.
fn phase_means(detrended: &[f64], period: usize, multiplicative: bool) -> Vec<f64> {
    let mut means: Vec<f64> = (0..period)
        .map(|phase| {
            let (sum, count) = detrended
                .iter()
                .skip(phase)
                .step_by(period)
                .filter(|v| !v.is_nan())
                .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
            sum / count as f64
        })
        .collect();
    let center = means.iter().sum::<f64>() / period as f64;
    for mean in &mut means {
        if multiplicative {
            *mean /= center;
        } else {
            *mean -= center;
        }
    }
    means
}
