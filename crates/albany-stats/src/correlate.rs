//! Pairwise correlation matrices.
//!
//! [`correlate`] computes a square correlation matrix over the numeric
//! columns of a table using pairwise-complete observations: for each column
//! pair only the rows where both values are present enter the computation,
//! and pairs with fewer complete rows than `min_periods` come back null.
//! Non-numeric columns are left out of the matrix.

use std::str::FromStr;

use albany_data::numeric_column;
use derive_more::Display;
use polars::prelude::*;

use crate::error::{Result, StatsError};
use crate::lang::{Language, Word};

/// Correlation coefficient to compute.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorrelationMethod {
    /// Pearson product-moment correlation. The default.
    #[default]
    #[display("pearson")]
    Pearson,
    /// Spearman rank correlation (average ranks).
    #[display("spearman")]
    Spearman,
    /// Kendall rank correlation (tau-b, tie corrected).
    #[display("kendall")]
    Kendall,
}

impl FromStr for CorrelationMethod {
    type Err = StatsError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "pearson" => Ok(Self::Pearson),
            "spearman" => Ok(Self::Spearman),
            "kendall" => Ok(Self::Kendall),
            other => Err(StatsError::unsupported("method", other)),
        }
    }
}

/// Options for [`correlate`].
#[derive(Debug, Clone)]
pub struct CorrelateOptions {
    /// Correlation coefficient to compute.
    pub method: CorrelationMethod,
    /// Minimum number of complete observations per pair; below it the cell
    /// is null.
    pub min_periods: usize,
    /// Language for the header-label column.
    pub language: Language,
}

impl Default for CorrelateOptions {
    fn default() -> Self {
        Self {
            method: CorrelationMethod::default(),
            min_periods: 1,
            language: Language::default(),
        }
    }
}

/// Correlation matrix over the numeric columns of the table.
///
/// The first output column carries the localized header labels; the
/// remaining columns form the square matrix in input column order.
pub fn correlate(frame: &DataFrame, options: &CorrelateOptions) -> Result<DataFrame> {
    let mut names = Vec::new();
    let mut series = Vec::new();
    for column in frame.get_columns() {
        if !column.dtype().is_primitive_numeric() {
            continue;
        }
        let name = column.name().to_string();
        // NaN cells count as missing, same as nulls.
        let values: Vec<Option<f64>> = numeric_column(frame, &name)?
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect();
        names.push(name);
        series.push(values);
    }

    let size = names.len();
    let floor = options.min_periods.max(1);
    let mut cells = vec![vec![None; size]; size];
    for i in 0..size {
        for j in i..size {
            let (xs, ys): (Vec<f64>, Vec<f64>) = series[i]
                .iter()
                .zip(&series[j])
                .filter_map(|(x, y)| x.zip(*y))
                .unzip();
            let cell = (xs.len() >= floor).then(|| coefficient(options.method, &xs, &ys));
            cells[i][j] = cell;
            cells[j][i] = cell;
        }
    }

    let mut columns: Vec<Column> = Vec::with_capacity(size + 1);
    columns.push(Series::new(options.language.word(Word::Header).into(), names.clone()).into());
    for (j, name) in names.iter().enumerate() {
        let values: Vec<Option<f64>> = (0..size).map(|i| cells[i][j]).collect();
        columns.push(Series::new(name.as_str().into(), values).into());
    }
    Ok(DataFrame::new(columns)?)
}

fn coefficient(method: CorrelationMethod, xs: &[f64], ys: &[f64]) -> f64 {
    match method {
        CorrelationMethod::Pearson => pearson(xs, ys),
        CorrelationMethod::Spearman => pearson(&average_ranks(xs), &average_ranks(ys)),
        CorrelationMethod::Kendall => kendall_tau_b(xs, ys),
    }
}

fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;
    let mut covariance = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        covariance += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    covariance / (var_x.sqrt() * var_y.sqrt())
}

/// 1-based ranks with ties averaged.
fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start;
        while end + 1 < order.len() && values[order[end + 1]] == values[order[start]] {
            end += 1;
        }
        let rank = (start + end) as f64 / 2.0 + 1.0;
        for &index in &order[start..=end] {
            ranks[index] = rank;
        }
        start = end + 1;
    }
    ranks
}

fn kendall_tau_b(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len();
    let mut concordant = 0i64;
    let mut discordant = 0i64;
    let mut tied_x = 0i64;
    let mut tied_y = 0i64;
    for i in 0..n {
        for j in (i + 1)..n {
            let tie_x = xs[i] == xs[j];
            let tie_y = ys[i] == ys[j];
            if tie_x {
                tied_x += 1;
            }
            if tie_y {
                tied_y += 1;
            }
            if !tie_x && !tie_y {
                if (xs[i] - xs[j]) * (ys[i] - ys[j]) > 0.0 {
                    concordant += 1;
                } else {
                    discordant += 1;
                }
            }
        }
    }
    let total = (n * (n - 1) / 2) as i64;
    let denominator = (((total - tied_x) as f64) * ((total - tied_y) as f64)).sqrt();
    (concordant - discordant) as f64 / denominator
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cell(frame: &DataFrame, column: &str, row: usize) -> Option<f64> {
        frame.column(column).unwrap().f64().unwrap().get(row)
    }

    fn options(method: CorrelationMethod) -> CorrelateOptions {
        CorrelateOptions {
            method,
            language: Language::En,
            ..Default::default()
        }
    }

    #[test]
    fn test_pearson_perfect_correlation() {
        let frame = DataFrame::new(vec![
            Series::new("a".into(), vec![1.0f64, 2.0, 3.0]).into(),
            Series::new("b".into(), vec![2.0f64, 4.0, 6.0]).into(),
            Series::new("c".into(), vec![3.0f64, 2.0, 1.0]).into(),
        ])
        .unwrap();
        let out = correlate(&frame, &options(CorrelationMethod::Pearson)).unwrap();

        assert_eq!(out.get_column_names(), vec!["header", "a", "b", "c"]);
        assert_eq!(out.height(), 3);
        assert_relative_eq!(cell(&out, "a", 0).unwrap(), 1.0);
        assert_relative_eq!(cell(&out, "b", 0).unwrap(), 1.0);
        assert_relative_eq!(cell(&out, "c", 0).unwrap(), -1.0);
        assert_relative_eq!(cell(&out, "a", 2).unwrap(), -1.0);
    }

    #[test]
    fn test_spearman_monotone_nonlinear() {
        let frame = DataFrame::new(vec![
            Series::new("a".into(), vec![1.0f64, 2.0, 3.0, 4.0]).into(),
            Series::new("b".into(), vec![1.0f64, 4.0, 9.0, 16.0]).into(),
        ])
        .unwrap();
        let out = correlate(&frame, &options(CorrelationMethod::Spearman)).unwrap();
        assert_relative_eq!(cell(&out, "b", 0).unwrap(), 1.0);
    }

    #[test]
    fn test_spearman_averages_tied_ranks() {
        let frame = DataFrame::new(vec![
            Series::new("a".into(), vec![1.0f64, 2.0, 2.0, 3.0]).into(),
            Series::new("b".into(), vec![1.0f64, 2.0, 3.0, 4.0]).into(),
        ])
        .unwrap();
        let out = correlate(&frame, &options(CorrelationMethod::Spearman)).unwrap();
        // Ranks of a = [1, 2.5, 2.5, 4], of b = [1, 2, 3, 4].
        assert_relative_eq!(
            cell(&out, "b", 0).unwrap(),
            0.9486832980505138,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_kendall_tau_b_corrects_for_ties() {
        let frame = DataFrame::new(vec![
            Series::new("a".into(), vec![1.0f64, 2.0, 2.0, 3.0]).into(),
            Series::new("b".into(), vec![1.0f64, 2.0, 3.0, 4.0]).into(),
        ])
        .unwrap();
        let out = correlate(&frame, &options(CorrelationMethod::Kendall)).unwrap();
        // C = 5, D = 0, one tied pair in a: 5 / sqrt(5 * 6).
        assert_relative_eq!(
            cell(&out, "b", 0).unwrap(),
            5.0 / 30.0f64.sqrt(),
            epsilon = 1e-12
        );
        assert_relative_eq!(cell(&out, "a", 0).unwrap(), 1.0);
    }

    #[test]
    fn test_pairwise_complete_observations() {
        let frame = DataFrame::new(vec![
            Series::new("a".into(), vec![Some(1.0f64), Some(2.0), Some(3.0), None]).into(),
            Series::new("b".into(), vec![None, Some(2.0f64), Some(4.0), Some(6.0)]).into(),
        ])
        .unwrap();
        let out = correlate(&frame, &options(CorrelationMethod::Pearson)).unwrap();
        // Only rows 1 and 2 are complete for the pair; two points always
        // correlate perfectly.
        assert_relative_eq!(cell(&out, "b", 0).unwrap(), 1.0);
    }

    #[test]
    fn test_min_periods_nulls_sparse_pairs() {
        let frame = DataFrame::new(vec![
            Series::new("a".into(), vec![Some(1.0f64), Some(2.0), Some(3.0), None]).into(),
            Series::new("b".into(), vec![None, Some(2.0f64), Some(4.0), Some(6.0)]).into(),
        ])
        .unwrap();
        let opts = CorrelateOptions {
            min_periods: 3,
            language: Language::En,
            ..Default::default()
        };
        let out = correlate(&frame, &opts).unwrap();
        assert!(cell(&out, "b", 0).is_none());
        // The diagonal still has three complete observations.
        assert_relative_eq!(cell(&out, "a", 0).unwrap(), 1.0);
    }

    #[test]
    fn test_non_numeric_columns_left_out() {
        let frame = DataFrame::new(vec![
            Series::new("a".into(), vec![1.0f64, 2.0]).into(),
            Series::new("tag".into(), vec!["x", "y"]).into(),
            Series::new("b".into(), vec![2.0f64, 1.0]).into(),
        ])
        .unwrap();
        let out = correlate(&frame, &options(CorrelationMethod::Pearson)).unwrap();
        assert_eq!(out.get_column_names(), vec!["header", "a", "b"]);
    }

    #[test]
    fn test_portuguese_header_label_by_default() {
        let frame = DataFrame::new(vec![
            Series::new("a".into(), vec![1.0f64, 2.0]).into(),
        ])
        .unwrap();
        let out = correlate(&frame, &CorrelateOptions::default()).unwrap();
        assert_eq!(out.get_column_names(), vec!["cabeçalho", "a"]);
    }

    #[test]
    fn test_method_from_str() {
        assert_eq!(
            "kendall".parse::<CorrelationMethod>().unwrap(),
            CorrelationMethod::Kendall
        );
        assert!(matches!(
            "cosine".parse::<CorrelationMethod>(),
            Err(StatsError::Unsupported { what, .. }) if what == "method"
        ));
    }
}
