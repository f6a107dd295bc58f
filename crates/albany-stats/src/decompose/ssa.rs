//! Singular spectrum analysis.

use ndarray::{Array1, Array2, ArrayView1};
use polars::prelude::*;

use albany_data::numeric_column;

use crate::columns::{ensure_numeric, restrict};
use crate::error::{Result, StatsError};

use super::finite_values;

/// Sweep cap for the Jacobi eigensolver.
const JACOBI_MAX_SWEEPS: usize = 100;

/// Sweeps stop once the off-diagonal mass drops below this fraction of the
/// total squared mass.
const JACOBI_TOLERANCE: f64 = 1e-12;

/// Sliding-window length for the trajectory matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SsaWindow {
    /// Absolute length, between 2 and the series length.
    Rows(usize),
    /// Fraction of the series length in `(0, 1]`; resolves to
    /// `max(2, ceil(fraction * n))`.
    Fraction(f64),
}

impl Default for SsaWindow {
    fn default() -> Self {
        Self::Rows(4)
    }
}

/// How the elementary components are combined before reconstruction.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SsaGrouping {
    /// One reconstructed series per component.
    #[default]
    None,
    /// Evenly spaced component bounds producing this many groups.
    Count(usize),
    /// Caller-chosen component index sets, one per group.
    Explicit(Vec<Vec<usize>>),
}

/// Options for [`ssa`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SsaOptions {
    /// Sliding-window length.
    pub window: SsaWindow,
    /// Component grouping.
    pub groups: SsaGrouping,
}

/// Singular spectrum analysis of every selected column.
///
/// Each column is embedded into its trajectory matrix, decomposed through
/// the spectrum of `X Xᵀ`, and reconstructed into one additive series per
/// component group by diagonal averaging. Components are ordered by
/// descending eigenvalue, so `<name>_ssa1` always carries the dominant
/// structure; the per-column series sum back to the original column.
pub fn ssa(
    frame: &DataFrame,
    options: &SsaOptions,
    headers: Option<&[String]>,
) -> Result<DataFrame> {
    let restricted = restrict(frame, headers)?;
    ensure_numeric(&restricted)?;
    let n = restricted.height();
    let window = resolve_window(options.window, n)?;
    let groups = component_groups(&options.groups, window)?;

    let mut columns: Vec<Column> = Vec::with_capacity(restricted.width() * groups.len());
    for column_name in restricted.get_column_names() {
        let values = numeric_column(&restricted, column_name.as_str())?;
        let x = finite_values(values, "singular spectrum analysis")?;
        let components = decompose_series(&x, window);
        for (index, group) in groups.iter().enumerate() {
            let mut series = vec![0.0; n];
            for &component in group {
                for (total, value) in series.iter_mut().zip(&components[component]) {
                    *total += value;
                }
            }
            let name = format!("{column_name}_ssa{}", index + 1);
            columns.push(Series::new(name.into(), series).into());
        }
    }
    Ok(DataFrame::new(columns)?)
}

/// Validate the window parameterization and resolve it to a row count.
fn resolve_window(window: SsaWindow, n: usize) -> Result<usize> {
    let resolved = match window {
        SsaWindow::Rows(rows) => rows,
        SsaWindow::Fraction(fraction) => {
            if !(fraction > 0.0 && fraction <= 1.0) {
                return Err(StatsError::invalid("window fraction must be in (0, 1]"));
            }
            (fraction * n as f64).ceil().max(2.0) as usize
        }
    };
    if resolved < 2 || resolved > n {
        return Err(StatsError::invalid(format!(
            "window size {resolved} must be between 2 and the series length {n}"
        )));
    }
    Ok(resolved)
}

/// Resolve the grouping into explicit component index sets.
fn component_groups(grouping: &SsaGrouping, window: usize) -> Result<Vec<Vec<usize>>> {
    match grouping {
        SsaGrouping::None => Ok((0..window).map(|i| vec![i]).collect()),
        SsaGrouping::Count(count) => {
            if !(1..=window).contains(count) {
                return Err(StatsError::invalid(format!(
                    "groups {count} must be between 1 and the window size {window}"
                )));
            }
            let bounds: Vec<usize> = (0..=*count).map(|i| window * i / count).collect();
            Ok(bounds.windows(2).map(|pair| (pair[0]..pair[1]).collect()).collect())
        }
        SsaGrouping::Explicit(groups) => {
            for group in groups {
                if group.iter().any(|&component| component >= window) {
                    return Err(StatsError::invalid(format!(
                        "group component indices must be smaller than the window size {window}"
                    )));
                }
            }
            Ok(groups.clone())
        }
    }
}

/// Elementary component series of one column, ordered by descending
/// eigenvalue of the trajectory Gram matrix.
fn decompose_series(x: &[f64], window: usize) -> Vec<Vec<f64>> {
    let n = x.len();
    let lags = n - window + 1;
    let trajectory = Array2::from_shape_fn((window, lags), |(i, j)| x[i + j]);
    let gram = trajectory.dot(&trajectory.t());
    let (_, vectors) = jacobi_eigh(&gram);
    (0..window)
        .map(|component| {
            let v = vectors.column(component);
            let weights = v.dot(&trajectory);
            diagonal_average(&v, &weights, n)
        })
        .collect()
}

/// Average the rank-one matrix `v wᵀ` over its antidiagonals, mapping it
/// back to a series of length `n`.
fn diagonal_average(v: &ArrayView1<'_, f64>, weights: &Array1<f64>, n: usize) -> Vec<f64> {
    let mut sums = vec![0.0; n];
    let mut counts = vec![0usize; n];
    for (i, &row) in v.iter().enumerate() {
        for (j, &weight) in weights.iter().enumerate() {
            sums[i + j] += row * weight;
            counts[i + j] += 1;
        }
    }
    sums.iter()
        .zip(&counts)
        .map(|(sum, &count)| sum / count as f64)
        .collect()
}

/// Jacobi eigendecomposition of a symmetric matrix.
///
/// Cyclic sweeps rotate every upper-triangle pair until the off-diagonal
/// mass vanishes. Eigenpairs come back sorted by descending eigenvalue,
/// eigenvectors in the columns.
fn jacobi_eigh(matrix: &Array2<f64>) -> (Vec<f64>, Array2<f64>) {
    let size = matrix.nrows();
    let mut a = matrix.clone();
    let mut vectors = Array2::<f64>::eye(size);
    for _ in 0..JACOBI_MAX_SWEEPS {
        let total: f64 = a.iter().map(|v| v * v).sum();
        let off_diagonal: f64 = (0..size)
            .flat_map(|p| ((p + 1)..size).map(move |q| (p, q)))
            .map(|(p, q)| 2.0 * a[[p, q]] * a[[p, q]])
            .sum();
        if off_diagonal <= JACOBI_TOLERANCE * total {
            break;
        }
        for p in 0..size {
            for q in (p + 1)..size {
                if a[[p, q]] == 0.0 {
                    continue;
                }
                let (cos, sin) = rotation(a[[p, p]], a[[q, q]], a[[p, q]]);
                rotate(&mut a, &mut vectors, p, q, cos, sin);
            }
        }
    }
    let mut order: Vec<usize> = (0..size).collect();
    order.sort_by(|&left, &right| {
        a[[right, right]]
            .partial_cmp(&a[[left, left]])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let eigenvalues: Vec<f64> = order.iter().map(|&i| a[[i, i]]).collect();
    let mut sorted = Array2::<f64>::zeros((size, size));
    for (destination, &source) in order.iter().enumerate() {
        sorted.column_mut(destination).assign(&vectors.column(source));
    }
    (eigenvalues, sorted)
}

/// Rotation angle that zeroes the `(p, q)` entry.
fn rotation(app: f64, aqq: f64, apq: f64) -> (f64, f64) {
    let tau = (aqq - app) / (2.0 * apq);
    let t = if tau >= 0.0 {
        1.0 / (tau + (1.0 + tau * tau).sqrt())
    } else {
        -1.0 / (-tau + (1.0 + tau * tau).sqrt())
    };
    let cos = 1.0 / (1.0 + t * t).sqrt();
    (cos, t * cos)
}

/// Apply the plane rotation to the working matrix and the eigenvector
/// accumulator.
fn rotate(a: &mut Array2<f64>, vectors: &mut Array2<f64>, p: usize, q: usize, cos: f64, sin: f64) {
    let size = a.nrows();
    for i in 0..size {
        let aip = a[[i, p]];
        let aiq = a[[i, q]];
        a[[i, p]] = cos * aip - sin * aiq;
        a[[i, q]] = sin * aip + cos * aiq;
    }
    for j in 0..size {
        let apj = a[[p, j]];
        let aqj = a[[q, j]];
        a[[p, j]] = cos * apj - sin * aqj;
        a[[q, j]] = sin * apj + cos * aqj;
    }
    for i in 0..size {
        let vip = vectors[[i, p]];
        let viq = vectors[[i, q]];
        vectors[[i, p]] = cos * vip - sin * viq;
        vectors[[i, q]] = sin * vip + cos * viq;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn series_frame(values: Vec<f64>) -> DataFrame {
        DataFrame::new(vec![Series::new("x".into(), values).into()]).unwrap()
    }

    fn column(frame: &DataFrame, name: &str) -> Vec<f64> {
        frame
            .column(name)
            .unwrap()
            .f64()
            .unwrap()
            .into_no_null_iter()
            .collect()
    }

    #[test]
    fn test_components_sum_back_to_series() {
        let x = vec![1.0, 3.0, 2.0, 5.0, 4.0, 6.0];
        let frame = series_frame(x.clone());
        let options = SsaOptions {
            window: SsaWindow::Rows(3),
            groups: SsaGrouping::None,
        };
        let out = ssa(&frame, &options, None).unwrap();
        assert_eq!(out.get_column_names(), vec!["x_ssa1", "x_ssa2", "x_ssa3"]);
        let parts: Vec<Vec<f64>> = (1..=3)
            .map(|k| column(&out, &format!("x_ssa{k}")))
            .collect();
        for t in 0..x.len() {
            let total: f64 = parts.iter().map(|part| part[t]).sum();
            assert_relative_eq!(total, x[t], epsilon = 1e-8);
        }
    }

    #[test]
    fn test_rank_one_series_lands_in_first_component() {
        // Powers of two make the trajectory matrix rank one, so the
        // dominant component carries everything.
        let x = vec![1.0, 2.0, 4.0, 8.0, 16.0, 32.0];
        let frame = series_frame(x.clone());
        let options = SsaOptions {
            window: SsaWindow::Rows(3),
            groups: SsaGrouping::None,
        };
        let out = ssa(&frame, &options, None).unwrap();
        let first = column(&out, "x_ssa1");
        for t in 0..x.len() {
            assert_relative_eq!(first[t], x[t], epsilon = 1e-8);
        }
        for k in 2..=3 {
            for value in column(&out, &format!("x_ssa{k}")) {
                assert_relative_eq!(value, 0.0, epsilon = 1e-8);
            }
        }
    }

    #[test]
    fn test_single_group_reconstructs_series() {
        let x = vec![2.0, 7.0, 1.0, 8.0, 2.0, 8.0, 1.0, 8.0];
        let frame = series_frame(x.clone());
        let options = SsaOptions {
            window: SsaWindow::Rows(4),
            groups: SsaGrouping::Count(1),
        };
        let out = ssa(&frame, &options, None).unwrap();
        assert_eq!(out.get_column_names(), vec!["x_ssa1"]);
        let only = column(&out, "x_ssa1");
        for t in 0..x.len() {
            assert_relative_eq!(only[t], x[t], epsilon = 1e-8);
        }
    }

    #[test]
    fn test_fraction_window_matches_rows() {
        let x = vec![1.0, 3.0, 2.0, 5.0, 4.0, 6.0];
        let by_rows = ssa(
            &series_frame(x.clone()),
            &SsaOptions {
                window: SsaWindow::Rows(3),
                groups: SsaGrouping::None,
            },
            None,
        )
        .unwrap();
        let by_fraction = ssa(
            &series_frame(x),
            &SsaOptions {
                window: SsaWindow::Fraction(0.5),
                groups: SsaGrouping::None,
            },
            None,
        )
        .unwrap();
        assert!(by_rows.equals(&by_fraction));
    }

    #[test]
    fn test_explicit_grouping_splits_components() {
        let x = vec![1.0, 3.0, 2.0, 5.0, 4.0, 6.0];
        let frame = series_frame(x.clone());
        let options = SsaOptions {
            window: SsaWindow::Rows(3),
            groups: SsaGrouping::Explicit(vec![vec![0], vec![1, 2]]),
        };
        let out = ssa(&frame, &options, None).unwrap();
        assert_eq!(out.get_column_names(), vec!["x_ssa1", "x_ssa2"]);
        let head = column(&out, "x_ssa1");
        let tail = column(&out, "x_ssa2");
        for t in 0..x.len() {
            assert_relative_eq!(head[t] + tail[t], x[t], epsilon = 1e-8);
        }
    }

    #[test]
    fn test_count_grouping_bounds() {
        // Five components into three groups split as [0,1), [1,3), [3,5).
        let groups = component_groups(&SsaGrouping::Count(3), 5).unwrap();
        assert_eq!(groups, vec![vec![0], vec![1, 2], vec![3, 4]]);
    }

    #[test]
    fn test_multiple_columns_keep_order() {
        let frame = DataFrame::new(vec![
            Series::new("a".into(), vec![1.0f64, 2.0, 3.0, 4.0]).into(),
            Series::new("b".into(), vec![4.0f64, 3.0, 2.0, 1.0]).into(),
        ])
        .unwrap();
        let options = SsaOptions {
            window: SsaWindow::Rows(2),
            groups: SsaGrouping::None,
        };
        let out = ssa(&frame, &options, None).unwrap();
        assert_eq!(
            out.get_column_names(),
            vec!["a_ssa1", "a_ssa2", "b_ssa1", "b_ssa2"]
        );
    }

    #[rstest]
    #[case(SsaWindow::Rows(1))]
    #[case(SsaWindow::Rows(7))]
    fn test_window_rows_out_of_bounds(#[case] window: SsaWindow) {
        let frame = series_frame(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let options = SsaOptions {
            window,
            groups: SsaGrouping::None,
        };
        assert!(matches!(
            ssa(&frame, &options, None),
            Err(StatsError::InvalidParameter { reason })
                if reason.contains("must be between 2 and the series length 6")
        ));
    }

    #[rstest]
    #[case(0.0)]
    #[case(-0.25)]
    #[case(1.5)]
    fn test_window_fraction_out_of_bounds(#[case] fraction: f64) {
        let frame = series_frame(vec![1.0, 2.0, 3.0, 4.0]);
        let options = SsaOptions {
            window: SsaWindow::Fraction(fraction),
            groups: SsaGrouping::None,
        };
        assert!(matches!(
            ssa(&frame, &options, None),
            Err(StatsError::InvalidParameter { reason })
                if reason == "window fraction must be in (0, 1]"
        ));
    }

    #[rstest]
    #[case(SsaGrouping::Count(0))]
    #[case(SsaGrouping::Count(4))]
    fn test_group_count_out_of_bounds(#[case] groups: SsaGrouping) {
        let frame = series_frame(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let options = SsaOptions {
            window: SsaWindow::Rows(3),
            groups,
        };
        assert!(matches!(
            ssa(&frame, &options, None),
            Err(StatsError::InvalidParameter { reason })
                if reason.contains("must be between 1 and the window size 3")
        ));
    }

    #[test]
    fn test_explicit_group_index_out_of_bounds() {
        let frame = series_frame(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let options = SsaOptions {
            window: SsaWindow::Rows(3),
            groups: SsaGrouping::Explicit(vec![vec![0, 3]]),
        };
        assert!(matches!(
            ssa(&frame, &options, None),
            Err(StatsError::InvalidParameter { reason })
                if reason == "group component indices must be smaller than the window size 3"
        ));
    }

    #[test]
    fn test_missing_values_rejected() {
        let frame = DataFrame::new(vec![
            Series::new("x".into(), vec![Some(1.0f64), None, Some(3.0), Some(4.0)]).into(),
        ])
        .unwrap();
        let options = SsaOptions {
            window: SsaWindow::Rows(2),
            groups: SsaGrouping::None,
        };
        assert!(matches!(
            ssa(&frame, &options, None),
            Err(StatsError::InvalidParameter { reason })
                if reason == "singular spectrum analysis does not handle missing values"
        ));
    }

    #[test]
    fn test_jacobi_recovers_known_eigenpairs() {
        let matrix = ndarray::array![[2.0, 1.0], [1.0, 2.0]];
        let (eigenvalues, vectors) = jacobi_eigh(&matrix);
        assert_relative_eq!(eigenvalues[0], 3.0, epsilon = 1e-10);
        assert_relative_eq!(eigenvalues[1], 1.0, epsilon = 1e-10);
        // Dominant eigenvector is (1, 1) / sqrt(2) up to sign.
        let ratio = vectors[[0, 0]] / vectors[[1, 0]];
        assert_relative_eq!(ratio, 1.0, epsilon = 1e-10);
        let norm = (vectors[[0, 0]].powi(2) + vectors[[1, 0]].powi(2)).sqrt();
        assert_relative_eq!(norm, 1.0, epsilon = 1e-10);
    }
}
