//! Dense linear solvers shared by every model family.
//!
//! Ordinary and ridge fits go through the normal equations with a Cholesky
//! factorization; the lasso and elastic-net fits use cyclic coordinate
//! descent on the centered problem. Cross-validation scores a candidate
//! penalty grid over contiguous folds and keeps the earliest winner.

use crate::error::SolverError;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis, s};

/// Mixing ratio between the L1 and L2 penalties for the elastic-net families.
pub(crate) const ENET_L1_RATIO: f64 = 0.5;

/// Sweep cap for coordinate descent.
const CD_MAX_SWEEPS: usize = 1_000;

/// Coordinate descent stops once no coefficient moved more than this.
const CD_TOLERANCE: f64 = 1e-6;

/// A Cholesky pivot at or below this is treated as a singular system.
const PIVOT_TOLERANCE: f64 = 1e-12;

/// Preprocessing knobs applied before solving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitOptions {
    /// Fit an intercept by centering the features and targets.
    pub fit_intercept: bool,
    /// Rescale each centered feature column to unit L2 norm before solving.
    /// Only takes effect together with `fit_intercept`.
    pub normalize: bool,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            fit_intercept: true,
            normalize: false,
        }
    }
}

/// The penalty attached to a single fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Penalty {
    /// No regularization.
    None,
    /// Squared-norm penalty `alpha * ||w||²` on the loss `||y - Xw||²`.
    Ridge { alpha: f64 },
    /// Elastic-net penalty on the loss `1/(2n) ||y - Xw||²`; single target.
    ElasticNet { alpha: f64, l1_ratio: f64 },
    /// Row-wise grouped elastic-net penalty across all targets.
    MultiTaskElasticNet { alpha: f64, l1_ratio: f64 },
}

impl Penalty {
    /// The same penalty kind with a different strength.
    pub(crate) fn with_alpha(self, alpha: f64) -> Self {
        match self {
            Self::None => Self::None,
            Self::Ridge { .. } => Self::Ridge { alpha },
            Self::ElasticNet { l1_ratio, .. } => Self::ElasticNet { alpha, l1_ratio },
            Self::MultiTaskElasticNet { l1_ratio, .. } => {
                Self::MultiTaskElasticNet { alpha, l1_ratio }
            }
        }
    }
}

/// Coefficients and intercepts produced by a single fit.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FittedLinear {
    /// One column of feature weights per target, `features x targets`.
    coefficients: Array2<f64>,
    /// One intercept per target.
    intercept: Array1<f64>,
}

impl FittedLinear {
    pub(crate) fn coefficients(&self) -> &Array2<f64> {
        &self.coefficients
    }

    pub(crate) fn intercept(&self) -> &Array1<f64> {
        &self.intercept
    }

    /// Applies the fitted weights to a feature matrix, producing one
    /// prediction column per target.
    pub(crate) fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>, SolverError> {
        if x.ncols() != self.coefficients.nrows() {
            return Err(SolverError::DimensionMismatch {
                expected: self.coefficients.nrows(),
                actual: x.ncols(),
            });
        }
        Ok(x.dot(&self.coefficients) + &self.intercept)
    }
}

/// Centered and optionally rescaled copies of the training data, plus the
/// offsets needed to map coefficients back to the original scale.
struct Prepared {
    x: Array2<f64>,
    y: Array2<f64>,
    x_offset: Array1<f64>,
    y_offset: Array1<f64>,
    x_scale: Array1<f64>,
}

fn column_means(a: &ArrayView2<'_, f64>) -> Array1<f64> {
    a.sum_axis(Axis(0)) / a.nrows() as f64
}

fn prepare(x: &ArrayView2<'_, f64>, y: &ArrayView2<'_, f64>, options: FitOptions) -> Prepared {
    let mut xc = x.to_owned();
    let mut yc = y.to_owned();
    let (x_offset, y_offset) = if options.fit_intercept {
        let x_offset = column_means(x);
        let y_offset = column_means(y);
        xc -= &x_offset;
        yc -= &y_offset;
        (x_offset, y_offset)
    } else {
        (Array1::zeros(x.ncols()), Array1::zeros(y.ncols()))
    };
    let x_scale = if options.fit_intercept && options.normalize {
        let mut scale =
            Array1::from_iter(xc.columns().into_iter().map(|col| col.dot(&col).sqrt()));
        scale.mapv_inplace(|s| if s == 0.0 { 1.0 } else { s });
        xc /= &scale;
        scale
    } else {
        Array1::ones(x.ncols())
    };
    Prepared {
        x: xc,
        y: yc,
        x_offset,
        y_offset,
        x_scale,
    }
}

/// Solves the symmetric positive-definite system `a * w = b` by Cholesky
/// factorization with forward and back substitution.
pub(crate) fn solve_symmetric(
    a: &Array2<f64>,
    b: ArrayView1<'_, f64>,
) -> Result<Array1<f64>, SolverError> {
    let n = a.nrows();
    if a.ncols() != n || b.len() != n {
        return Err(SolverError::DimensionMismatch {
            expected: n,
            actual: b.len(),
        });
    }
    let mut lower = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[[i, j]];
            for k in 0..j {
                sum -= lower[[i, k]] * lower[[j, k]];
            }
            if i == j {
                if sum <= PIVOT_TOLERANCE {
                    return Err(SolverError::SingularSystem);
                }
                lower[[i, j]] = sum.sqrt();
            } else {
                lower[[i, j]] = sum / lower[[j, j]];
            }
        }
    }
    let mut forward = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = b[i];
        for k in 0..i {
            sum -= lower[[i, k]] * forward[k];
        }
        forward[i] = sum / lower[[i, i]];
    }
    let mut solution = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = forward[i];
        for k in (i + 1)..n {
            sum -= lower[[k, i]] * solution[k];
        }
        solution[i] = sum / lower[[i, i]];
    }
    Ok(solution)
}

/// Solves `(XᵀX + alpha I) W = XᵀY` column by column.
fn solve_normal_equations(
    x: &Array2<f64>,
    y: &Array2<f64>,
    ridge_alpha: f64,
) -> Result<Array2<f64>, SolverError> {
    let features = x.ncols();
    let targets = y.ncols();
    let mut gram = x.t().dot(x);
    if ridge_alpha > 0.0 {
        for j in 0..features {
            gram[[j, j]] += ridge_alpha;
        }
    }
    let moment = x.t().dot(y);
    let mut coefficients = Array2::<f64>::zeros((features, targets));
    for k in 0..targets {
        let solution = solve_symmetric(&gram, moment.column(k))?;
        coefficients.column_mut(k).assign(&solution);
    }
    Ok(coefficients)
}

fn soft_threshold(value: f64, threshold: f64) -> f64 {
    if value > threshold {
        value - threshold
    } else if value < -threshold {
        value + threshold
    } else {
        0.0
    }
}

/// Cyclic coordinate descent on `1/(2n) ||y - Xw||² + alpha l1 ||w||₁
/// + alpha (1 - l1)/2 ||w||²` for a single target.
fn coordinate_descent(
    x: &Array2<f64>,
    y: ArrayView1<'_, f64>,
    alpha: f64,
    l1_ratio: f64,
) -> Array1<f64> {
    let n = x.nrows() as f64;
    let features = x.ncols();
    let col_sq: Vec<f64> = (0..features)
        .map(|j| {
            let col = x.column(j);
            col.dot(&col) / n
        })
        .collect();
    let l1_penalty = alpha * l1_ratio;
    let l2_penalty = alpha * (1.0 - l1_ratio);
    let mut weights = Array1::<f64>::zeros(features);
    let mut residual = y.to_owned();
    for _ in 0..CD_MAX_SWEEPS {
        let mut max_delta = 0.0_f64;
        for j in 0..features {
            if col_sq[j] == 0.0 {
                continue;
            }
            let column = x.column(j);
            let rho = column.dot(&residual) / n + col_sq[j] * weights[j];
            let updated = soft_threshold(rho, l1_penalty) / (col_sq[j] + l2_penalty);
            let delta = updated - weights[j];
            if delta != 0.0 {
                residual.scaled_add(-delta, &column);
                weights[j] = updated;
            }
            max_delta = max_delta.max(delta.abs());
        }
        if max_delta < CD_TOLERANCE {
            break;
        }
    }
    weights
}

/// Coordinate descent with row-wise group soft-thresholding, so each feature
/// is kept or dropped jointly across all targets.
fn multi_task_coordinate_descent(
    x: &Array2<f64>,
    y: &Array2<f64>,
    alpha: f64,
    l1_ratio: f64,
) -> Array2<f64> {
    let n = x.nrows() as f64;
    let features = x.ncols();
    let targets = y.ncols();
    let col_sq: Vec<f64> = (0..features)
        .map(|j| {
            let col = x.column(j);
            col.dot(&col) / n
        })
        .collect();
    let l1_penalty = alpha * l1_ratio;
    let l2_penalty = alpha * (1.0 - l1_ratio);
    let mut weights = Array2::<f64>::zeros((features, targets));
    let mut residual = y.clone();
    for _ in 0..CD_MAX_SWEEPS {
        let mut max_delta = 0.0_f64;
        for j in 0..features {
            if col_sq[j] == 0.0 {
                continue;
            }
            let column = x.column(j);
            let mut rho = Array1::<f64>::zeros(targets);
            for k in 0..targets {
                rho[k] = column.dot(&residual.column(k)) / n + col_sq[j] * weights[[j, k]];
            }
            let norm = rho.dot(&rho).sqrt();
            let shrink = if norm > l1_penalty {
                1.0 - l1_penalty / norm
            } else {
                0.0
            };
            let denom = col_sq[j] + l2_penalty;
            for k in 0..targets {
                let updated = rho[k] * shrink / denom;
                let delta = updated - weights[[j, k]];
                if delta != 0.0 {
                    residual.column_mut(k).scaled_add(-delta, &column);
                    weights[[j, k]] = updated;
                }
                max_delta = max_delta.max(delta.abs());
            }
        }
        if max_delta < CD_TOLERANCE {
            break;
        }
    }
    weights
}

/// Fits one linear model under the given penalty and preprocessing options.
pub(crate) fn fit_penalized(
    x: ArrayView2<'_, f64>,
    y: ArrayView2<'_, f64>,
    penalty: Penalty,
    options: FitOptions,
) -> Result<FittedLinear, SolverError> {
    if x.nrows() == 0 || x.ncols() == 0 || y.ncols() == 0 {
        return Err(SolverError::EmptyProblem);
    }
    if y.nrows() != x.nrows() {
        return Err(SolverError::DimensionMismatch {
            expected: x.nrows(),
            actual: y.nrows(),
        });
    }
    if matches!(penalty, Penalty::ElasticNet { .. }) && y.ncols() > 1 {
        return Err(SolverError::MultiTargetUnsupported { targets: y.ncols() });
    }
    let prepared = prepare(&x, &y, options);
    let mut coefficients = match penalty {
        Penalty::None => solve_normal_equations(&prepared.x, &prepared.y, 0.0)?,
        Penalty::Ridge { alpha } => solve_normal_equations(&prepared.x, &prepared.y, alpha)?,
        Penalty::ElasticNet { alpha, l1_ratio } => {
            coordinate_descent(&prepared.x, prepared.y.column(0), alpha, l1_ratio)
                .insert_axis(Axis(1))
        }
        Penalty::MultiTaskElasticNet { alpha, l1_ratio } => {
            multi_task_coordinate_descent(&prepared.x, &prepared.y, alpha, l1_ratio)
        }
    };
    for (mut row, scale) in coefficients
        .rows_mut()
        .into_iter()
        .zip(prepared.x_scale.iter())
    {
        row.mapv_inplace(|w| w / scale);
    }
    let intercept = &prepared.y_offset - &prepared.x_offset.dot(&coefficients);
    Ok(FittedLinear {
        coefficients,
        intercept,
    })
}

/// Contiguous fold boundaries; the first `rows % folds` folds take one
/// extra row.
pub(crate) fn fold_bounds(rows: usize, folds: usize) -> Vec<(usize, usize)> {
    let base = rows / folds;
    let extra = rows % folds;
    let mut bounds = Vec::with_capacity(folds);
    let mut start = 0;
    for i in 0..folds {
        let size = base + usize::from(i < extra);
        bounds.push((start, start + size));
        start += size;
    }
    bounds
}

/// Scores every candidate penalty by mean held-out squared error across the
/// folds and returns the winner. Ties keep the earliest grid entry.
pub(crate) fn select_alpha(
    x: ArrayView2<'_, f64>,
    y: ArrayView2<'_, f64>,
    alphas: &[f64],
    folds: usize,
    template: Penalty,
    options: FitOptions,
) -> Result<f64, SolverError> {
    let rows = x.nrows();
    if folds < 2 || folds > rows {
        return Err(SolverError::InvalidFolds { folds, rows });
    }
    let Some(&first) = alphas.first() else {
        return Err(SolverError::EmptyProblem);
    };
    let splits: Vec<(Vec<usize>, usize, usize)> = fold_bounds(rows, folds)
        .into_iter()
        .map(|(lo, hi)| {
            let train: Vec<usize> = (0..rows).filter(|&i| i < lo || i >= hi).collect();
            (train, lo, hi)
        })
        .collect();
    let mut best_alpha = first;
    let mut best_score = f64::INFINITY;
    for &alpha in alphas {
        let mut total = 0.0;
        for (train, lo, hi) in &splits {
            let train_x = x.select(Axis(0), train);
            let train_y = y.select(Axis(0), train);
            let fitted = fit_penalized(
                train_x.view(),
                train_y.view(),
                template.with_alpha(alpha),
                options,
            )?;
            let test_x = x.slice(s![*lo..*hi, ..]);
            let test_y = y.slice(s![*lo..*hi, ..]);
            let predicted = fitted.predict(test_x)?;
            let diff = &predicted - &test_y;
            total += diff.mapv(|d| d * d).sum() / diff.len() as f64;
        }
        let score = total / folds as f64;
        if score < best_score {
            best_score = score;
            best_alpha = alpha;
        }
    }
    Ok(best_alpha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;
    use rstest::rstest;

    fn line_data() -> (Array2<f64>, Array2<f64>) {
        let x = array![[0.0], [1.0], [2.0], [3.0], [4.0], [5.0]];
        let y = x.mapv(|v| 2.0 + 3.0 * v);
        (x, y)
    }

    #[test]
    fn test_cholesky_solves_spd_system() {
        let a = array![[4.0, 2.0], [2.0, 3.0]];
        let b = array![10.0, 8.0];
        let solution = solve_symmetric(&a, b.view()).unwrap();
        assert_relative_eq!(solution[0], 1.75, epsilon = 1e-12);
        assert_relative_eq!(solution[1], 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_cholesky_rejects_singular_system() {
        let a = array![[1.0, 2.0], [2.0, 4.0]];
        let b = array![1.0, 2.0];
        let result = solve_symmetric(&a, b.view());
        assert!(matches!(result, Err(SolverError::SingularSystem)));
    }

    #[rstest]
    #[case(10, 3, vec![(0, 4), (4, 7), (7, 10)])]
    #[case(9, 3, vec![(0, 3), (3, 6), (6, 9)])]
    #[case(5, 2, vec![(0, 3), (3, 5)])]
    #[case(4, 4, vec![(0, 1), (1, 2), (2, 3), (3, 4)])]
    fn test_fold_bounds(
        #[case] rows: usize,
        #[case] folds: usize,
        #[case] expected: Vec<(usize, usize)>,
    ) {
        assert_eq!(fold_bounds(rows, folds), expected);
    }

    #[test]
    fn test_ordinary_fit_recovers_line() {
        let (x, y) = line_data();
        let fitted =
            fit_penalized(x.view(), y.view(), Penalty::None, FitOptions::default()).unwrap();
        assert_relative_eq!(fitted.coefficients()[[0, 0]], 3.0, epsilon = 1e-9);
        assert_relative_eq!(fitted.intercept()[0], 2.0, epsilon = 1e-9);
        let predicted = fitted.predict(x.view()).unwrap();
        assert_relative_eq!(predicted[[5, 0]], 17.0, epsilon = 1e-9);
    }

    #[test]
    fn test_ordinary_fit_recovers_noisy_plane() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(7);
        let x = Array2::from_shape_fn((80, 2), |_| rng.r#gen::<f64>() - 0.5);
        let y = Array1::from_iter(
            x.rows()
                .into_iter()
                .map(|row| 3.0 + 1.5 * row[0] - 2.0 * row[1] + 0.01 * (rng.r#gen::<f64>() - 0.5)),
        )
        .insert_axis(Axis(1));
        let fitted =
            fit_penalized(x.view(), y.view(), Penalty::None, FitOptions::default()).unwrap();
        assert_relative_eq!(fitted.coefficients()[[0, 0]], 1.5, epsilon = 0.05);
        assert_relative_eq!(fitted.coefficients()[[1, 0]], -2.0, epsilon = 0.05);
        assert_relative_eq!(fitted.intercept()[0], 3.0, epsilon = 0.05);
    }

    #[test]
    fn test_ridge_shrinks_coefficients() {
        let (x, y) = line_data();
        let fitted = fit_penalized(
            x.view(),
            y.view(),
            Penalty::Ridge { alpha: 10.0 },
            FitOptions::default(),
        )
        .unwrap();
        let slope = fitted.coefficients()[[0, 0]];
        assert!(slope > 0.0 && slope < 3.0);
    }

    #[test]
    fn test_lasso_drops_irrelevant_feature() {
        let x = array![
            [0.0, 1.0],
            [1.0, -1.0],
            [2.0, 1.0],
            [3.0, -1.0],
            [4.0, 1.0],
            [5.0, -1.0]
        ];
        let y = x.column(0).mapv(|v| 3.0 * v).insert_axis(Axis(1));
        let fitted = fit_penalized(
            x.view(),
            y.view(),
            Penalty::ElasticNet {
                alpha: 1.0,
                l1_ratio: 1.0,
            },
            FitOptions::default(),
        )
        .unwrap();
        assert_eq!(fitted.coefficients()[[1, 0]], 0.0);
        assert!(fitted.coefficients()[[0, 0]] > 2.0);
    }

    #[test]
    fn test_multi_task_drops_feature_across_targets() {
        let x = array![
            [0.0, 1.0],
            [1.0, -1.0],
            [2.0, 1.0],
            [3.0, -1.0],
            [4.0, 1.0],
            [5.0, -1.0]
        ];
        let first = x.column(0).mapv(|v| 3.0 * v);
        let second = x.column(0).mapv(|v| -2.0 * v);
        let y = ndarray::stack![Axis(1), first, second];
        let fitted = fit_penalized(
            x.view(),
            y.view(),
            Penalty::MultiTaskElasticNet {
                alpha: 1.0,
                l1_ratio: 1.0,
            },
            FitOptions::default(),
        )
        .unwrap();
        assert_eq!(fitted.coefficients()[[1, 0]], 0.0);
        assert_eq!(fitted.coefficients()[[1, 1]], 0.0);
        assert!(fitted.coefficients()[[0, 0]].abs() > 1.0);
        assert!(fitted.coefficients()[[0, 1]].abs() > 1.0);
    }

    #[test]
    fn test_single_task_penalty_rejects_multiple_targets() {
        let (x, y) = line_data();
        let wide = ndarray::concatenate![Axis(1), y, y];
        let result = fit_penalized(
            x.view(),
            wide.view(),
            Penalty::ElasticNet {
                alpha: 0.5,
                l1_ratio: 1.0,
            },
            FitOptions::default(),
        );
        assert!(matches!(
            result,
            Err(SolverError::MultiTargetUnsupported { targets: 2 })
        ));
    }

    #[test]
    fn test_empty_problem_rejected() {
        let x = Array2::<f64>::zeros((0, 2));
        let y = Array2::<f64>::zeros((0, 1));
        let result = fit_penalized(x.view(), y.view(), Penalty::None, FitOptions::default());
        assert!(matches!(result, Err(SolverError::EmptyProblem)));
    }

    #[test]
    fn test_row_count_mismatch_rejected() {
        let (x, _) = line_data();
        let y = Array2::<f64>::zeros((3, 1));
        let result = fit_penalized(x.view(), y.view(), Penalty::None, FitOptions::default());
        assert!(matches!(
            result,
            Err(SolverError::DimensionMismatch {
                expected: 6,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_predict_rejects_wrong_width() {
        let (x, y) = line_data();
        let fitted =
            fit_penalized(x.view(), y.view(), Penalty::None, FitOptions::default()).unwrap();
        let wide = Array2::<f64>::zeros((2, 3));
        let result = fitted.predict(wide.view());
        assert!(matches!(
            result,
            Err(SolverError::DimensionMismatch {
                expected: 1,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_normalize_leaves_ordinary_solution_unchanged() {
        let x = array![
            [0.0, 10.0],
            [1.0, 40.0],
            [2.0, 20.0],
            [3.0, 50.0],
            [4.0, 30.0],
            [5.0, 70.0]
        ];
        let y = (x.column(0).mapv(|v| 3.0 * v) + x.column(1).mapv(|v| 0.5 * v) + 2.0)
            .insert_axis(Axis(1));
        let plain =
            fit_penalized(x.view(), y.view(), Penalty::None, FitOptions::default()).unwrap();
        let scaled = fit_penalized(
            x.view(),
            y.view(),
            Penalty::None,
            FitOptions {
                fit_intercept: true,
                normalize: true,
            },
        )
        .unwrap();
        assert_relative_eq!(
            plain.coefficients()[[0, 0]],
            scaled.coefficients()[[0, 0]],
            epsilon = 1e-8
        );
        assert_relative_eq!(
            plain.coefficients()[[1, 0]],
            scaled.coefficients()[[1, 0]],
            epsilon = 1e-8
        );
        assert_relative_eq!(plain.intercept()[0], scaled.intercept()[0], epsilon = 1e-8);
    }

    #[test]
    fn test_without_intercept_line_through_origin() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = x.mapv(|v| 4.0 * v);
        let fitted = fit_penalized(
            x.view(),
            y.view(),
            Penalty::None,
            FitOptions {
                fit_intercept: false,
                normalize: false,
            },
        )
        .unwrap();
        assert_relative_eq!(fitted.coefficients()[[0, 0]], 4.0, epsilon = 1e-12);
        assert_relative_eq!(fitted.intercept()[0], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_cross_validation_prefers_light_penalty_on_clean_data() {
        let x = array![[0.0], [1.0], [2.0], [3.0], [4.0], [5.0], [6.0], [7.0]];
        let y = x.mapv(|v| 2.0 + 3.0 * v);
        let selected = select_alpha(
            x.view(),
            y.view(),
            &[0.01, 10.0],
            2,
            Penalty::Ridge { alpha: 0.0 },
            FitOptions::default(),
        )
        .unwrap();
        assert_relative_eq!(selected, 0.01);
    }

    #[test]
    fn test_cross_validation_rejects_oversized_fold_count() {
        let (x, y) = line_data();
        let result = select_alpha(
            x.view(),
            y.view(),
            &[0.1],
            7,
            Penalty::Ridge { alpha: 0.0 },
            FitOptions::default(),
        );
        assert!(matches!(
            result,
            Err(SolverError::InvalidFolds { folds: 7, rows: 6 })
        ));
    }

    #[test]
    fn test_soft_threshold() {
        assert_relative_eq!(soft_threshold(3.0, 1.0), 2.0);
        assert_relative_eq!(soft_threshold(-3.0, 1.0), -2.0);
        assert_relative_eq!(soft_threshold(0.5, 1.0), 0.0);
    }
}
