//! Single-offset logistic classification over a table.
//!
//! Binary targets are fitted directly; more than two distinct labels fall
//! back to one-vs-rest, predicting the class whose decision score wins.
//! Fitting is iteratively reweighted least squares with an L2 penalty of
//! `1/c` on the feature weights; the intercept is never penalized.

use crate::config::{checked_select, feature_table};
use crate::error::{ForecastError, Result};
use crate::solve::solve_symmetric;
use albany_data::to_matrix;
use ndarray::{Array1, Array2, ArrayView2, s};
use polars::prelude::*;

/// Per-row curvature weights are floored to keep the reweighted system
/// positive definite when probabilities saturate.
const WEIGHT_FLOOR: f64 = 1e-10;

/// Options for [`logistic_offset`].
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticOptions {
    /// Column holding the class labels; exactly one is required.
    pub predictor_columns: Vec<String>,
    /// Feature restriction; `None` or an empty list keeps every column.
    pub regressor_columns: Option<Vec<String>>,
    /// Row shift between features and targets, at least 1.
    pub offset: usize,
    /// Inverse regularization strength, must be positive.
    pub c: f64,
    /// Iteration cap for the reweighted solver.
    pub max_iter: usize,
    /// Convergence tolerance on the largest weight update.
    pub tol: f64,
    /// Fit an unpenalized intercept.
    pub fit_intercept: bool,
}

impl Default for LogisticOptions {
    fn default() -> Self {
        Self {
            predictor_columns: Vec::new(),
            regressor_columns: None,
            offset: 1,
            c: 1.0,
            max_iter: 100,
            tol: 1e-4,
            fit_intercept: true,
        }
    }
}

/// Fits a logistic classifier at a single row offset and predicts class
/// labels over the full table.
///
/// Class labels are the sorted distinct values of the predictor column;
/// at least two are required. The output is one `<name>_predict` column
/// with the full table's row count.
pub fn logistic_offset(frame: &DataFrame, options: &LogisticOptions) -> Result<DataFrame> {
    if options.offset < 1 {
        return Err(ForecastError::invalid("offset cannot be less than 1"));
    }
    if options.predictor_columns.is_empty() {
        return Err(ForecastError::invalid("predictor_columns required"));
    }
    if options.predictor_columns.len() > 1 {
        return Err(ForecastError::invalid(
            "logistic regression takes exactly one predictor column",
        ));
    }
    if options.c <= 0.0 {
        return Err(ForecastError::invalid("c must be positive"));
    }
    let rows = frame.height();
    if rows < options.offset + 1 {
        return Err(ForecastError::InsufficientData {
            horizon: options.offset,
            rows_available: rows,
        });
    }
    let name = &options.predictor_columns[0];
    let labels = to_matrix(&checked_select(frame, &options.predictor_columns)?)?;
    let features = to_matrix(&feature_table(
        frame,
        options.regressor_columns.as_deref(),
    )?)?;
    let train_x = augment(features.slice(s![..rows - options.offset, ..]), options.fit_intercept);
    let train_labels = labels.slice(s![options.offset.., 0]).to_owned();
    let classes = distinct_sorted(&train_labels);
    if classes.len() < 2 {
        return Err(ForecastError::invalid("target needs at least 2 classes"));
    }
    let penalty = 1.0 / options.c;
    let penalized = features.ncols();
    let full_x = augment(features.view(), options.fit_intercept);
    let predicted = if classes.len() == 2 {
        let target = train_labels.mapv(|v| if v == classes[1] { 1.0 } else { 0.0 });
        let weights = fit_binary(&train_x, &target, penalty, penalized, options)?;
        full_x
            .dot(&weights)
            .mapv(|score| if score > 0.0 { classes[1] } else { classes[0] })
    } else {
        let mut scores = Array2::<f64>::zeros((rows, classes.len()));
        for (k, class) in classes.iter().enumerate() {
            let target = train_labels.mapv(|v| if v == *class { 1.0 } else { 0.0 });
            let weights = fit_binary(&train_x, &target, penalty, penalized, options)?;
            scores.column_mut(k).assign(&full_x.dot(&weights));
        }
        argmax_labels(&scores, &classes)
    };
    let column: Column = Series::new(format!("{name}_predict").into(), predicted.to_vec()).into();
    Ok(DataFrame::new(vec![column])?)
}

/// Appends a constant column of ones when an intercept is wanted.
fn augment(x: ArrayView2<'_, f64>, fit_intercept: bool) -> Array2<f64> {
    if !fit_intercept {
        return x.to_owned();
    }
    let mut augmented = Array2::<f64>::ones((x.nrows(), x.ncols() + 1));
    augmented.slice_mut(s![.., ..x.ncols()]).assign(&x);
    augmented
}

fn distinct_sorted(values: &Array1<f64>) -> Vec<f64> {
    let mut classes: Vec<f64> = values.iter().copied().collect();
    classes.sort_by(f64::total_cmp);
    classes.dedup();
    classes
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Newton iterations on the penalized log-loss. The first `penalized`
/// weights carry the L2 penalty; any intercept column sits after them.
fn fit_binary(
    x: &Array2<f64>,
    target: &Array1<f64>,
    penalty: f64,
    penalized: usize,
    options: &LogisticOptions,
) -> Result<Array1<f64>> {
    let mut weights = Array1::<f64>::zeros(x.ncols());
    for _ in 0..options.max_iter {
        let probs = x.dot(&weights).mapv(sigmoid);
        let mut gradient = x.t().dot(&(&probs - target));
        for j in 0..penalized {
            gradient[j] += penalty * weights[j];
        }
        let mut reweighted = x.to_owned();
        for (i, mut row) in reweighted.rows_mut().into_iter().enumerate() {
            let w = (probs[i] * (1.0 - probs[i])).max(WEIGHT_FLOOR);
            row *= w;
        }
        let mut hessian = x.t().dot(&reweighted);
        for j in 0..penalized {
            hessian[[j, j]] += penalty;
        }
        let step = solve_symmetric(&hessian, gradient.view())?;
        let largest = step.iter().fold(0.0_f64, |m, s| m.max(s.abs()));
        weights -= &step;
        if largest < options.tol {
            break;
        }
    }
    Ok(weights)
}

/// Per row, the class whose score is largest; ties keep the earliest class.
fn argmax_labels(scores: &Array2<f64>, classes: &[f64]) -> Array1<f64> {
    Array1::from_iter(scores.rows().into_iter().map(|row| {
        let mut best = 0;
        for (k, score) in row.iter().enumerate() {
            if *score > row[best] {
                best = k;
            }
        }
        classes[best]
    }))
}
