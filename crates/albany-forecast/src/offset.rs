//! Single-offset ordinary least squares over a table.
//!
//! The one-model ancestor of the multi-horizon engine: targets are the
//! predictor columns shifted `offset` rows back, features are everything
//! before the shift, and the fitted model predicts over the whole table.

use crate::config::{checked_select, feature_table};
use crate::error::{ForecastError, Result};
use crate::family::ResolvedFamily;
use crate::model::LinearModel;
use crate::solve::FitOptions;
use albany_data::to_matrix;
use ndarray::s;
use polars::prelude::*;

/// Options for [`linear_offset`].
#[derive(Debug, Clone, PartialEq)]
pub struct OffsetOptions {
    /// Columns to predict; at least one is required.
    pub predictor_columns: Vec<String>,
    /// Feature restriction; `None` or an empty list keeps every column.
    pub regressor_columns: Option<Vec<String>>,
    /// Row shift between features and targets, at least 1.
    pub offset: usize,
    /// Fit an intercept by centering.
    pub fit_intercept: bool,
    /// Rescale centered feature columns to unit L2 norm.
    pub normalize: bool,
}

impl Default for OffsetOptions {
    fn default() -> Self {
        Self {
            predictor_columns: Vec::new(),
            regressor_columns: None,
            offset: 1,
            fit_intercept: true,
            normalize: false,
        }
    }
}

/// Fits ordinary least squares at a single row offset and predicts over the
/// full table.
///
/// Targets come from the unrestricted table rows `[offset, rows)`; features
/// are the restricted table rows `[0, rows - offset)`. The output has one
/// `predict_<name>` column per predictor and the full table's row count.
pub fn linear_offset(frame: &DataFrame, options: &OffsetOptions) -> Result<DataFrame> {
    if options.offset < 1 {
        return Err(ForecastError::invalid("offset cannot be less than 1"));
    }
    if options.predictor_columns.is_empty() {
        return Err(ForecastError::invalid("predictor_columns required"));
    }
    let rows = frame.height();
    if rows < options.offset + 1 {
        return Err(ForecastError::InsufficientData {
            horizon: options.offset,
            rows_available: rows,
        });
    }
    let targets = to_matrix(&checked_select(frame, &options.predictor_columns)?)?;
    let features = to_matrix(&feature_table(
        frame,
        options.regressor_columns.as_deref(),
    )?)?;
    let x = features.slice(s![..rows - options.offset, ..]);
    let y = targets.slice(s![options.offset.., ..]);
    let model = LinearModel::fit(
        x,
        y,
        &ResolvedFamily::Ordinary,
        FitOptions {
            fit_intercept: options.fit_intercept,
            normalize: options.normalize,
        },
    )?;
    let predicted = model.predict(features.view())?;
    let columns: Vec<Column> = options
        .predictor_columns
        .iter()
        .enumerate()
        .map(|(k, name)| {
            Series::new(
                format!("predict_{name}").into(),
                predicted.column(k).to_vec(),
            )
            .into()
        })
        .collect();
    Ok(DataFrame::new(columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn lagged_frame() -> DataFrame {
        let x: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let mut y = vec![999.0];
        y.extend((0..9).map(|i| 2.0 * i as f64 + 1.0));
        DataFrame::new(vec![
            Series::new("x".into(), x).into(),
            Series::new("y".into(), y).into(),
        ])
        .unwrap()
    }

    #[test]
    fn test_zero_offset_rejected() {
        let options = OffsetOptions {
            predictor_columns: vec!["y".into()],
            offset: 0,
            ..Default::default()
        };
        let result = linear_offset(&lagged_frame(), &options);
        assert!(matches!(
            result,
            Err(ForecastError::InvalidConfiguration { reason }) if reason.contains("offset")
        ));
    }

    #[test]
    fn test_missing_predictors_rejected() {
        let result = linear_offset(&lagged_frame(), &OffsetOptions::default());
        assert!(matches!(
            result,
            Err(ForecastError::InvalidConfiguration { reason })
                if reason.contains("predictor_columns")
        ));
    }

    #[test]
    fn test_short_table_rejected() {
        let frame = DataFrame::new(vec![
            Series::new("x".into(), &[1.0, 2.0]).into(),
            Series::new("y".into(), &[1.0, 2.0]).into(),
        ])
        .unwrap();
        let options = OffsetOptions {
            predictor_columns: vec!["y".into()],
            offset: 5,
            ..Default::default()
        };
        let result = linear_offset(&frame, &options);
        assert!(matches!(
            result,
            Err(ForecastError::InsufficientData {
                horizon: 5,
                rows_available: 2
            })
        ));
    }

    #[test]
    fn test_offset_one_recovers_lagged_line() {
        let options = OffsetOptions {
            predictor_columns: vec!["y".into()],
            regressor_columns: Some(vec!["x".into()]),
            ..Default::default()
        };
        let result = linear_offset(&lagged_frame(), &options).unwrap();
        assert_eq!(result.shape(), (10, 1));
        assert_eq!(result.get_column_names(), vec!["predict_y"]);
        let predicted = result.column("predict_y").unwrap().f64().unwrap();
        assert_relative_eq!(predicted.get(0).unwrap(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(predicted.get(9).unwrap(), 19.0, epsilon = 1e-9);
    }

    #[test]
    fn test_larger_offset_shifts_intercept() {
        let options = OffsetOptions {
            predictor_columns: vec!["y".into()],
            regressor_columns: Some(vec!["x".into()]),
            offset: 2,
            ..Default::default()
        };
        let result = linear_offset(&lagged_frame(), &options).unwrap();
        let predicted = result.column("predict_y").unwrap().f64().unwrap();
        // y[t] = 2 x[t-2] + 3, so predicting at x = 9 gives 21
        assert_relative_eq!(predicted.get(9).unwrap(), 21.0, epsilon = 1e-9);
    }

    #[test]
    fn test_two_predictors_two_output_columns() {
        let options = OffsetOptions {
            predictor_columns: vec!["x".into(), "y".into()],
            ..Default::default()
        };
        let result = linear_offset(&lagged_frame(), &options).unwrap();
        assert_eq!(result.get_column_names(), vec!["predict_x", "predict_y"]);
        assert_eq!(result.height(), 10);
    }
}
