//! Validated configuration for the multi-horizon forecasting engine.

use crate::error::{ForecastError, Result};
use crate::family::{ModelFamily, ResolvedFamily, default_alpha_grid};
use crate::solve::FitOptions;
use albany_data::DataError;
use polars::prelude::*;

/// Caller-facing knobs for [`ForecastConfig::new`].
///
/// The struct is plain data; nothing is validated until it reaches
/// [`ForecastConfig::new`].
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastOptions {
    /// Columns used as model features. `None` or an empty list keeps every
    /// training column, predictors included.
    pub regressor_columns: Option<Vec<String>>,
    /// Number of look-ahead horizons to fit, `1..=horizon_count`.
    pub horizon_count: usize,
    /// Which linear family to fit per horizon.
    pub model_family: ModelFamily,
    /// Fit an intercept by centering.
    pub fit_intercept: bool,
    /// Rescale centered feature columns to unit L2 norm.
    pub normalize: bool,
    /// Fold count for the cross-validated families.
    pub cv_folds: usize,
    /// Penalty grid for the cross-validated families. `None` uses the
    /// default 20-point logarithmic grid.
    pub alpha_grid: Option<Vec<f64>>,
}

impl Default for ForecastOptions {
    fn default() -> Self {
        Self {
            regressor_columns: None,
            horizon_count: 1,
            model_family: ModelFamily::Ordinary,
            fit_intercept: true,
            normalize: false,
            cv_folds: 5,
            alpha_grid: None,
        }
    }
}

/// A fully validated forecasting problem.
///
/// Holds copies of the feature, inference, and target tables; the caller's
/// frames are never mutated. Construction fails fast on the first invalid
/// parameter.
#[derive(Debug, Clone)]
pub struct ForecastConfig {
    features: DataFrame,
    inference_features: DataFrame,
    targets: DataFrame,
    predictor_columns: Vec<String>,
    horizon_count: usize,
    family: ResolvedFamily,
    fit_options: FitOptions,
}

impl ForecastConfig {
    /// Validates the options against the tables and builds the config.
    ///
    /// `inference` defaults to the training table. When
    /// `regressor_columns` is set, both feature tables are restricted to
    /// those columns; targets always come from the unrestricted training
    /// table.
    pub fn new(
        training: &DataFrame,
        inference: Option<&DataFrame>,
        predictor_columns: &[String],
        options: ForecastOptions,
    ) -> Result<Self> {
        if options.horizon_count < 1 {
            return Err(ForecastError::invalid("horizon_count must be >= 1"));
        }
        if predictor_columns.is_empty() {
            return Err(ForecastError::invalid("predictor_columns required"));
        }
        let regressors = options.regressor_columns.as_deref();
        let features = feature_table(training, regressors)?;
        let targets = checked_select(training, predictor_columns)?;
        let inference_features = match inference {
            Some(frame) => feature_table(frame, regressors)?,
            None => features.clone(),
        };
        let family = resolved_family(&options)?;
        Ok(Self {
            features,
            inference_features,
            targets,
            predictor_columns: predictor_columns.to_vec(),
            horizon_count: options.horizon_count,
            family,
            fit_options: FitOptions {
                fit_intercept: options.fit_intercept,
                normalize: options.normalize,
            },
        })
    }

    /// Training-side feature table.
    pub fn features(&self) -> &DataFrame {
        &self.features
    }

    /// Feature table predictions are made on.
    pub fn inference_features(&self) -> &DataFrame {
        &self.inference_features
    }

    /// Target table, one column per predictor.
    pub fn targets(&self) -> &DataFrame {
        &self.targets
    }

    /// Predicted column names in configured order.
    pub fn predictor_columns(&self) -> &[String] {
        &self.predictor_columns
    }

    /// Number of horizons the engine will fit.
    pub fn horizon_count(&self) -> usize {
        self.horizon_count
    }

    /// The model family with its cross-validation parameters resolved.
    pub fn family(&self) -> &ResolvedFamily {
        &self.family
    }

    /// Preprocessing options handed to the solver.
    pub fn solver_options(&self) -> FitOptions {
        self.fit_options
    }
}

/// Order-preserving column restriction; a missing name is a configuration
/// error here, not a data error.
pub(crate) fn checked_select(frame: &DataFrame, names: &[String]) -> Result<DataFrame> {
    albany_data::select_columns(frame, names).map_err(|e| match e {
        DataError::UnknownColumn { name } => {
            ForecastError::invalid(format!("unknown column {name}"))
        }
        other => ForecastError::Data(other),
    })
}

/// The feature table after the regressor restriction. `None` or an empty
/// list keeps every column.
pub(crate) fn feature_table(frame: &DataFrame, regressors: Option<&[String]>) -> Result<DataFrame> {
    match regressors.filter(|names| !names.is_empty()) {
        Some(names) => checked_select(frame, names),
        None => Ok(frame.clone()),
    }
}

fn resolved_family(options: &ForecastOptions) -> Result<ResolvedFamily> {
    match options.model_family {
        ModelFamily::Ordinary => Ok(ResolvedFamily::Ordinary),
        ModelFamily::RidgeCv => {
            let (alphas, folds) = cv_params(options)?;
            Ok(ResolvedFamily::RidgeCv { alphas, folds })
        }
        ModelFamily::LassoCv => {
            let (alphas, folds) = cv_params(options)?;
            Ok(ResolvedFamily::LassoCv { alphas, folds })
        }
        ModelFamily::ElasticNetCv => {
            let (alphas, folds) = cv_params(options)?;
            Ok(ResolvedFamily::ElasticNetCv { alphas, folds })
        }
        ModelFamily::MultiTaskElasticNetCv => {
            let (alphas, folds) = cv_params(options)?;
            Ok(ResolvedFamily::MultiTaskElasticNetCv { alphas, folds })
        }
    }
}

fn cv_params(options: &ForecastOptions) -> Result<(Vec<f64>, usize)> {
    let alphas = match &options.alpha_grid {
        Some(grid) if grid.is_empty() => {
            return Err(ForecastError::invalid("alpha_grid cannot be empty"));
        }
        Some(grid) if grid.iter().any(|a| !a.is_finite() || *a <= 0.0) => {
            return Err(ForecastError::invalid("alpha_grid entries must be positive"));
        }
        Some(grid) => grid.clone(),
        None => default_alpha_grid(),
    };
    if options.cv_folds < 2 {
        return Err(ForecastError::invalid("cv_folds must be >= 2"));
    }
    Ok((alphas, options.cv_folds))
}
