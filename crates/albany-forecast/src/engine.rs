//! Multi-horizon fitting and forecasting.
//!
//! Horizon `h` pairs feature rows `[0, rows-h)` with target rows
//! `[h, rows)`, so each model learns to look `h` steps ahead. Forecasting
//! applies every horizon model to the full inference table and labels the
//! outputs with stable per-horizon column names.

use crate::config::ForecastConfig;
use crate::error::{ForecastError, Result};
use crate::model::LinearModel;
use albany_data::to_matrix;
use ndarray::s;
use polars::prelude::*;

/// The output column name for the horizon-`horizon` prediction of `name`.
pub fn prediction_column(name: &str, horizon: usize) -> String {
    format!("predict_{name}_h{horizon}")
}

/// Fitted models addressed by 1-based horizon, one per horizon in
/// `1..=horizon_count`.
///
/// Built in a single pass by [`ForecastEngine::fit`] and replaced wholesale
/// by a refit; a partially filled set never exists.
#[derive(Debug, Clone)]
pub struct HorizonModelSet {
    models: Vec<LinearModel>,
}

impl HorizonModelSet {
    /// The model for 1-based `horizon`, if that horizon was configured.
    pub fn model(&self, horizon: usize) -> Option<&LinearModel> {
        horizon.checked_sub(1).and_then(|i| self.models.get(i))
    }

    /// Number of fitted horizons.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Whether the set holds no models.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Models in increasing horizon order.
    pub fn iter(&self) -> impl Iterator<Item = &LinearModel> {
        self.models.iter()
    }
}

/// Fits one linear model per horizon and assembles their forecasts.
#[derive(Debug, Clone)]
pub struct ForecastEngine {
    config: ForecastConfig,
    models: Option<HorizonModelSet>,
}

impl ForecastEngine {
    /// An unfitted engine over a validated configuration.
    pub const fn new(config: ForecastConfig) -> Self {
        Self {
            config,
            models: None,
        }
    }

    /// The configuration this engine runs.
    pub const fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// The fitted model set, once [`fit`](Self::fit) has succeeded.
    pub const fn models(&self) -> Option<&HorizonModelSet> {
        self.models.as_ref()
    }

    /// Fits one model of the configured family per horizon.
    ///
    /// Fails with [`ForecastError::InsufficientData`] before fitting
    /// anything when the training table cannot serve every horizon; any
    /// failure leaves the engine unfitted.
    pub fn fit(&mut self) -> Result<()> {
        self.models = None;
        let rows = self.config.features().height();
        let horizons = self.config.horizon_count();
        if rows < horizons + 1 {
            // Blames the first horizon that runs past the table, capped at
            // the largest configured one.
            return Err(ForecastError::InsufficientData {
                horizon: (rows + 1).min(horizons),
                rows_available: rows,
            });
        }
        let features = to_matrix(self.config.features())?;
        let targets = to_matrix(self.config.targets())?;
        let mut models = Vec::with_capacity(horizons);
        for h in 1..=horizons {
            let x = features.slice(s![..rows - h, ..]);
            let y = targets.slice(s![h.., ..]);
            models.push(LinearModel::fit(
                x,
                y,
                self.config.family(),
                self.config.solver_options(),
            )?);
        }
        self.models = Some(HorizonModelSet { models });
        Ok(())
    }

    /// One frame per horizon in increasing order, each predicting over the
    /// full inference table.
    ///
    /// Columns are named `predict_<predictor>_h<horizon>`. Errors with
    /// [`ForecastError::NotFitted`] until a successful [`fit`](Self::fit).
    pub fn forecast(&self) -> Result<Vec<DataFrame>> {
        let models = self.models.as_ref().ok_or(ForecastError::NotFitted)?;
        let inference = to_matrix(self.config.inference_features())?;
        let mut frames = Vec::with_capacity(models.len());
        for (index, model) in models.iter().enumerate() {
            let horizon = index + 1;
            let predicted = model.predict(inference.view())?;
            let columns: Vec<Column> = self
                .config
                .predictor_columns()
                .iter()
                .enumerate()
                .map(|(k, name)| {
                    Series::new(
                        prediction_column(name, horizon).into(),
                        predicted.column(k).to_vec(),
                    )
                    .into()
                })
                .collect();
            frames.push(DataFrame::new(columns)?);
        }
        Ok(frames)
    }

    /// Fits, forecasts, and concatenates the per-horizon frames side by
    /// side, horizon 1 first.
    ///
    /// The result has `len(inference)` rows and `horizon_count ×
    /// len(predictor_columns)` columns. Re-running refits from scratch.
    pub fn run(&mut self) -> Result<DataFrame> {
        self.fit()?;
        let mut columns: Vec<Column> = Vec::new();
        for frame in self.forecast()? {
            columns.extend(frame.get_columns().iter().cloned());
        }
        Ok(DataFrame::new(columns)?)
    }
}
