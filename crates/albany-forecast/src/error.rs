//! Error types for configuration, fitting, and forecasting.

use thiserror::Error;

/// Result type for forecasting operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Errors surfaced by the forecasting engine.
///
/// Everything propagates to the caller; nothing is retried or swallowed.
/// Validation is front-loaded so a failed fit never leaves a partial
/// model set behind.
#[derive(Debug, Error)]
pub enum ForecastError {
    /// A construction parameter violates the configuration contract.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration {
        /// What was wrong
        reason: String,
    },

    /// The training table cannot serve every configured horizon.
    #[error("insufficient data for horizon {horizon}: {rows_available} rows available")]
    InsufficientData {
        /// A configured horizon the available rows cannot serve
        horizon: usize,
        /// Rows available in the training table
        rows_available: usize,
    },

    /// `forecast` was called before a successful `fit`.
    #[error("model set not fitted: call fit() before forecast()")]
    NotFitted,

    /// Numerical solver error
    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),

    /// Data access error
    #[error("Data error: {0}")]
    Data(#[from] albany_data::DataError),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}

impl ForecastError {
    /// Shorthand for [`InvalidConfiguration`](Self::InvalidConfiguration).
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }
}

/// Errors raised inside the numerical solver layer.
#[derive(Debug, Error)]
pub enum SolverError {
    /// The normal equations are not positive definite.
    #[error("linear system is singular")]
    SingularSystem,

    /// Input shapes do not line up.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected extent
        expected: usize,
        /// Actual extent
        actual: usize,
    },

    /// A single-target family received several target columns.
    #[error("single-target solver got {targets} target columns; use the multi-task family")]
    MultiTargetUnsupported {
        /// Number of target columns supplied
        targets: usize,
    },

    /// No rows to fit.
    #[error("empty training problem")]
    EmptyProblem,

    /// Cross-validation asked for more folds than rows.
    #[error("cannot split {rows} rows into {folds} folds")]
    InvalidFolds {
        /// Requested fold count
        folds: usize,
        /// Rows available
        rows: usize,
    },
}
