//! Error types for the statistics operations.

use albany_data::DataError;
use thiserror::Error;

/// Result type for statistics operations.
pub type Result<T> = std::result::Result<T, StatsError>;

/// Errors that can occur while computing statistics over a table.
#[derive(Debug, Error)]
pub enum StatsError {
    /// A requested column does not exist in the table.
    #[error("unknown column: {name}")]
    UnknownColumn {
        /// Name that was looked up
        name: String,
    },

    /// A column holds a dtype that cannot be treated as numeric.
    #[error("column {name} is not numeric (dtype {dtype})")]
    NotNumeric {
        /// Offending column
        name: String,
        /// Actual dtype of the column
        dtype: String,
    },

    /// An operation parameter is out of range or inconsistent.
    #[error("invalid parameter: {reason}")]
    InvalidParameter {
        /// What was wrong with the parameter
        reason: String,
    },

    /// The series is too short for the requested computation.
    #[error("insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Minimum number of observations required
        required: usize,
        /// Observations actually available
        actual: usize,
    },

    /// A name outside the supported set was requested.
    #[error("unsupported {what}: {value}")]
    Unsupported {
        /// Kind of thing that was requested (language, method, ...)
        what: String,
        /// The rejected value
        value: String,
    },

    /// Error from the data access layer.
    #[error(transparent)]
    Data(DataError),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}

impl StatsError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            reason: reason.into(),
        }
    }

    pub(crate) fn unsupported(what: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Unsupported {
            what: what.into(),
            value: value.into(),
        }
    }
}

// Column lookup failures from the data layer surface as this crate's own
// variants so callers can match on them without digging through the source.
impl From<DataError> for StatsError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::UnknownColumn { name } => Self::UnknownColumn { name },
            DataError::NotNumeric { name, dtype } => Self::NotNumeric { name, dtype },
            other => Self::Data(other),
        }
    }
}
