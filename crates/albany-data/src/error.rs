//! Error types for data loading and column access.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while loading tables or extracting columns.
#[derive(Debug, Error)]
pub enum DataError {
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

    /// A null cell was found where complete data is required.
    #[error("column {name} contains null values")]
    NullValue {
        /// Offending column
        name: String,
    },

    /// The table has no rows or no columns.
    #[error("table is empty")]
    EmptyTable,

    /// Data parsing error
    #[error("Data parsing error: {0}")]
    Parse(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}
