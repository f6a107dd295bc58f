#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/albany/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod frame;
pub mod loader;

pub use error::{DataError, Result};
pub use frame::{complete_column, numeric_column, select_columns, to_matrix};
pub use loader::{DATETIME_COLUMN, LoadOptions, LoadedTable, load_csv, prepare};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
