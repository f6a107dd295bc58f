#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/albany/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;

pub use export::{ExportError, ExportFormat, Orient, export_to_file, export_to_string};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
