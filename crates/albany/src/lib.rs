#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/albany/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export the member crates under short names
pub use albany_data as data;
pub use albany_forecast as forecast;
pub use albany_output as output;
pub use albany_stats as stats;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
