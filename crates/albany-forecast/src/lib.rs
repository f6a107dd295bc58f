#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/albany/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod engine;
pub mod error;
pub mod family;
pub mod logistic;
pub mod model;
pub mod offset;
mod solve;

pub use config::{ForecastConfig, ForecastOptions};
pub use engine::{ForecastEngine, HorizonModelSet, prediction_column};
pub use error::{ForecastError, Result, SolverError};
pub use family::{ModelFamily, ResolvedFamily, default_alpha_grid};
pub use logistic::{LogisticOptions, logistic_offset};
pub use model::LinearModel;
pub use offset::{OffsetOptions, linear_offset};
pub use solve::FitOptions;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
