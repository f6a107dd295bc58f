#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/albany/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod autocorr;
pub mod correlate;
pub mod decompose;
pub mod describe;
pub mod error;
pub mod interpolate;
pub mod lang;
pub mod window;
mod columns;

pub use autocorr::{AcfOptions, MissingPolicy, PacfMethod, PacfOptions, acf, pacf};
pub use correlate::{CorrelateOptions, CorrelationMethod, correlate};
pub use decompose::{
    DecompositionModel, SeasonalOptions, SsaGrouping, SsaOptions, SsaWindow, seasonal, ssa,
};
pub use describe::describe;
pub use error::{Result, StatsError};
pub use interpolate::{InterpolateMethod, interpolate};
pub use lang::{Language, Word};
pub use window::{EwmConfig, EwmKind, RollKind, ewm, roll};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
