//! Rolling and exponentially weighted window functions.
//!
//! Both families run as Polars lazy expressions over every selected column
//! and keep the original column names.

pub mod ewm;
pub mod rolling;

pub use ewm::{EwmConfig, EwmKind, ewm};
pub use rolling::{RollKind, roll};
