//! Fixed rolling windows.

use std::str::FromStr;

use derive_more::Display;
use polars::prelude::*;

use crate::columns::{ensure_numeric, restrict};
use crate::error::{Result, StatsError};

/// Statistic computed over each rolling window.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Default)]
pub enum RollKind {
    /// Window mean. The default.
    #[default]
    #[display("mean")]
    Mean,
    /// Window sample variance (ddof 1).
    #[display("var")]
    Var,
    /// Window sample standard deviation (ddof 1).
    #[display("std")]
    Std,
}

impl FromStr for RollKind {
    type Err = StatsError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "mean" => Ok(Self::Mean),
            "var" => Ok(Self::Var),
            "std" => Ok(Self::Std),
            other => Err(StatsError::unsupported("roll_type", other)),
        }
    }
}

/// Rolling-window statistic over every selected column.
///
/// The window only emits once it is full (`min_periods = window`), so the
/// first `window - 1` rows of each output column are null.
pub fn roll(
    frame: &DataFrame,
    window: usize,
    kind: RollKind,
    headers: Option<&[String]>,
) -> Result<DataFrame> {
    if window < 1 {
        return Err(StatsError::invalid("window must be >= 1"));
    }
    let restricted = restrict(frame, headers)?;
    ensure_numeric(&restricted)?;

    let exprs: Vec<Expr> = restricted
        .get_column_names()
        .iter()
        .map(|name| {
            let options = RollingOptionsFixedWindow {
                window_size: window,
                min_periods: window,
                fn_params: matches!(kind, RollKind::Var | RollKind::Std)
                    .then_some(RollingFnParams::Var(RollingVarParams { ddof: 1 })),
                ..Default::default()
            };
            let column = col(name.as_str());
            match kind {
                RollKind::Mean => column.rolling_mean(options),
                RollKind::Var => column.rolling_var(options),
                RollKind::Std => column.rolling_std(options),
            }
        })
        .collect();

    Ok(restricted.lazy().select(exprs).collect()?)
}
