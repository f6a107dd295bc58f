//! Gap filling for missing observations.

use std::str::FromStr;

use albany_data::numeric_column;
use derive_more::Display;
use polars::prelude::*;

use crate::columns::{ensure_numeric, restrict};
use crate::error::{Result, StatsError};

/// How a missing value is estimated from its neighbors.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterpolateMethod {
    /// Straight line between the surrounding observations. The default.
    #[default]
    #[display("linear")]
    Linear,
    /// Value of the closest observation by row position.
    #[display("nearest")]
    Nearest,
}

impl FromStr for InterpolateMethod {
    type Err = StatsError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "linear" => Ok(Self::Linear),
            "nearest" => Ok(Self::Nearest),
            other => Err(StatsError::unsupported("method", other)),
        }
    }
}

/// Fill null gaps in every selected column.
///
/// Filling runs forward: leading nulls are left untouched, and linear
/// interpolation pads trailing nulls with the last known value. `limit`
/// caps how many consecutive nulls are filled within each gap; the rest
/// of the gap stays null.
pub fn interpolate(
    frame: &DataFrame,
    method: InterpolateMethod,
    limit: Option<usize>,
    headers: Option<&[String]>,
) -> Result<DataFrame> {
    if limit == Some(0) {
        return Err(StatsError::invalid("limit must be >= 1"));
    }
    let restricted = restrict(frame, headers)?;
    ensure_numeric(&restricted)?;

    let exprs: Vec<Expr> = restricted
        .get_column_names()
        .iter()
        .map(|name| {
            let column = col(name.as_str()).cast(DataType::Float64);
            match method {
                InterpolateMethod::Linear => column
                    .interpolate(InterpolationMethod::Linear)
                    .forward_fill(None),
                InterpolateMethod::Nearest => column.interpolate(InterpolationMethod::Nearest),
            }
        })
        .collect();
    let filled = restricted.clone().lazy().select(exprs).collect()?;

    match limit {
        Some(limit) => cap_gap_fill(&restricted, &filled, limit),
        None => Ok(filled),
    }
}

/// Restore nulls past the first `limit` filled positions of every gap.
///
/// The gap boundaries come from the input frame, since the filled frame no
/// longer knows which values were observed and which were estimated.
fn cap_gap_fill(original: &DataFrame, filled: &DataFrame, limit: usize) -> Result<DataFrame> {
    let columns = original
        .get_column_names()
        .iter()
        .map(|name| {
            let was_null: Vec<bool> = numeric_column(original, name.as_str())?
                .iter()
                .map(Option::is_none)
                .collect();
            let mut values = numeric_column(filled, name.as_str())?;
            let mut run = 0usize;
            for (value, missing) in values.iter_mut().zip(&was_null) {
                if *missing {
                    run += 1;
                    if run > limit {
                        *value = None;
                    }
                } else {
                    run = 0;
                }
            }
            Ok(Series::new(name.as_str().into(), values).into())
        })
        .collect::<Result<Vec<Column>>>()?;
    Ok(DataFrame::new(columns)?)
}
