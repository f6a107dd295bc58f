//! Shared column restriction and extraction helpers.

use albany_data::{numeric_column, select_columns};
use polars::prelude::*;

use crate::error::{Result, StatsError};

/// Restrict a frame to the named columns, or keep all columns when no
/// restriction is given. Order-preserving either way.
pub(crate) fn restrict(frame: &DataFrame, headers: Option<&[String]>) -> Result<DataFrame> {
    match headers {
        Some(names) => Ok(select_columns(frame, names)?),
        None => Ok(frame.clone()),
    }
}

/// Fail with [`StatsError::NotNumeric`] if any column holds a non-numeric dtype.
pub(crate) fn ensure_numeric(frame: &DataFrame) -> Result<()> {
    for column in frame.get_columns() {
        if !column.dtype().is_primitive_numeric() {
            return Err(StatsError::NotNumeric {
                name: column.name().to_string(),
                dtype: column.dtype().to_string(),
            });
        }
    }
    Ok(())
}

/// Restrict to exactly one numeric column and extract its values.
///
/// Series operations (acf, pacf, seasonal decomposition) act on a single
/// column; anything else is a caller mistake worth naming.
pub(crate) fn single_column(
    frame: &DataFrame,
    headers: Option<&[String]>,
    operation: &str,
) -> Result<(String, Vec<Option<f64>>)> {
    let restricted = restrict(frame, headers)?;
    if restricted.width() != 1 {
        return Err(StatsError::invalid(format!(
            "{operation} takes exactly one column, got {}",
            restricted.width()
        )));
    }
    let name = restricted.get_column_names()[0].to_string();
    let values = numeric_column(&restricted, &name)?;
    Ok((name, values))
}
