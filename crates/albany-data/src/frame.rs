//! Column selection and numeric extraction helpers.
//!
//! Every Albany operation that takes a `headers` restriction goes through
//! [`select_columns`], and the solver layer receives its matrices from
//! [`to_matrix`]. Row order is never changed by any helper here; downstream
//! slicing relies on it.

use crate::error::{DataError, Result};
use ndarray::Array2;
use polars::prelude::*;

/// Restrict a frame to the named columns, preserving the given order.
///
/// Fails with [`DataError::UnknownColumn`] naming the first missing column.
pub fn select_columns(frame: &DataFrame, names: &[String]) -> Result<DataFrame> {
    for name in names {
        if frame.get_column_index(name).is_none() {
            return Err(DataError::UnknownColumn { name: name.clone() });
        }
    }
    Ok(frame.select(names.iter().map(String::as_str))?)
}

/// Extract one column as `f64` values with nulls preserved.
///
/// Any numeric dtype is cast to `Float64`; non-numeric dtypes fail with
/// [`DataError::NotNumeric`].
pub fn numeric_column(frame: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = frame
        .column(name)
        .map_err(|_| DataError::UnknownColumn {
            name: name.to_string(),
        })?;
    if !column.dtype().is_primitive_numeric() {
        return Err(DataError::NotNumeric {
            name: name.to_string(),
            dtype: column.dtype().to_string(),
        });
    }
    let values = column.cast(&DataType::Float64)?;
    Ok(values.f64()?.into_iter().collect())
}

/// Extract one column as `f64` values, rejecting nulls.
pub fn complete_column(frame: &DataFrame, name: &str) -> Result<Vec<f64>> {
    numeric_column(frame, name)?
        .into_iter()
        .map(|v| {
            v.ok_or_else(|| DataError::NullValue {
                name: name.to_string(),
            })
        })
        .collect()
}

/// Convert a frame into a dense row-major `f64` matrix (rows × columns).
///
/// The solvers require complete data, so a null anywhere fails with
/// [`DataError::NullValue`] naming the column.
pub fn to_matrix(frame: &DataFrame) -> Result<Array2<f64>> {
    if frame.height() == 0 || frame.width() == 0 {
        return Err(DataError::EmptyTable);
    }
    let mut matrix = Array2::zeros((frame.height(), frame.width()));
    for (j, name) in frame.get_column_names().iter().enumerate() {
        let values = complete_column(frame, name.as_str())?;
        for (i, value) in values.into_iter().enumerate() {
            matrix[[i, j]] = value;
        }
    }
    Ok(matrix)
}
