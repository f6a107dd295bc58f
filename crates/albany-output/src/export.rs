//! DataFrame serialization to JSON layouts and CSV.
//!
//! Every operation in the toolkit hands its result back as a Polars
//! DataFrame; this module turns those frames into the JSON layouts the
//! downstream consumers expect, or into plain CSV.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::DateTime;
use polars::prelude::*;
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    /// A cell dtype with no JSON rendering.
    #[error("cannot serialize cells of dtype {dtype}")]
    UnsupportedCell {
        /// Dtype of the offending cell
        dtype: String,
    },
}

/// JSON layout of an exported table.
///
/// Rows are addressed by position, so the object-keyed layouts use the
/// string row labels `"0"`, `"1"`, and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orient {
    /// `{column: {row: value}}`.
    #[default]
    Columns,
    /// `[{column: value}, ...]`, one object per row.
    Records,
    /// `{row: {column: value}}`.
    Index,
    /// `[[value, ...], ...]`, one array per row.
    Values,
    /// `{"columns": [...], "index": [...], "data": [[...], ...]}`.
    Split,
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Compact JSON in the given layout.
    Json(Orient),
    /// Pretty-printed JSON in the given layout.
    PrettyJson(Orient),
    /// Comma-separated values with a header row.
    Csv,
}

impl ExportFormat {
    /// File extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json(_) | Self::PrettyJson(_) => "json",
        }
    }
}

/// Render a table to a string in the requested format.
///
/// # Errors
///
/// Returns an error if a cell dtype has no serialization or the writer
/// fails.
pub fn export_to_string(frame: &DataFrame, format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::Json(orient) => Ok(serde_json::to_string(&json_value(frame, orient)?)?),
        ExportFormat::PrettyJson(orient) => {
            Ok(serde_json::to_string_pretty(&json_value(frame, orient)?)?)
        }
        ExportFormat::Csv => {
            let mut buffer = Vec::new();
            CsvWriter::new(&mut buffer).finish(&mut frame.clone())?;
            Ok(String::from_utf8(buffer).map_err(std::io::Error::other)?)
        }
    }
}

/// Render a table to a file in the requested format.
///
/// # Errors
///
/// Returns an error if serialization or file writing fails.
pub fn export_to_file(
    frame: &DataFrame,
    format: ExportFormat,
    path: &Path,
) -> Result<(), ExportError> {
    let content = export_to_string(frame, format)?;
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

/// Build the JSON tree for a frame in the given layout.
fn json_value(frame: &DataFrame, orient: Orient) -> Result<Value, ExportError> {
    let names: Vec<String> = frame
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let columns: Vec<Vec<Value>> = frame
        .get_columns()
        .iter()
        .map(column_values)
        .collect::<Result<_, _>>()?;
    let height = frame.height();

    Ok(match orient {
        Orient::Columns => {
            let mut table = Map::with_capacity(names.len());
            for (name, values) in names.into_iter().zip(columns) {
                let mut entries = Map::with_capacity(values.len());
                for (index, value) in values.into_iter().enumerate() {
                    entries.insert(index.to_string(), value);
                }
                table.insert(name, Value::Object(entries));
            }
            Value::Object(table)
        }
        Orient::Records => Value::Array(
            frame_rows(&columns, height)
                .into_iter()
                .map(|row| Value::Object(names.iter().cloned().zip(row).collect()))
                .collect(),
        ),
        Orient::Index => {
            let mut table = Map::with_capacity(height);
            for (index, row) in frame_rows(&columns, height).into_iter().enumerate() {
                let entries = names.iter().cloned().zip(row).collect();
                table.insert(index.to_string(), Value::Object(entries));
            }
            Value::Object(table)
        }
        Orient::Values => Value::Array(
            frame_rows(&columns, height)
                .into_iter()
                .map(Value::Array)
                .collect(),
        ),
        Orient::Split => {
            let mut layout = Map::with_capacity(3);
            layout.insert(
                "columns".to_string(),
                Value::Array(names.into_iter().map(Value::String).collect()),
            );
            layout.insert(
                "index".to_string(),
                Value::Array((0..height as u64).map(Value::from).collect()),
            );
            layout.insert(
                "data".to_string(),
                Value::Array(
                    frame_rows(&columns, height)
                        .into_iter()
                        .map(Value::Array)
                        .collect(),
                ),
            );
            Value::Object(layout)
        }
    })
}

/// Cell values regrouped row by row.
fn frame_rows(columns: &[Vec<Value>], height: usize) -> Vec<Vec<Value>> {
    (0..height)
        .map(|index| columns.iter().map(|column| column[index].clone()).collect())
        .collect()
}

/// JSON values of every cell in one column, top to bottom.
fn column_values(column: &Column) -> Result<Vec<Value>, ExportError> {
    let series = column.as_materialized_series();
    (0..series.len())
        .map(|index| cell_value(series.get(index)?))
        .collect()
}

/// JSON rendering of a single cell.
///
/// Nulls and non-finite floats map to JSON null; integers stay integral;
/// dates and datetimes become ISO 8601 strings.
fn cell_value(value: AnyValue<'_>) -> Result<Value, ExportError> {
    Ok(match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(flag) => Value::Bool(flag),
        AnyValue::Int8(v) => Value::from(v),
        AnyValue::Int16(v) => Value::from(v),
        AnyValue::Int32(v) => Value::from(v),
        AnyValue::Int64(v) => Value::from(v),
        AnyValue::UInt8(v) => Value::from(v),
        AnyValue::UInt16(v) => Value::from(v),
        AnyValue::UInt32(v) => Value::from(v),
        AnyValue::UInt64(v) => Value::from(v),
        AnyValue::Float32(v) => float_value(f64::from(v)),
        AnyValue::Float64(v) => float_value(v),
        AnyValue::String(text) => Value::String(text.to_string()),
        AnyValue::StringOwned(text) => Value::String(text.to_string()),
        AnyValue::Date(days) => date_value(days),
        AnyValue::Datetime(stamp, unit, _) => datetime_value(stamp, unit),
        AnyValue::DatetimeOwned(stamp, unit, _) => datetime_value(stamp, unit),
        other => {
            return Err(ExportError::UnsupportedCell {
                dtype: other.dtype().to_string(),
            });
        }
    })
}

/// Finite floats keep their value; NaN and infinities become null.
fn float_value(value: f64) -> Value {
    serde_json::Number::from_f64(value).map_or(Value::Null, Value::Number)
}

/// Days since the epoch as an ISO 8601 date string.
///
/// Stamps outside the representable range fall back to null, the same
/// treatment non-finite floats get.
fn date_value(days: i32) -> Value {
    DateTime::from_timestamp(i64::from(days) * 86_400, 0).map_or(Value::Null, |moment| {
        Value::String(moment.date_naive().to_string())
    })
}

/// An epoch timestamp as an ISO 8601 datetime string with milliseconds.
fn datetime_value(stamp: i64, unit: TimeUnit) -> Value {
    let moment = match unit {
        TimeUnit::Nanoseconds => Some(DateTime::from_timestamp_nanos(stamp)),
        TimeUnit::Microseconds => DateTime::from_timestamp_micros(stamp),
        TimeUnit::Milliseconds => DateTime::from_timestamp_millis(stamp),
    };
    moment.map_or(Value::Null, |moment| {
        Value::String(
            moment
                .naive_utc()
                .format("%Y-%m-%dT%H:%M:%S%.3f")
                .to_string(),
        )
    })
}
