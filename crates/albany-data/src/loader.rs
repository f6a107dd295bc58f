//! CSV ingestion with date consolidation and index handling.

use crate::error::{DataError, Result};
use crate::frame::select_columns;
use polars::prelude::*;
use std::path::Path;

/// Name of the column produced by date parsing.
pub const DATETIME_COLUMN: &str = "datetime";

/// Options controlling how a dataset is loaded.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Columns to parse into the consolidated `datetime` column. Multiple
    /// columns are joined with a single space before parsing; the source
    /// columns are dropped.
    pub parse_dates: Option<Vec<String>>,
    /// Columns split off as row labels. They are kept on [`LoadedTable`]
    /// for output but excluded from every computation.
    pub index: Option<Vec<String>>,
}

/// A loaded dataset: the working frame plus any split-off index columns.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    /// Columns that participate in computations.
    pub frame: DataFrame,
    /// Index columns named by [`LoadOptions::index`], in the given order.
    pub index: Option<DataFrame>,
}

/// Read a CSV file (header row, inferred schema) and apply the options.
pub fn load_csv(path: impl AsRef<Path>, options: &LoadOptions) -> Result<LoadedTable> {
    let frame = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.as_ref().to_path_buf()))?
        .finish()?;
    prepare(frame, options)
}

/// Apply [`LoadOptions`] to an already materialized frame.
///
/// Date consolidation runs first, so `datetime` itself is a valid index
/// column name.
pub fn prepare(frame: DataFrame, options: &LoadOptions) -> Result<LoadedTable> {
    let frame = match options.parse_dates.as_deref() {
        Some(names) if !names.is_empty() => consolidate_datetime(frame, names)?,
        _ => frame,
    };
    split_index(frame, options.index.as_deref())
}

/// Replace the named columns with one parsed `datetime` column at the front.
fn consolidate_datetime(frame: DataFrame, names: &[String]) -> Result<DataFrame> {
    for name in names {
        if frame.get_column_index(name).is_none() {
            return Err(DataError::UnknownColumn { name: name.clone() });
        }
    }

    let parsed = if let [single] = names {
        match frame.column(single)?.dtype() {
            DataType::Date | DataType::Datetime(_, _) => {
                col(single.as_str()).cast(DataType::Datetime(TimeUnit::Microseconds, None))
            }
            DataType::String => string_to_datetime(col(single.as_str())),
            other => {
                return Err(DataError::Parse(format!(
                    "cannot parse column {single} (dtype {other}) as datetime"
                )));
            }
        }
    } else {
        let parts: Vec<Expr> = names.iter().map(|n| col(n.as_str())).collect();
        string_to_datetime(concat_str(parts, " ", true))
    };

    // Consolidated column goes first, the source columns are dropped.
    let mut order = vec![col(DATETIME_COLUMN)];
    for name in frame.get_column_names() {
        if !names.iter().any(|n| n == name.as_str()) {
            order.push(col(name.clone()));
        }
    }

    Ok(frame
        .lazy()
        .with_column(parsed.alias(DATETIME_COLUMN))
        .select(order)
        .collect()?)
}

fn string_to_datetime(expr: Expr) -> Expr {
    expr.str().to_datetime(
        Some(TimeUnit::Microseconds),
        None,
        StrptimeOptions {
            strict: false,
            ..Default::default()
        },
        lit("raise"),
    )
}

fn split_index(frame: DataFrame, index: Option<&[String]>) -> Result<LoadedTable> {
    let Some(names) = index.filter(|names| !names.is_empty()) else {
        return Ok(LoadedTable { frame, index: None });
    };
    let index_frame = select_columns(&frame, names)?;
    let keep: Vec<&str> = frame
        .get_column_names()
        .iter()
        .map(|n| n.as_str())
        .filter(|n| !names.iter().any(|name| name == n))
        .collect();
    let frame = frame.select(keep)?;
    Ok(LoadedTable {
        frame,
        index: Some(index_frame),
    })
}
