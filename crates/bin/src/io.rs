//! Shared dataset loading and result export for the subcommands.
//!
//! Every subcommand reads one CSV table, runs its operation, and hands the
//! resulting frame back through [`IoArgs::write`], which re-attaches any
//! split-off index columns and serializes to the requested format.

use std::path::PathBuf;

use albany::data::{DataError, LoadOptions, LoadedTable, load_csv};
use albany::output::{ExportError, ExportFormat, Orient, export_to_file, export_to_string};
use clap::{Args, ValueEnum};
use polars::prelude::*;

/// Input and output arguments shared by every subcommand.
#[derive(Args)]
pub(crate) struct IoArgs {
    /// Path to the input dataset
    #[arg(short = 'd', long)]
    pub(crate) dataset: PathBuf,

    /// Path of the output file; stdout when absent
    #[arg(short = 'f', long)]
    pub(crate) file_out: Option<PathBuf>,

    /// JSON layout of the output
    #[arg(short = 'o', long, default_value = "columns")]
    pub(crate) orient: OrientArg,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub(crate) pretty: bool,

    /// Write CSV instead of JSON
    #[arg(long, conflicts_with_all = ["pretty", "orient"])]
    pub(crate) csv: bool,

    /// Columns to parse into the consolidated datetime column
    #[arg(long, visible_alias = "pd", num_args = 0.., value_name = "COLUMN")]
    pub(crate) parse_dates: Option<Vec<String>>,

    /// Columns set aside as row labels and re-attached on output
    #[arg(short = 'i', long, num_args = 0.., value_name = "COLUMN")]
    pub(crate) index: Option<Vec<String>>,
}

/// Column restriction shared by the statistics subcommands.
#[derive(Args)]
pub(crate) struct SelectArgs {
    /// Columns to compute over; every column when absent
    #[arg(long, visible_alias = "hd", num_args = 0.., value_name = "COLUMN")]
    pub(crate) headers: Option<Vec<String>>,
}

/// JSON layout names accepted by `--orient`.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum OrientArg {
    Columns,
    Records,
    Index,
    Values,
    Split,
}

impl From<OrientArg> for Orient {
    fn from(value: OrientArg) -> Self {
        match value {
            OrientArg::Columns => Self::Columns,
            OrientArg::Records => Self::Records,
            OrientArg::Index => Self::Index,
            OrientArg::Values => Self::Values,
            OrientArg::Split => Self::Split,
        }
    }
}

impl IoArgs {
    /// Load the dataset with the date and index options applied.
    pub(crate) fn load(&self) -> Result<LoadedTable, DataError> {
        let options = LoadOptions {
            parse_dates: self.parse_dates.clone(),
            index: self.index.clone(),
        };
        load_csv(&self.dataset, &options)
    }

    /// Export the result to the output file, or print it to stdout.
    pub(crate) fn write(
        &self,
        index: Option<DataFrame>,
        result: DataFrame,
    ) -> Result<(), ExportError> {
        let frame = attach_index(index, result)?;
        match &self.file_out {
            Some(path) => export_to_file(&frame, self.format(), path),
            None => {
                println!("{}", export_to_string(&frame, self.format())?);
                Ok(())
            }
        }
    }

    fn format(&self) -> ExportFormat {
        if self.csv {
            ExportFormat::Csv
        } else if self.pretty {
            ExportFormat::PrettyJson(self.orient.into())
        } else {
            ExportFormat::Json(self.orient.into())
        }
    }
}

/// Index labels lead the output when the operation kept one row per input
/// row; aggregated shapes (describe, correlate, acf) leave them off.
fn attach_index(index: Option<DataFrame>, result: DataFrame) -> PolarsResult<DataFrame> {
    match index {
        Some(labels) if labels.height() == result.height() => {
            let mut columns = labels.get_columns().to_vec();
            columns.extend(result.get_columns().iter().cloned());
            DataFrame::new(columns)
        }
        _ => Ok(result),
    }
}
