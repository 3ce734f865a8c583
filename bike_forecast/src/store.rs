//! Narrow persistence boundary: whole tables in and out of CSV files.
//!
//! The pipeline reads and writes each table once per batch. Failures are
//! fatal to the run and carry the target identifier; nothing here retries.

use crate::error::{PipelineError, Result};
use polars::prelude::*;
use std::fs::{File, OpenOptions};
use std::path::Path;
use tracing::info;

/// How a write treats an existing destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Overwrite wholesale; re-running on unchanged input is byte-identical
    Replace,
    /// Extend an existing table, writing the header only on creation
    Append,
}

/// Read a whole table from a CSV file.
pub fn read_table<P: AsRef<Path>>(path: P) -> Result<DataFrame> {
    let target = path.as_ref().display().to_string();
    let file = File::open(path.as_ref()).map_err(|err| persistence(&target, err))?;

    CsvReader::new(file)
        .infer_schema(None)
        .has_header(true)
        .finish()
        .map_err(|err| persistence(&target, err))
}

/// Persist a whole table to a CSV file.
pub fn write_table<P: AsRef<Path>>(df: &mut DataFrame, path: P, mode: WriteMode) -> Result<()> {
    let target = path.as_ref().display().to_string();

    match mode {
        WriteMode::Replace => {
            let mut file = File::create(path.as_ref()).map_err(|err| persistence(&target, err))?;
            CsvWriter::new(&mut file)
                .has_header(true)
                .finish(df)
                .map_err(|err| persistence(&target, err))?;
        }
        WriteMode::Append => {
            let exists = path.as_ref().exists();
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path.as_ref())
                .map_err(|err| persistence(&target, err))?;
            CsvWriter::new(&mut file)
                .has_header(!exists)
                .finish(df)
                .map_err(|err| persistence(&target, err))?;
        }
    }

    info!(%target, rows = df.height(), "table written");
    Ok(())
}

fn persistence(target: &str, err: impl std::fmt::Display) -> PipelineError {
    PipelineError::Persistence {
        target: target.to_string(),
        reason: err.to_string(),
    }
}
