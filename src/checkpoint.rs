//! Durable output: full rewrites of everything collected so far.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::ChartRecord;

/// Output header, in column order.
pub const COLUMNS: [&str; 4] = ["date_week", "title", "artist", "weekly_streams"];

#[derive(Error, Debug)]
pub enum CheckpointError {
    #[error("Checkpoint I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Checkpoint CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizeOutcome {
    Written(usize),
    /// Nothing was collected; no file was written.
    Empty,
}

#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
    every: usize,
}

impl CheckpointStore {
    pub fn new(path: impl Into<PathBuf>, every: usize) -> Self {
        Self {
            path: path.into(),
            every,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True after every `every`-th completed iteration. `every == 0` disables
    /// periodic flushing.
    pub fn is_due(&self, completed_iterations: usize) -> bool {
        self.every > 0 && completed_iterations > 0 && completed_iterations % self.every == 0
    }

    /// Overwrite the output with all of `records`. Missing stream counts are
    /// written as empty fields.
    pub fn flush(&self, records: &[ChartRecord]) -> Result<usize, CheckpointError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&self.path)?;
        writer.write_record(COLUMNS)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        info!("Saved progress at {} rows.", records.len());
        Ok(records.len())
    }

    /// End-of-run save. Skips writing when nothing was collected so an empty
    /// file never looks like a successful run.
    pub fn finalize(&self, records: &[ChartRecord]) -> Result<FinalizeOutcome, CheckpointError> {
        if records.is_empty() {
            warn!("No records collected, not writing {}", self.path.display());
            return Ok(FinalizeOutcome::Empty);
        }
        let written = self.flush(records)?;
        info!(
            "Success, saved CSV with {} rows to {}",
            written,
            self.path.display()
        );
        Ok(FinalizeOutcome::Written(written))
    }
}

/// Load a checkpoint file back into records.
pub fn read_records(path: &Path) -> Result<Vec<ChartRecord>, CheckpointError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for row in reader.deserialize() {
        records.push(row?);
    }
    Ok(records)
}
