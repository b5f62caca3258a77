//! Append-style persistence of committed result records over one CSV file.
//!
//! The physical store is a whole-file replace: existing rows are read,
//! the new rows appended, and the combined set written to a temp file in
//! the same directory before an atomic rename over the destination. That
//! removes the partial-write window; concurrent committers still race on
//! last-writer-wins, which is a documented limitation, not handled here.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// The persisted unit: one validated indicator value with its full context.
/// Field renames fix the exact output column names.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ResultRecord {
    #[serde(rename = "Project")]
    pub project: String,
    #[serde(rename = "Innovation")]
    pub innovation: String,
    #[serde(rename = "Indicator (PT)")]
    pub indicator_pt: String,
    #[serde(rename = "Indicator (model/reference)")]
    pub indicator_reference: String,
    #[serde(rename = "Description (model)")]
    pub model_description: String,
    #[serde(rename = "Measurement (model)")]
    pub model_measurement: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Reference Description")]
    pub reference_description: String,
    #[serde(rename = "Reference Measurement")]
    pub reference_measurement: String,
    #[serde(rename = "Normalized Value")]
    pub normalized_value: f64,
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to access results file {file}: {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read or write results file {file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },
}

/// The results store: a single CSV file, created on first commit.
pub struct ResultsStore {
    path: PathBuf,
}

impl ResultsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            file: self.path.display().to_string(),
            source,
        }
    }

    fn csv_err(&self, source: csv::Error) -> StoreError {
        StoreError::Csv {
            file: self.path.display().to_string(),
            source,
        }
    }

    /// Read every stored record. A missing file is an empty store; a
    /// present-but-unreadable file is an error, never silently dropped.
    pub fn load(&self) -> Result<Vec<ResultRecord>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut rdr = csv::Reader::from_path(&self.path).map_err(|e| self.csv_err(e))?;
        let mut records = Vec::new();
        for record in rdr.deserialize() {
            records.push(record.map_err(|e| self.csv_err(e))?);
        }
        debug!(count = records.len(), "results loaded");
        Ok(records)
    }

    /// Append `new_records` to the store: read-concatenate-rewrite with an
    /// atomic rename. Returns the total record count after the write.
    pub fn append(&self, new_records: &[ResultRecord]) -> Result<usize, StoreError> {
        let mut combined = self.load()?;
        combined.extend_from_slice(new_records);

        let tmp_path = self.path.with_extension("csv.tmp");
        {
            let mut wtr = csv::Writer::from_path(&tmp_path).map_err(|e| self.csv_err(e))?;
            for record in &combined {
                wtr.serialize(record).map_err(|e| self.csv_err(e))?;
            }
            wtr.flush().map_err(|e| self.io_err(e))?;
        }
        fs::rename(&tmp_path, &self.path).map_err(|e| self.io_err(e))?;

        info!(
            appended = new_records.len(),
            total = combined.len(),
            file = %self.path.display(),
            "results committed"
        );
        Ok(combined.len())
    }
}
