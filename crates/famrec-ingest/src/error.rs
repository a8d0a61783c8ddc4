//! Ingestion error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::schema::Dataset;

#[derive(Debug, Error)]
pub enum IngestError {
    /// Source file could not be opened.
    #[error("failed to open {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Source could not be read or decoded as CSV.
    #[error("failed to read {dataset} data")]
    Csv {
        dataset: Dataset,
        #[source]
        source: csv::Error,
    },

    /// First row of a dataset lacks one or more required columns.
    #[error(
        "{dataset} data is missing required columns: {} (available: {})",
        missing.join(", "),
        available.join(", ")
    )]
    MissingColumns {
        dataset: Dataset,
        missing: Vec<String>,
        available: Vec<String>,
    },

    /// A row could not be converted into a candidate.
    #[error("line {line}: {reason}")]
    Row { line: usize, reason: String },

    /// Whole-dataset text folding failed to round-trip.
    #[error("failed to fold text in {dataset} data")]
    Serialization {
        dataset: Dataset,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, IngestError>;
