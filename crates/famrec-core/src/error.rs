//! Import error types.
//!
//! Every variant is fatal to the run. Row conversion problems never reach
//! this type: they are turned into rejection records by the normalizer.

use thiserror::Error;

use famrec_ingest::IngestError;

use crate::sink::SinkError;

/// Import run error.
#[derive(Debug, Error)]
pub enum ImportError {
    /// A dataset lacks required columns.
    #[error("schema validation failed")]
    Schema(#[source] IngestError),

    /// A row source failed while being read.
    #[error("failed to read import source")]
    Source(#[source] IngestError),

    /// Whole-dataset normalization failed.
    #[error("failed to normalize import data")]
    Normalization(#[source] IngestError),

    /// The grant sink rejected a write.
    #[error("failed to persist grant for guardian {guardian_nid}")]
    Persistence {
        guardian_nid: String,
        #[source]
        source: SinkError,
    },

    /// The audit sink rejected a rejection record.
    #[error("failed to write audit record for line {line}")]
    Audit {
        line: usize,
        #[source]
        source: SinkError,
    },
}

impl ImportError {
    /// Message suitable for the progress report and for end users.
    pub fn user_message(&self) -> String {
        match self {
            Self::Schema(source) => format!("The import file is not in the expected layout: {source}"),
            Self::Source(source) => format!("The import file could not be read: {source}"),
            Self::Normalization(source) => {
                format!("The import data could not be normalized: {source}")
            }
            Self::Persistence { source, .. } => {
                format!("A family record could not be saved: {source}")
            }
            Self::Audit { line, source } => {
                format!("The rejection for line {line} could not be recorded: {source}")
            }
        }
    }

    /// Hint for resolving the error, when one exists.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::Schema(_) => {
                Some("Check the header row and the column delimiter of the file.".into())
            }
            Self::Source(_) => Some("Check that the file exists and is a CSV export.".into()),
            Self::Normalization(_) => None,
            Self::Persistence { .. } | Self::Audit { .. } => Some(
                "Records written before the failure are kept; rerunning the import is safe."
                    .into(),
            ),
        }
    }
}

pub type Result<T> = std::result::Result<T, ImportError>;
