//! File-backed sinks.
//!
//! Both writers flush after every record so that a failed run leaves a
//! complete prefix of its output on disk.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::trace;

use famrec_core::{AuditSink, GrantSink, SinkError};
use famrec_model::{Grant, RejectionRecord};

use crate::logging::redact_value;

/// Audit column carrying the rejection reason.
pub const REASON_COLUMN: &str = "motivo";

/// Writes one JSON object per grant.
///
/// The file is truncated on creation and the pipeline emits one grant per
/// guardian, so each guardian national ID appears on exactly one line.
pub struct JsonlGrantWriter<W: Write> {
    writer: W,
    written: usize,
}

impl JsonlGrantWriter<BufWriter<File>> {
    pub fn create(path: &Path) -> std::io::Result<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> JsonlGrantWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> GrantSink for JsonlGrantWriter<W> {
    async fn upsert(&mut self, grant: &Grant) -> Result<(), SinkError> {
        serde_json::to_writer(&mut self.writer, grant).map_err(SinkError::other)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        self.written += 1;
        trace!(
            guardian = redact_value(&grant.guardian_name),
            guardian_nid = redact_value(&grant.guardian_nid),
            dependents = grant.dependents.len(),
            "grant written"
        );
        Ok(())
    }
}

/// Grant sink for dry runs: counts grants and drops them.
#[derive(Debug, Default)]
pub struct DiscardGrants {
    pub discarded: usize,
}

impl GrantSink for DiscardGrants {
    async fn upsert(&mut self, _grant: &Grant) -> Result<(), SinkError> {
        self.discarded += 1;
        Ok(())
    }
}

/// Rejection audit as CSV: the source columns followed by [`REASON_COLUMN`].
pub struct CsvAuditWriter<W: Write> {
    writer: csv::Writer<W>,
    columns: Vec<String>,
}

impl CsvAuditWriter<File> {
    pub fn create(path: &Path, delimiter: u8, columns: &[String]) -> Result<Self, SinkError> {
        let file = File::create(path)?;
        Self::new(file, delimiter, columns)
    }
}

impl<W: Write> CsvAuditWriter<W> {
    /// Writes the header row immediately, so an import without rejections
    /// still leaves a well-formed file.
    pub fn new(writer: W, delimiter: u8, columns: &[String]) -> Result<Self, SinkError> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(writer);
        writer
            .write_record(columns.iter().map(String::as_str).chain([REASON_COLUMN]))
            .map_err(SinkError::other)?;
        writer.flush()?;
        Ok(Self {
            writer,
            columns: columns.to_vec(),
        })
    }

    pub fn into_inner(self) -> Result<W, SinkError> {
        self.writer
            .into_inner()
            .map_err(|error| SinkError::Io(error.into_error()))
    }
}

impl<W: Write + Send> AuditSink for CsvAuditWriter<W> {
    async fn append(&mut self, record: &RejectionRecord) -> Result<(), SinkError> {
        let values = self
            .columns
            .iter()
            .map(|column| record.row.get(column).unwrap_or_default());
        self.writer
            .write_record(values.chain([record.reason.as_str()]))
            .map_err(SinkError::other)?;
        self.writer.flush()?;
        trace!(
            line = record.row.line,
            reason = redact_value(&record.reason),
            "rejection written"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use famrec_model::{GrantedDependent, GuardianRole, RawRow};

    use super::*;

    fn grant() -> Grant {
        Grant {
            guardian_nid: "111".to_string(),
            guardian_name: "MARIA SILVA".to_string(),
            guardian_birthdate: None,
            family_code: Some("F1".to_string()),
            household_size: Some(3),
            dependents: vec![GrantedDependent {
                nid: "900".to_string(),
                name: "JOAO SILVA".to_string(),
                birthdate: None,
                enrollment_id: "M-1".to_string(),
                recognised_as: GuardianRole::Mother,
            }],
        }
    }

    #[tokio::test]
    async fn grants_are_written_one_per_line() {
        let mut sink = JsonlGrantWriter::new(Vec::new());
        sink.upsert(&grant()).await.expect("write");
        sink.upsert(&grant()).await.expect("write");
        assert_eq!(sink.written(), 2);
        let text = String::from_utf8(sink.into_inner()).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: Grant = serde_json::from_str(lines[0]).expect("json line");
        assert_eq!(parsed, grant());
    }

    #[tokio::test]
    async fn audit_keeps_source_columns_and_reason() {
        let columns = vec!["Responsavel".to_string(), "Dependente".to_string()];
        let mut sink = CsvAuditWriter::new(Vec::new(), b';', &columns).expect("header");
        let row = RawRow::new(
            2,
            vec![
                ("Responsavel".to_string(), "Inês".to_string()),
                ("Dependente".to_string(), "Gonçalo".to_string()),
            ],
        );
        sink.append(&RejectionRecord::new(row, "dependent is of age"))
            .await
            .expect("append");
        let text = String::from_utf8(sink.into_inner().expect("flush")).expect("utf8");
        assert_eq!(
            text,
            "Responsavel;Dependente;motivo\nInês;Gonçalo;dependent is of age\n"
        );
    }

    #[tokio::test]
    async fn dry_run_discards_grants() {
        let mut sink = DiscardGrants::default();
        sink.upsert(&grant()).await.expect("discard");
        assert_eq!(sink.discarded, 1);
    }
}
