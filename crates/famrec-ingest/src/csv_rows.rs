//! Pull-based CSV row source.
//!
//! Rows are produced lazily, one per call to `next`, so large extracts are
//! never materialised before the pipeline asks for them. A reader is
//! finite and can only be restarted by opening the source again.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ByteRecord, ByteRecordsIntoIter, ReaderBuilder};

use famrec_model::RawRow;

use crate::error::{IngestError, Result};
use crate::schema::{Dataset, check_required_headers};

/// CSV dialect options.
#[derive(Debug, Clone, Copy)]
pub struct CsvOptions {
    pub delimiter: u8,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self { delimiter: b';' }
    }
}

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    let mut parts = trimmed.split_whitespace();
    let mut normalized = String::new();
    if let Some(first) = parts.next() {
        normalized.push_str(first);
        for part in parts {
            normalized.push(' ');
            normalized.push_str(part);
        }
    }
    normalized
}

fn normalize_cell(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .trim()
        .trim_matches('\u{feff}')
        .to_string()
}

/// Iterator over the data rows of one CSV source.
pub struct CsvRowReader<R: Read> {
    dataset: Dataset,
    headers: Vec<String>,
    records: ByteRecordsIntoIter<R>,
    fallback_line: usize,
    yielded: bool,
    exhausted: bool,
}

impl CsvRowReader<File> {
    /// Opens `path` as a `dataset` source.
    pub fn open(path: &Path, dataset: Dataset, options: CsvOptions) -> Result<Self> {
        let reader = builder(options)
            .from_path(path)
            .map_err(|source| IngestError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_csv(reader, dataset)
    }
}

impl<R: Read> CsvRowReader<R> {
    /// Wraps an arbitrary byte source.
    pub fn from_reader(reader: R, dataset: Dataset, options: CsvOptions) -> Result<Self> {
        Self::from_csv(builder(options).from_reader(reader), dataset)
    }

    fn from_csv(mut reader: csv::Reader<R>, dataset: Dataset) -> Result<Self> {
        let headers = reader
            .byte_headers()
            .map_err(|source| IngestError::Csv { dataset, source })?
            .iter()
            .map(|raw| normalize_header(&String::from_utf8_lossy(raw)))
            .collect();
        Ok(Self {
            dataset,
            headers,
            records: reader.into_byte_records(),
            fallback_line: 1,
            yielded: false,
            exhausted: false,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn dataset(&self) -> Dataset {
        self.dataset
    }

    fn to_row(&self, record: &ByteRecord) -> RawRow {
        let line = record
            .position()
            .map_or(self.fallback_line, |position| position.line() as usize);
        let fields = self
            .headers
            .iter()
            .enumerate()
            .map(|(idx, header)| {
                let value = record.get(idx).map(normalize_cell).unwrap_or_default();
                (header.clone(), value)
            })
            .collect();
        RawRow::new(line, fields)
    }
}

impl<R: Read> Iterator for CsvRowReader<R> {
    type Item = Result<RawRow>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        loop {
            let Some(next) = self.records.next() else {
                self.exhausted = true;
                // A source without data rows still has its header checked.
                if self.yielded {
                    return None;
                }
                return check_required_headers(self.dataset, &self.headers)
                    .err()
                    .map(Err);
            };
            let record = match next {
                Ok(record) => record,
                Err(source) => {
                    return Some(Err(IngestError::Csv {
                        dataset: self.dataset,
                        source,
                    }));
                }
            };
            self.fallback_line += 1;
            if record.iter().all(|value| normalize_cell(value).is_empty()) {
                continue;
            }
            self.yielded = true;
            return Some(Ok(self.to_row(&record)));
        }
    }
}

fn builder(options: CsvOptions) -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder
        .delimiter(options.delimiter)
        .has_headers(true)
        .flexible(true);
    builder
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_whitespace_is_collapsed() {
        assert_eq!(normalize_header("\u{feff} Data   Nascimento "), "Data Nascimento");
    }

    #[test]
    fn short_records_are_padded() {
        let data = "Aluno;Mae;Pai\nJOAO;MARIA\n";
        let mut reader =
            CsvRowReader::from_reader(data.as_bytes(), Dataset::Enrollment, CsvOptions::default())
                .expect("open reader");
        let row = reader.next().expect("row").expect("valid row");
        assert_eq!(row.get("Pai"), Some(""));
        assert_eq!(row.line, 2);
        assert!(reader.next().is_none());
    }

    #[test]
    fn header_only_source_is_checked_for_required_columns() {
        let data = "Mae;Pai;Responsavel;Matricula;DataNascimento\n";
        let mut reader =
            CsvRowReader::from_reader(data.as_bytes(), Dataset::Enrollment, CsvOptions::default())
                .expect("open reader");
        match reader.next() {
            Some(Err(IngestError::MissingColumns { missing, .. })) => {
                assert_eq!(missing, vec!["Aluno".to_string()]);
            }
            other => panic!("unexpected row: {other:?}"),
        }
        assert!(reader.next().is_none());
    }

    #[test]
    fn complete_header_without_rows_is_empty() {
        let data = "Aluno;DataNascimento;Mae;Pai;Responsavel;Matricula\n";
        let mut reader =
            CsvRowReader::from_reader(data.as_bytes(), Dataset::Enrollment, CsvOptions::default())
                .expect("open reader");
        assert!(reader.next().is_none());
    }
}
