//! Ingestion for the family reconciliation import: CSV row sources, the
//! required-column check, row normalization and diacritic folding.

pub mod csv_rows;
pub mod error;
pub mod normalize;
pub mod schema;
pub mod text;

pub use csv_rows::{CsvOptions, CsvRowReader};
pub use error::{IngestError, Result};
pub use normalize::{
    DEFAULT_DATE_FORMAT, NormalizedBenefits, normalize_benefit_row, normalize_benefits,
    normalize_enrollment_row, normalize_enrollments, parse_date, parse_nid,
};
pub use schema::{
    Dataset, benefit_columns, check_required_columns, check_required_headers, enrollment_columns,
};
pub use text::{fold_dataset, fold_diacritics};
