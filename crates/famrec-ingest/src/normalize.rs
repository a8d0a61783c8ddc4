//! Row Normalizer: raw rows to canonical candidates.
//!
//! Conversion is per row; diacritic folding runs afterwards over the whole
//! converted dataset (see [`crate::text::fold_dataset`]).

use chrono::NaiveDate;
use tracing::{debug, warn};

use famrec_model::{BenefitCandidate, EnrollmentCandidate, RawRow, RejectionRecord};

use crate::error::{IngestError, Result};
use crate::schema::{Dataset, benefit_columns, enrollment_columns};
use crate::text::fold_dataset;

/// Default birthdate format of both registries (day/month/year).
pub const DEFAULT_DATE_FORMAT: &str = "%d/%m/%Y";

/// Parses a birthdate; unparseable or blank values yield `None`.
///
/// A trailing time component (`"15/03/2010 00:00:00"`) is ignored.
pub fn parse_date(value: &str, format: &str) -> Option<NaiveDate> {
    let date_part = value.split_whitespace().next()?;
    NaiveDate::parse_from_str(date_part, format).ok()
}

/// Strips `.`, `-` and spaces from a national ID and checks it is numeric.
pub fn parse_nid(value: &str, column: &str, line: usize) -> Result<String> {
    let digits: String = value
        .chars()
        .filter(|ch| !matches!(ch, '.' | '-' | ' '))
        .collect();
    if digits.is_empty() {
        return Err(IngestError::Row {
            line,
            reason: format!("{column} is blank"),
        });
    }
    if !digits.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(IngestError::Row {
            line,
            reason: format!("{column} is not a valid national ID: {value}"),
        });
    }
    Ok(digits)
}

fn parse_household_size(row: &RawRow) -> Result<Option<u32>> {
    let Some(value) = row.get_non_empty(benefit_columns::HOUSEHOLD_SIZE) else {
        return Ok(None);
    };
    value.parse::<u32>().map(Some).map_err(|_| IngestError::Row {
        line: row.line,
        reason: format!(
            "{} is not a whole number: {value}",
            benefit_columns::HOUSEHOLD_SIZE
        ),
    })
}

fn text(row: &RawRow, column: &str) -> String {
    row.get(column).map(str::trim).unwrap_or_default().to_string()
}

/// Converts a benefit-registry row.
pub fn normalize_benefit_row(row: &RawRow, date_format: &str) -> Result<BenefitCandidate> {
    let guardian_nid = parse_nid(
        row.get(benefit_columns::GUARDIAN_NID).unwrap_or_default(),
        benefit_columns::GUARDIAN_NID,
        row.line,
    )?;
    let dependent_nid = parse_nid(
        row.get(benefit_columns::DEPENDENT_NID).unwrap_or_default(),
        benefit_columns::DEPENDENT_NID,
        row.line,
    )?;
    Ok(BenefitCandidate {
        line: row.line,
        guardian_name: text(row, benefit_columns::GUARDIAN_NAME),
        guardian_birthdate: row
            .get(benefit_columns::GUARDIAN_BIRTHDATE)
            .and_then(|value| parse_date(value, date_format)),
        guardian_nid,
        dependent_name: text(row, benefit_columns::DEPENDENT_NAME),
        dependent_birthdate: row
            .get(benefit_columns::DEPENDENT_BIRTHDATE)
            .and_then(|value| parse_date(value, date_format)),
        dependent_nid,
        family_code: row
            .get_non_empty(benefit_columns::FAMILY_CODE)
            .map(str::to_string),
        household_size: parse_household_size(row)?,
        source: row.clone(),
    })
}

/// Converts a school-enrollment row. Never fails: dates degrade to `None`.
pub fn normalize_enrollment_row(row: &RawRow, date_format: &str) -> EnrollmentCandidate {
    EnrollmentCandidate {
        line: row.line,
        student_name: text(row, enrollment_columns::STUDENT_NAME),
        student_birthdate: row
            .get(enrollment_columns::STUDENT_BIRTHDATE)
            .and_then(|value| parse_date(value, date_format)),
        mother_name: text(row, enrollment_columns::MOTHER_NAME),
        father_name: text(row, enrollment_columns::FATHER_NAME),
        responsible_name: text(row, enrollment_columns::RESPONSIBLE_NAME),
        enrollment_id: text(row, enrollment_columns::ENROLLMENT_ID),
    }
}

/// Converted benefit dataset plus the rows that failed conversion.
#[derive(Debug, Default)]
pub struct NormalizedBenefits {
    pub candidates: Vec<BenefitCandidate>,
    pub rejected: Vec<RejectionRecord>,
}

/// Converts and folds the whole benefit dataset.
///
/// Rows that fail conversion become rejection records in input order; they
/// never abort the import.
pub fn normalize_benefits(rows: Vec<RawRow>, date_format: &str) -> Result<NormalizedBenefits> {
    let mut candidates = Vec::with_capacity(rows.len());
    let mut rejected = Vec::new();
    for row in rows {
        match normalize_benefit_row(&row, date_format) {
            Ok(candidate) => candidates.push(candidate),
            Err(IngestError::Row { line, reason }) => {
                warn!(line, %reason, "benefit row rejected during conversion");
                rejected.push(RejectionRecord::new(row, reason));
            }
            Err(other) => return Err(other),
        }
    }
    let mut folded = fold_dataset(Dataset::Benefits, &candidates)?;
    for (target, original) in folded.iter_mut().zip(candidates) {
        target.source = original.source;
    }
    debug!(
        candidates = folded.len(),
        rejected = rejected.len(),
        "benefit rows normalized"
    );
    Ok(NormalizedBenefits {
        candidates: folded,
        rejected,
    })
}

/// Converts and folds the whole enrollment dataset.
pub fn normalize_enrollments(
    rows: &[RawRow],
    date_format: &str,
) -> Result<Vec<EnrollmentCandidate>> {
    let converted: Vec<EnrollmentCandidate> = rows
        .iter()
        .map(|row| normalize_enrollment_row(row, date_format))
        .collect();
    let folded = fold_dataset(Dataset::Enrollment, &converted)?;
    debug!(candidates = folded.len(), "enrollment rows normalized");
    Ok(folded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn benefit_row(line: usize, values: &[(&str, &str)]) -> RawRow {
        RawRow::new(
            line,
            values
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        )
    }

    #[test]
    fn parses_day_month_year() {
        assert_eq!(
            parse_date("15/03/2010", DEFAULT_DATE_FORMAT),
            NaiveDate::from_ymd_opt(2010, 3, 15)
        );
        assert_eq!(
            parse_date("15/03/2010 00:00:00", DEFAULT_DATE_FORMAT),
            NaiveDate::from_ymd_opt(2010, 3, 15)
        );
        assert_eq!(parse_date("2010-03-15", DEFAULT_DATE_FORMAT), None);
        assert_eq!(parse_date("", DEFAULT_DATE_FORMAT), None);
    }

    #[test]
    fn national_id_punctuation_is_removed() {
        assert_eq!(parse_nid("123.456.789-0", "NisResponsavel", 2).unwrap(), "1234567890");
        assert!(parse_nid("12A", "NisResponsavel", 2).is_err());
        assert!(parse_nid(" ", "NisResponsavel", 2).is_err());
    }

    #[test]
    fn bad_household_size_rejects_row_but_bad_date_does_not() {
        let rows = vec![
            benefit_row(
                2,
                &[
                    ("Responsavel", "Maria"),
                    ("NisResponsavel", "1"),
                    ("Dependente", "João"),
                    ("DataNascimentoDependente", "not a date"),
                    ("NisDependente", "2"),
                ],
            ),
            benefit_row(
                3,
                &[
                    ("Responsavel", "Maria"),
                    ("NisResponsavel", "1"),
                    ("Dependente", "Ana"),
                    ("DataNascimentoDependente", "01/01/2015"),
                    ("NisDependente", "3"),
                    ("QtdPessoas", "três"),
                ],
            ),
        ];
        let normalized = normalize_benefits(rows, DEFAULT_DATE_FORMAT).expect("normalize");
        assert_eq!(normalized.candidates.len(), 1);
        assert_eq!(normalized.candidates[0].dependent_birthdate, None);
        assert_eq!(normalized.rejected.len(), 1);
        assert_eq!(normalized.rejected[0].row.line, 3);
        assert!(normalized.rejected[0].reason.contains("QtdPessoas"));
    }

    #[test]
    fn folding_keeps_source_row_verbatim() {
        let rows = vec![benefit_row(
            2,
            &[
                ("Responsavel", "Conceição"),
                ("NisResponsavel", "1"),
                ("Dependente", "João"),
                ("DataNascimentoDependente", "01/01/2015"),
                ("NisDependente", "2"),
            ],
        )];
        let normalized = normalize_benefits(rows, DEFAULT_DATE_FORMAT).expect("normalize");
        let candidate = &normalized.candidates[0];
        assert_eq!(candidate.guardian_name, "Conceicao");
        assert_eq!(candidate.dependent_name, "Joao");
        assert_eq!(candidate.source.get("Responsavel"), Some("Conceição"));
    }
}
