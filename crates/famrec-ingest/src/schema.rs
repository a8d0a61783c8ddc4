//! Source column names and the required-column check.

use serde::{Deserialize, Serialize};

use famrec_model::RawRow;

use crate::error::{IngestError, Result};

/// The two source datasets an import cross-references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    Benefits,
    Enrollment,
}

impl Dataset {
    /// Every column the normalizer reads, in conventional file order.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Self::Benefits => &[
                benefit_columns::GUARDIAN_NAME,
                benefit_columns::GUARDIAN_BIRTHDATE,
                benefit_columns::GUARDIAN_NID,
                benefit_columns::DEPENDENT_NAME,
                benefit_columns::DEPENDENT_BIRTHDATE,
                benefit_columns::DEPENDENT_NID,
                benefit_columns::FAMILY_CODE,
                benefit_columns::HOUSEHOLD_SIZE,
            ],
            Self::Enrollment => self.required_columns(),
        }
    }

    pub fn is_required(self, column: &str) -> bool {
        self.required_columns().iter().any(|required| *required == column)
    }

    /// Columns that must be present in the first row.
    pub fn required_columns(self) -> &'static [&'static str] {
        match self {
            Self::Benefits => &[
                benefit_columns::GUARDIAN_NAME,
                benefit_columns::GUARDIAN_NID,
                benefit_columns::DEPENDENT_NAME,
                benefit_columns::DEPENDENT_BIRTHDATE,
                benefit_columns::DEPENDENT_NID,
            ],
            Self::Enrollment => &[
                enrollment_columns::STUDENT_NAME,
                enrollment_columns::STUDENT_BIRTHDATE,
                enrollment_columns::MOTHER_NAME,
                enrollment_columns::FATHER_NAME,
                enrollment_columns::RESPONSIBLE_NAME,
                enrollment_columns::ENROLLMENT_ID,
            ],
        }
    }
}

impl std::fmt::Display for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Benefits => write!(f, "benefit registry"),
            Self::Enrollment => write!(f, "school enrollment"),
        }
    }
}

/// Benefit-registry column names.
pub mod benefit_columns {
    pub const GUARDIAN_NAME: &str = "Responsavel";
    pub const GUARDIAN_BIRTHDATE: &str = "DataNascimentoResponsavel";
    pub const GUARDIAN_NID: &str = "NisResponsavel";
    pub const DEPENDENT_NAME: &str = "Dependente";
    pub const DEPENDENT_BIRTHDATE: &str = "DataNascimentoDependente";
    pub const DEPENDENT_NID: &str = "NisDependente";
    pub const FAMILY_CODE: &str = "CodigoFamiliar";
    pub const HOUSEHOLD_SIZE: &str = "QtdPessoas";
}

/// School-enrollment column names.
pub mod enrollment_columns {
    pub const STUDENT_NAME: &str = "Aluno";
    pub const STUDENT_BIRTHDATE: &str = "DataNascimento";
    pub const MOTHER_NAME: &str = "Mae";
    pub const FATHER_NAME: &str = "Pai";
    pub const RESPONSIBLE_NAME: &str = "Responsavel";
    pub const ENROLLMENT_ID: &str = "Matricula";
}

/// Checks a representative row for every required column of `dataset`.
///
/// Runs once per dataset before any row is converted; a failure aborts the
/// whole import.
pub fn check_required_columns(dataset: Dataset, first_row: &RawRow) -> Result<()> {
    check_available(dataset, first_row.columns())
}

/// Same check against the header line, for sources with no data rows.
pub fn check_required_headers(dataset: Dataset, headers: &[String]) -> Result<()> {
    check_available(dataset, headers.iter().map(String::as_str))
}

fn check_available<'a>(dataset: Dataset, columns: impl Iterator<Item = &'a str>) -> Result<()> {
    let available: Vec<String> = columns.map(str::to_string).collect();
    let missing: Vec<String> = dataset
        .required_columns()
        .iter()
        .filter(|column| !available.iter().any(|name| name == *column))
        .map(|column| (*column).to_string())
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    Err(IngestError::MissingColumns {
        dataset,
        missing,
        available,
    })
}
