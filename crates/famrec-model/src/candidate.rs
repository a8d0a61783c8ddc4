//! Canonical records produced from the two source datasets.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::row::RawRow;

/// One benefit-registry row after normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenefitCandidate {
    pub line: usize,
    pub guardian_name: String,
    pub guardian_birthdate: Option<NaiveDate>,
    pub guardian_nid: String,
    pub dependent_name: String,
    pub dependent_birthdate: Option<NaiveDate>,
    pub dependent_nid: String,
    pub family_code: Option<String>,
    pub household_size: Option<u32>,
    /// Verbatim source row, kept for the audit trail. Never text-folded.
    #[serde(skip)]
    pub source: RawRow,
}

impl BenefitCandidate {
    pub fn key(&self) -> BenefitKey {
        BenefitKey {
            guardian_nid: self.guardian_nid.clone(),
            dependent_nid: self.dependent_nid.clone(),
        }
    }
}

/// Natural key of the benefit dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BenefitKey {
    pub guardian_nid: String,
    pub dependent_nid: String,
}

/// One school-enrollment row after normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentCandidate {
    pub line: usize,
    pub student_name: String,
    pub student_birthdate: Option<NaiveDate>,
    pub mother_name: String,
    pub father_name: String,
    pub responsible_name: String,
    pub enrollment_id: String,
}

impl EnrollmentCandidate {
    pub fn key(&self) -> EnrollmentKey {
        EnrollmentKey {
            student_name: self.student_name.clone(),
            enrollment_id: self.enrollment_id.clone(),
        }
    }

    /// Name recorded for `role`; empty when the school left it blank.
    pub fn guardian(&self, role: GuardianRole) -> &str {
        match role {
            GuardianRole::Mother => &self.mother_name,
            GuardianRole::Responsible => &self.responsible_name,
            GuardianRole::Father => &self.father_name,
        }
    }

    /// Non-blank guardian names in resolution priority order.
    pub fn guardians(&self) -> impl Iterator<Item = (GuardianRole, &str)> {
        GuardianRole::PRIORITY
            .into_iter()
            .map(|role| (role, self.guardian(role)))
            .filter(|(_, name)| !name.trim().is_empty())
    }
}

/// Natural key of the enrollment dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnrollmentKey {
    pub student_name: String,
    pub enrollment_id: String,
}

/// Guardian slots recorded by the school registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardianRole {
    Mother,
    Responsible,
    Father,
}

impl GuardianRole {
    /// Order in which competing claimants are tried.
    pub const PRIORITY: [GuardianRole; 3] = [
        GuardianRole::Mother,
        GuardianRole::Responsible,
        GuardianRole::Father,
    ];
}

impl std::fmt::Display for GuardianRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mother => write!(f, "mother"),
            Self::Responsible => write!(f, "responsible"),
            Self::Father => write!(f, "father"),
        }
    }
}
