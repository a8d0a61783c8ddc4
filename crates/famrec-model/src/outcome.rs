//! Terminal decisions for benefit candidates and the accepted aggregates.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::candidate::GuardianRole;
use crate::row::RawRow;

/// Dependent attributed to a guardian in an accepted [`Grant`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantedDependent {
    pub nid: String,
    pub name: String,
    pub birthdate: Option<NaiveDate>,
    pub enrollment_id: String,
    /// Role under which the school registry recognises the guardian.
    pub recognised_as: GuardianRole,
}

/// Guardian plus the dependents accepted for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    pub guardian_nid: String,
    pub guardian_name: String,
    pub guardian_birthdate: Option<NaiveDate>,
    pub family_code: Option<String>,
    pub household_size: Option<u32>,
    pub dependents: Vec<GrantedDependent>,
}

impl Grant {
    pub fn has_dependent(&self, nid: &str) -> bool {
        self.dependents.iter().any(|dependent| dependent.nid == nid)
    }
}

/// Why a candidate was judged overage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverageSource {
    /// Benefit-registry birthdate.
    Registry,
    /// School-enrollment birthdate of the matched student.
    Enrollment,
    /// The birthdate needed for the check is missing or unparseable.
    UnknownBirthdate,
}

/// Outcome of reconciling a single benefit candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MatchOutcome {
    Accepted(GrantedDependent),
    RejectedOverage { source: OverageSource },
    RejectedNoMatch,
    RejectedWrongGuardian { found_guardian: String },
    RejectedDuplicateLoser { winner: String },
}

impl MatchOutcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Self::Accepted(_) => OutcomeKind::Accepted,
            Self::RejectedOverage { .. } => OutcomeKind::RejectedOverage,
            Self::RejectedNoMatch => OutcomeKind::RejectedNoMatch,
            Self::RejectedWrongGuardian { .. } => OutcomeKind::RejectedWrongGuardian,
            Self::RejectedDuplicateLoser { .. } => OutcomeKind::RejectedDuplicateLoser,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    /// Human-readable audit reason; `None` for accepted candidates.
    pub fn rejection_reason(&self) -> Option<String> {
        match self {
            Self::Accepted(_) => None,
            Self::RejectedOverage {
                source: OverageSource::Registry,
            } => Some("dependent is of age".to_string()),
            Self::RejectedOverage {
                source: OverageSource::Enrollment,
            } => Some("dependent is of age according to the school enrollment".to_string()),
            Self::RejectedOverage {
                source: OverageSource::UnknownBirthdate,
            } => Some("dependent birthdate is missing or invalid".to_string()),
            Self::RejectedNoMatch => Some("dependent not found in the school enrollment".to_string()),
            Self::RejectedWrongGuardian { found_guardian } => Some(format!(
                "dependent is enrolled under a different guardian: {found_guardian}"
            )),
            Self::RejectedDuplicateLoser { winner } => Some(format!(
                "dependent is claimed by more than one guardian; school enrollment recognises {winner}"
            )),
        }
    }
}

/// Discriminant of [`MatchOutcome`], used for counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Accepted,
    RejectedOverage,
    RejectedNoMatch,
    RejectedWrongGuardian,
    RejectedDuplicateLoser,
}

impl std::fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Accepted => write!(f, "accepted"),
            Self::RejectedOverage => write!(f, "rejected_overage"),
            Self::RejectedNoMatch => write!(f, "rejected_no_match"),
            Self::RejectedWrongGuardian => write!(f, "rejected_wrong_guardian"),
            Self::RejectedDuplicateLoser => write!(f, "rejected_duplicate_loser"),
        }
    }
}

/// Audit entry for a row that did not make it into a grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionRecord {
    pub row: RawRow,
    pub reason: String,
}

impl RejectionRecord {
    pub fn new(row: RawRow, reason: impl Into<String>) -> Self {
        Self {
            row,
            reason: reason.into(),
        }
    }
}
