//! Eligibility Filter.

use chrono::{Datelike, NaiveDate};
use tracing::debug;

use famrec_model::{BenefitCandidate, MatchOutcome, OverageSource};

use crate::decision::Decision;

/// Default maximum age (exclusive) for a dependent.
pub const DEFAULT_AGE_LIMIT: u32 = 18;

/// Age classification of a birthdate against an [`AgePolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeStatus {
    Minor,
    Overage,
    /// Birthdate missing, unparseable, or after the reference date.
    Unknown,
}

/// Minority rule for one import run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgePolicy {
    /// First day of the processing month.
    pub reference: NaiveDate,
    pub age_limit: u32,
}

impl AgePolicy {
    pub fn new(as_of: NaiveDate, age_limit: u32) -> Self {
        Self {
            reference: start_of_month(as_of),
            age_limit,
        }
    }

    /// Completed years between `birthdate` and the reference date.
    pub fn age_of(&self, birthdate: NaiveDate) -> Option<u32> {
        self.reference.years_since(birthdate)
    }

    pub fn classify(&self, birthdate: Option<NaiveDate>) -> AgeStatus {
        match birthdate.and_then(|date| self.age_of(date)) {
            Some(age) if age < self.age_limit => AgeStatus::Minor,
            Some(_) => AgeStatus::Overage,
            None => AgeStatus::Unknown,
        }
    }

    /// Rejection for a birthdate taken from `source`, or `None` for a minor.
    pub fn overage_outcome(
        &self,
        birthdate: Option<NaiveDate>,
        source: OverageSource,
    ) -> Option<MatchOutcome> {
        match self.classify(birthdate) {
            AgeStatus::Minor => None,
            AgeStatus::Overage => Some(MatchOutcome::RejectedOverage { source }),
            AgeStatus::Unknown => Some(MatchOutcome::RejectedOverage {
                source: OverageSource::UnknownBirthdate,
            }),
        }
    }
}

pub fn start_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Splits candidates into minors and overage rejections, preserving order.
pub fn filter_minors(
    candidates: Vec<BenefitCandidate>,
    policy: &AgePolicy,
) -> (Vec<BenefitCandidate>, Vec<Decision>) {
    let mut eligible = Vec::with_capacity(candidates.len());
    let mut rejected = Vec::new();
    for candidate in candidates {
        match policy.overage_outcome(candidate.dependent_birthdate, OverageSource::Registry) {
            None => eligible.push(candidate),
            Some(outcome) => rejected.push(Decision::new(candidate, outcome)),
        }
    }
    debug!(
        eligible = eligible.len(),
        rejected = rejected.len(),
        reference = %policy.reference,
        "eligibility filter applied"
    );
    (eligible, rejected)
}
