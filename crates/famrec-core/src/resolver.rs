//! Cross-Reference Resolver.
//!
//! Each surviving benefit candidate is looked up in the enrollment pool:
//!
//! 1. first entry whose student name matches the dependent and whose
//!    mother, responsible or father matches the guardian;
//! 2. on a hit, the enrollment-side birthdate must still be a minor's;
//! 3. otherwise, first entry matching on student name alone gives a
//!    wrong-guardian rejection; no entry at all gives no-match.
//!
//! Scans are first-match in pool order, never best-match.

use std::collections::HashMap;

use famrec_model::{
    BenefitCandidate, EnrollmentCandidate, GrantedDependent, GuardianRole, MatchOutcome,
    OverageSource,
};

use crate::eligibility::AgePolicy;
use crate::matcher::NameKey;

#[derive(Debug, Clone)]
struct PoolEntry {
    student: Option<NameKey>,
    guardians: [Option<NameKey>; 3],
}

impl PoolEntry {
    fn new(entry: &EnrollmentCandidate) -> Self {
        Self {
            student: NameKey::new(&entry.student_name),
            guardians: GuardianRole::PRIORITY.map(|role| NameKey::new(entry.guardian(role))),
        }
    }

    fn guardian(&self, role: GuardianRole) -> Option<&NameKey> {
        let slot = match role {
            GuardianRole::Mother => 0,
            GuardianRole::Responsible => 1,
            GuardianRole::Father => 2,
        };
        self.guardians[slot].as_ref()
    }
}

/// Enrollment dataset with names pre-normalized and indexed by student.
///
/// The index keeps positions in pool order, so lookups return the same
/// entry a linear first-match scan would.
#[derive(Debug, Clone, Default)]
pub struct EnrollmentPool {
    entries: Vec<EnrollmentCandidate>,
    keys: Vec<PoolEntry>,
    by_student: HashMap<NameKey, Vec<usize>>,
}

impl EnrollmentPool {
    pub fn new(entries: Vec<EnrollmentCandidate>) -> Self {
        let keys: Vec<PoolEntry> = entries.iter().map(PoolEntry::new).collect();
        let mut by_student: HashMap<NameKey, Vec<usize>> = HashMap::new();
        for (idx, key) in keys.iter().enumerate() {
            if let Some(student) = &key.student {
                by_student.entry(student.clone()).or_default().push(idx);
            }
        }
        Self {
            entries,
            keys,
            by_student,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn positions(&self, student: &str) -> &[usize] {
        NameKey::new(student)
            .and_then(|key| self.by_student.get(&key))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// First entry enrolling `student` under any guardian role named
    /// `guardian`, with the highest-priority role that matched.
    pub fn find_with_any_guardian(
        &self,
        student: &str,
        guardian: &str,
    ) -> Option<(&EnrollmentCandidate, GuardianRole)> {
        let guardian = NameKey::new(guardian)?;
        self.positions(student).iter().find_map(|&idx| {
            GuardianRole::PRIORITY
                .into_iter()
                .find(|role| self.keys[idx].guardian(*role) == Some(&guardian))
                .map(|role| (&self.entries[idx], role))
        })
    }

    /// First entry enrolling `student` with `guardian` in the given `role`.
    pub fn find_with_guardian(
        &self,
        student: &str,
        guardian: &str,
        role: GuardianRole,
    ) -> Option<&EnrollmentCandidate> {
        let guardian = NameKey::new(guardian)?;
        self.positions(student)
            .iter()
            .find(|&&idx| self.keys[idx].guardian(role) == Some(&guardian))
            .map(|&idx| &self.entries[idx])
    }

    /// First entry enrolling `student`, regardless of guardian.
    pub fn find_student(&self, student: &str) -> Option<&EnrollmentCandidate> {
        self.positions(student).first().map(|&idx| &self.entries[idx])
    }
}

/// Accepts `candidate` against a matched enrollment entry unless the
/// enrollment-side birthdate says the dependent is no longer a minor.
pub fn accept_if_minor(
    candidate: &BenefitCandidate,
    entry: &EnrollmentCandidate,
    role: GuardianRole,
    policy: &AgePolicy,
) -> MatchOutcome {
    if let Some(rejection) =
        policy.overage_outcome(entry.student_birthdate, OverageSource::Enrollment)
    {
        return rejection;
    }
    MatchOutcome::Accepted(GrantedDependent {
        nid: candidate.dependent_nid.clone(),
        name: candidate.dependent_name.clone(),
        birthdate: entry.student_birthdate.or(candidate.dependent_birthdate),
        enrollment_id: entry.enrollment_id.clone(),
        recognised_as: role,
    })
}

/// Guardian names recorded on an enrollment entry, for rejection reasons.
pub fn describe_guardians(entry: &EnrollmentCandidate) -> String {
    let names: Vec<&str> = entry.guardians().map(|(_, name)| name.trim()).collect();
    if names.is_empty() {
        "no guardian recorded".to_string()
    } else {
        names.join(" / ")
    }
}

/// Decides the outcome of one benefit candidate.
pub fn resolve(
    candidate: &BenefitCandidate,
    pool: &EnrollmentPool,
    policy: &AgePolicy,
) -> MatchOutcome {
    if let Some((entry, role)) =
        pool.find_with_any_guardian(&candidate.dependent_name, &candidate.guardian_name)
    {
        return accept_if_minor(candidate, entry, role, policy);
    }
    match pool.find_student(&candidate.dependent_name) {
        Some(entry) => MatchOutcome::RejectedWrongGuardian {
            found_guardian: describe_guardians(entry),
        },
        None => MatchOutcome::RejectedNoMatch,
    }
}
