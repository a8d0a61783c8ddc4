//! Duplicate Resolution Pass.
//!
//! A split dependent is awarded to at most one claimant. Guardian roles are
//! tried in priority order (mother, responsible, father); the first role
//! under which some claimant's guardian is enrolled with the dependent picks
//! the winner. Every other claimant loses to the winner's name. Claimants
//! already overage by the registry birthdate never win.

use tracing::debug;

use famrec_model::{GuardianRole, MatchOutcome, OverageSource};

use crate::dedupe::SplitGroup;
use crate::eligibility::AgePolicy;
use crate::resolver::{EnrollmentPool, accept_if_minor};

/// Outcome for each claimant of `group`, in claimant order.
///
/// Claimants whose registry birthdate is not a minor's are rejected as
/// overage first and take no part in the role scan.
pub fn resolve_priority_group(
    group: &SplitGroup,
    pool: &EnrollmentPool,
    policy: &AgePolicy,
) -> Vec<MatchOutcome> {
    let mut outcomes: Vec<Option<MatchOutcome>> = group
        .claimants
        .iter()
        .map(|claimant| {
            policy.overage_outcome(claimant.dependent_birthdate, OverageSource::Registry)
        })
        .collect();

    let winner = GuardianRole::PRIORITY.into_iter().find_map(|role| {
        group
            .claimants
            .iter()
            .enumerate()
            .filter(|(idx, _)| outcomes[*idx].is_none())
            .find_map(|(idx, claimant)| {
                pool.find_with_guardian(&claimant.dependent_name, &claimant.guardian_name, role)
                    .map(|entry| (idx, entry, role))
            })
    });

    match winner {
        Some((winner_idx, entry, role)) => {
            let winner = &group.claimants[winner_idx];
            debug!(
                claimants = group.claimants.len(),
                %role,
                "split dependent resolved"
            );
            for (idx, slot) in outcomes.iter_mut().enumerate() {
                if slot.is_some() {
                    continue;
                }
                *slot = Some(if idx == winner_idx {
                    accept_if_minor(winner, entry, role, policy)
                } else {
                    MatchOutcome::RejectedDuplicateLoser {
                        winner: winner.guardian_name.clone(),
                    }
                });
            }
        }
        None => {
            debug!(
                claimants = group.claimants.len(),
                "no eligible claimant of split dependent is recognised by the school enrollment"
            );
        }
    }

    outcomes
        .into_iter()
        .map(|outcome| outcome.unwrap_or(MatchOutcome::RejectedNoMatch))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use famrec_model::{BenefitCandidate, EnrollmentCandidate};

    use super::*;

    fn policy() -> AgePolicy {
        AgePolicy::new(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(), 18)
    }

    fn claimant(guardian: &str, guardian_nid: &str) -> BenefitCandidate {
        BenefitCandidate {
            guardian_name: guardian.to_string(),
            guardian_nid: guardian_nid.to_string(),
            dependent_name: "LUCAS LIMA".to_string(),
            dependent_nid: "99".to_string(),
            dependent_birthdate: NaiveDate::from_ymd_opt(2015, 1, 1),
            ..BenefitCandidate::default()
        }
    }

    fn group(claimants: Vec<BenefitCandidate>) -> SplitGroup {
        SplitGroup {
            dependent_nid: "99".to_string(),
            claimants,
        }
    }

    fn entry(mother: &str, responsible: &str, father: &str) -> EnrollmentCandidate {
        EnrollmentCandidate {
            student_name: "LUCAS LIMA".to_string(),
            student_birthdate: NaiveDate::from_ymd_opt(2015, 1, 1),
            mother_name: mother.to_string(),
            responsible_name: responsible.to_string(),
            father_name: father.to_string(),
            enrollment_id: "E1".to_string(),
            ..EnrollmentCandidate::default()
        }
    }

    #[test]
    fn mother_beats_father_regardless_of_claim_order() {
        let pool = EnrollmentPool::new(vec![entry("RITA LIMA", "", "PAULO LIMA")]);
        let outcomes = resolve_priority_group(
            &group(vec![claimant("PAULO LIMA", "1"), claimant("RITA LIMA", "2")]),
            &pool,
            &policy(),
        );
        assert_eq!(
            outcomes[0],
            MatchOutcome::RejectedDuplicateLoser {
                winner: "RITA LIMA".to_string()
            }
        );
        assert!(outcomes[1].is_accepted());
    }

    #[test]
    fn responsible_beats_father() {
        let pool = EnrollmentPool::new(vec![entry("", "TIA LIMA", "PAULO LIMA")]);
        let outcomes = resolve_priority_group(
            &group(vec![claimant("PAULO LIMA", "1"), claimant("TIA LIMA", "2")]),
            &pool,
            &policy(),
        );
        assert!(!outcomes[0].is_accepted());
        match &outcomes[1] {
            MatchOutcome::Accepted(dependent) => {
                assert_eq!(dependent.recognised_as, GuardianRole::Responsible);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn unrecognised_group_is_rejected_entirely() {
        let pool = EnrollmentPool::new(vec![entry("OUTRA", "", "")]);
        let outcomes = resolve_priority_group(
            &group(vec![claimant("PAULO LIMA", "1"), claimant("RITA LIMA", "2")]),
            &pool,
            &policy(),
        );
        assert_eq!(outcomes, vec![MatchOutcome::RejectedNoMatch; 2]);
    }

    #[test]
    fn overage_winner_still_defeats_other_claimants() {
        let mut enrolled = entry("RITA LIMA", "", "");
        enrolled.student_birthdate = NaiveDate::from_ymd_opt(2001, 1, 1);
        let pool = EnrollmentPool::new(vec![enrolled]);
        let outcomes = resolve_priority_group(
            &group(vec![claimant("RITA LIMA", "2"), claimant("PAULO LIMA", "1")]),
            &pool,
            &policy(),
        );
        assert_eq!(
            outcomes[0],
            MatchOutcome::RejectedOverage {
                source: OverageSource::Enrollment
            }
        );
        assert!(matches!(
            outcomes[1],
            MatchOutcome::RejectedDuplicateLoser { .. }
        ));
    }

    #[test]
    fn registry_overage_claimants_are_rejected_before_the_role_scan() {
        let mut mother = claimant("RITA LIMA", "2");
        mother.dependent_birthdate = NaiveDate::from_ymd_opt(2005, 1, 1);
        let pool = EnrollmentPool::new(vec![entry("RITA LIMA", "", "PAULO LIMA")]);
        let outcomes = resolve_priority_group(
            &group(vec![mother, claimant("PAULO LIMA", "1")]),
            &pool,
            &policy(),
        );
        assert_eq!(
            outcomes[0],
            MatchOutcome::RejectedOverage {
                source: OverageSource::Registry
            }
        );
        match &outcomes[1] {
            MatchOutcome::Accepted(dependent) => {
                assert_eq!(dependent.recognised_as, GuardianRole::Father);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn group_of_overage_claimants_is_rejected_as_overage() {
        let overage = |guardian: &str, nid: &str| {
            let mut candidate = claimant(guardian, nid);
            candidate.dependent_birthdate = NaiveDate::from_ymd_opt(2005, 1, 1);
            candidate
        };
        let pool = EnrollmentPool::new(vec![entry("RITA LIMA", "", "PAULO LIMA")]);
        let outcomes = resolve_priority_group(
            &group(vec![overage("RITA LIMA", "2"), overage("PAULO LIMA", "1")]),
            &pool,
            &policy(),
        );
        assert!(outcomes.iter().all(|outcome| matches!(
            outcome,
            MatchOutcome::RejectedOverage {
                source: OverageSource::Registry
            }
        )));
    }
}
