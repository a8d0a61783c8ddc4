//! Deduplicator.
//!
//! Exact duplicates are collapsed per dataset on the dataset's natural key,
//! keeping the first occurrence. Within the benefit dataset, dependents
//! claimed by more than one guardian ("split" dependents) are pulled out of
//! the main pool into per-dependent groups for the duplicate resolution pass.

use std::collections::{BTreeMap, BTreeSet};

use famrec_model::{BenefitCandidate, EnrollmentCandidate};

/// Keeps the first item for each key, returning the survivors and the
/// number of items dropped.
pub fn dedupe_by_key<T, K, F>(items: Vec<T>, key: F) -> (Vec<T>, usize)
where
    K: Ord,
    F: Fn(&T) -> K,
{
    let total = items.len();
    let mut seen = BTreeSet::new();
    let unique: Vec<T> = items
        .into_iter()
        .filter(|item| seen.insert(key(item)))
        .collect();
    let dropped = total - unique.len();
    (unique, dropped)
}

/// Claimants sharing one dependent national ID.
#[derive(Debug, Clone)]
pub struct SplitGroup {
    pub dependent_nid: String,
    /// Claimants in input order, one per distinct guardian.
    pub claimants: Vec<BenefitCandidate>,
}

/// Result of deduplicating the benefit dataset.
#[derive(Debug, Default)]
pub struct BenefitDedupe {
    pub unique: Vec<BenefitCandidate>,
    /// Groups in order of their dependent's first appearance.
    pub split_groups: Vec<SplitGroup>,
    pub duplicates_dropped: usize,
}

impl BenefitDedupe {
    /// Candidates that will each receive exactly one outcome.
    pub fn candidate_count(&self) -> usize {
        self.unique.len()
            + self
                .split_groups
                .iter()
                .map(|group| group.claimants.len())
                .sum::<usize>()
    }
}

/// Collapses exact duplicates and separates split dependents.
pub fn dedupe_benefits(candidates: Vec<BenefitCandidate>) -> BenefitDedupe {
    let (unique, duplicates_dropped) = dedupe_by_key(candidates, BenefitCandidate::key);

    let mut guardians_by_dependent: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for candidate in &unique {
        guardians_by_dependent
            .entry(candidate.dependent_nid.as_str())
            .or_default()
            .insert(candidate.guardian_nid.as_str());
    }
    let split: BTreeSet<String> = guardians_by_dependent
        .into_iter()
        .filter(|(_, guardians)| guardians.len() > 1)
        .map(|(dependent, _)| dependent.to_string())
        .collect();

    if split.is_empty() {
        return BenefitDedupe {
            unique,
            split_groups: Vec::new(),
            duplicates_dropped,
        };
    }

    let mut pool = Vec::with_capacity(unique.len());
    let mut split_groups: Vec<SplitGroup> = Vec::new();
    let mut group_index: BTreeMap<String, usize> = BTreeMap::new();
    for candidate in unique {
        if !split.contains(&candidate.dependent_nid) {
            pool.push(candidate);
            continue;
        }
        let idx = *group_index
            .entry(candidate.dependent_nid.clone())
            .or_insert_with(|| {
                split_groups.push(SplitGroup {
                    dependent_nid: candidate.dependent_nid.clone(),
                    claimants: Vec::new(),
                });
                split_groups.len() - 1
            });
        split_groups[idx].claimants.push(candidate);
    }

    BenefitDedupe {
        unique: pool,
        split_groups,
        duplicates_dropped,
    }
}

/// Collapses enrollment rows sharing `(student name, enrollment id)`.
pub fn dedupe_enrollments(candidates: Vec<EnrollmentCandidate>) -> (Vec<EnrollmentCandidate>, usize) {
    dedupe_by_key(candidates, EnrollmentCandidate::key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn benefit(guardian: &str, dependent: &str) -> BenefitCandidate {
        BenefitCandidate {
            guardian_nid: guardian.to_string(),
            dependent_nid: dependent.to_string(),
            ..BenefitCandidate::default()
        }
    }

    #[test]
    fn keeps_first_exact_duplicate() {
        let mut first = benefit("1", "10");
        first.line = 2;
        let mut second = benefit("1", "10");
        second.line = 3;
        let result = dedupe_benefits(vec![first, second]);
        assert_eq!(result.unique.len(), 1);
        assert_eq!(result.unique[0].line, 2);
        assert_eq!(result.duplicates_dropped, 1);
        assert!(result.split_groups.is_empty());
    }

    #[test]
    fn separates_split_dependents() {
        let result = dedupe_benefits(vec![
            benefit("1", "10"),
            benefit("2", "20"),
            benefit("3", "10"),
            benefit("1", "11"),
        ]);
        let unique: Vec<&str> = result.unique.iter().map(|c| c.dependent_nid.as_str()).collect();
        assert_eq!(unique, vec!["20", "11"]);
        assert_eq!(result.split_groups.len(), 1);
        let group = &result.split_groups[0];
        assert_eq!(group.dependent_nid, "10");
        let guardians: Vec<&str> = group.claimants.iter().map(|c| c.guardian_nid.as_str()).collect();
        assert_eq!(guardians, vec!["1", "3"]);
        assert_eq!(result.candidate_count(), 4);
    }

    #[test]
    fn enrollment_key_is_name_and_id() {
        let entry = |name: &str, id: &str| EnrollmentCandidate {
            student_name: name.to_string(),
            enrollment_id: id.to_string(),
            ..EnrollmentCandidate::default()
        };
        let (unique, dropped) = dedupe_enrollments(vec![
            entry("JOAO", "1"),
            entry("JOAO", "1"),
            entry("JOAO", "2"),
        ]);
        assert_eq!(unique.len(), 2);
        assert_eq!(dropped, 1);
    }
}
