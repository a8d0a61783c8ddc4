use std::collections::HashMap;

use famrec_model::{BenefitCandidate, Grant, GrantedDependent};

/// Accepted grants in order of first acceptance, merged by guardian
/// national ID.
#[derive(Debug, Default)]
pub struct GrantBook {
    grants: Vec<Grant>,
    by_guardian: HashMap<String, usize>,
}

impl GrantBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attributes `dependent` to the candidate's guardian, creating the
    /// grant on first acceptance.
    pub fn accept(&mut self, candidate: &BenefitCandidate, dependent: GrantedDependent) {
        if let Some(&idx) = self.by_guardian.get(&candidate.guardian_nid) {
            self.grants[idx].dependents.push(dependent);
            return;
        }
        self.by_guardian
            .insert(candidate.guardian_nid.clone(), self.grants.len());
        self.grants.push(Grant {
            guardian_nid: candidate.guardian_nid.clone(),
            guardian_name: candidate.guardian_name.clone(),
            guardian_birthdate: candidate.guardian_birthdate,
            family_code: candidate.family_code.clone(),
            household_size: candidate.household_size,
            dependents: vec![dependent],
        });
    }

    pub fn len(&self) -> usize {
        self.grants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    pub fn dependent_count(&self) -> usize {
        self.grants.iter().map(|grant| grant.dependents.len()).sum()
    }

    pub fn grants(&self) -> &[Grant] {
        &self.grants
    }

    pub fn into_grants(self) -> Vec<Grant> {
        self.grants
    }
}

#[cfg(test)]
mod tests {
    use famrec_model::GuardianRole;

    use super::*;

    fn dependent(nid: &str) -> GrantedDependent {
        GrantedDependent {
            nid: nid.to_string(),
            name: format!("CHILD {nid}"),
            birthdate: None,
            enrollment_id: format!("E{nid}"),
            recognised_as: GuardianRole::Mother,
        }
    }

    #[test]
    fn merges_dependents_by_guardian() {
        let maria = BenefitCandidate {
            guardian_nid: "1".to_string(),
            guardian_name: "MARIA".to_string(),
            ..BenefitCandidate::default()
        };
        let ana = BenefitCandidate {
            guardian_nid: "2".to_string(),
            ..BenefitCandidate::default()
        };
        let mut book = GrantBook::new();
        book.accept(&maria, dependent("10"));
        book.accept(&ana, dependent("20"));
        book.accept(&maria, dependent("11"));
        assert_eq!(book.len(), 2);
        assert_eq!(book.dependent_count(), 3);
        let grants = book.into_grants();
        assert_eq!(grants[0].guardian_name, "MARIA");
        let nids: Vec<&str> = grants[0].dependents.iter().map(|d| d.nid.as_str()).collect();
        assert_eq!(nids, vec!["10", "11"]);
    }
}
