use famrec_model::{BenefitCandidate, MatchOutcome, RejectionRecord};

/// A benefit candidate paired with its terminal outcome.
#[derive(Debug, Clone)]
pub struct Decision {
    pub candidate: BenefitCandidate,
    pub outcome: MatchOutcome,
}

impl Decision {
    pub fn new(candidate: BenefitCandidate, outcome: MatchOutcome) -> Self {
        Self { candidate, outcome }
    }

    /// Audit record for a rejected candidate, carrying its verbatim source row.
    pub fn rejection(&self) -> Option<RejectionRecord> {
        self.outcome
            .rejection_reason()
            .map(|reason| RejectionRecord::new(self.candidate.source.clone(), reason))
    }
}
