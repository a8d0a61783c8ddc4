pub mod candidate;
pub mod outcome;
pub mod report;
pub mod row;

pub use candidate::{BenefitCandidate, BenefitKey, EnrollmentCandidate, EnrollmentKey, GuardianRole};
pub use outcome::{
    Grant, GrantedDependent, MatchOutcome, OutcomeKind, OverageSource, RejectionRecord,
};
pub use report::{ImportReport, ImportStage};
pub use row::RawRow;
