//! Tests for famrec-model types.

use famrec_model::{
    EnrollmentCandidate, GuardianRole, MatchOutcome, OutcomeKind, OverageSource, RawRow,
};

#[test]
fn raw_row_lookups() {
    let row = RawRow::new(
        3,
        vec![
            ("Aluno".to_string(), "JOAO".to_string()),
            ("Mae".to_string(), "  ".to_string()),
        ],
    );
    assert_eq!(row.get("Aluno"), Some("JOAO"));
    assert_eq!(row.get("Pai"), None);
    assert_eq!(row.get_non_empty("Mae"), None);
    assert!(row.contains("Mae"));
    assert_eq!(row.columns().collect::<Vec<_>>(), vec!["Aluno", "Mae"]);
}

#[test]
fn guardians_follow_priority_and_skip_blanks() {
    let entry = EnrollmentCandidate {
        student_name: "JOAO SILVA".to_string(),
        mother_name: "MARIA SILVA".to_string(),
        father_name: "JOSE SILVA".to_string(),
        responsible_name: String::new(),
        ..EnrollmentCandidate::default()
    };
    let roles: Vec<GuardianRole> = entry.guardians().map(|(role, _)| role).collect();
    assert_eq!(roles, vec![GuardianRole::Mother, GuardianRole::Father]);
}

#[test]
fn rejection_reasons_cite_names() {
    let wrong = MatchOutcome::RejectedWrongGuardian {
        found_guardian: "ANA SILVA".to_string(),
    };
    assert!(wrong.rejection_reason().unwrap().contains("ANA SILVA"));
    assert_eq!(wrong.kind(), OutcomeKind::RejectedWrongGuardian);

    let loser = MatchOutcome::RejectedDuplicateLoser {
        winner: "MARIA".to_string(),
    };
    assert!(loser.rejection_reason().unwrap().contains("MARIA"));

    let overage = MatchOutcome::RejectedOverage {
        source: OverageSource::Registry,
    };
    assert_eq!(overage.rejection_reason().as_deref(), Some("dependent is of age"));
}

#[test]
fn outcome_serializes_with_tag() {
    let json = serde_json::to_string(&MatchOutcome::RejectedNoMatch).expect("serialize outcome");
    assert_eq!(json, r#"{"outcome":"rejected_no_match"}"#);
}
