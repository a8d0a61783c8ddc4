//! Name Matcher.
//!
//! Two names match when they are identical after folding accents,
//! uppercasing and collapsing whitespace. There is no fuzzy matching: a
//! single misspelling is a non-match.

use famrec_ingest::fold_diacritics;

/// A person name in comparable form. Blank names have no key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NameKey(String);

impl NameKey {
    pub fn new(raw: &str) -> Option<Self> {
        let normalized = normalize_name(raw);
        if normalized.is_empty() {
            None
        } else {
            Some(Self(normalized))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Folds accents, uppercases and collapses runs of whitespace.
pub fn normalize_name(raw: &str) -> String {
    let folded = fold_diacritics(raw).to_uppercase();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// True when both names are non-blank and normalize to the same text.
pub fn names_match(a: &str, b: &str) -> bool {
    match (NameKey::new(a), NameKey::new(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignores_accents_case_and_spacing() {
        assert!(names_match("João  da Silva", " JOAO DA SILVA "));
        assert!(names_match("maria conceição", "MARIA CONCEICAO"));
    }

    #[test]
    fn misspelling_is_not_a_match() {
        assert!(!names_match("MARIA SILVA", "MARIA SILVVA"));
    }

    #[test]
    fn blank_names_never_match() {
        assert!(!names_match("", ""));
        assert!(!names_match("  ", "\t"));
    }

    #[test]
    fn key_exposes_normalized_text() {
        let key = NameKey::new(" ana   clara ").expect("key");
        assert_eq!(key.as_str(), "ANA CLARA");
    }
}
