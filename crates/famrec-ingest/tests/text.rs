use famrec_ingest::fold_diacritics;
use proptest::prelude::*;

proptest! {
    #[test]
    fn folded_text_is_ascii(value in "\\PC{0,40}") {
        prop_assert!(fold_diacritics(&value).is_ascii());
    }

    #[test]
    fn folding_is_idempotent(value in "\\PC{0,40}") {
        let once = fold_diacritics(&value);
        prop_assert_eq!(fold_diacritics(&once), once);
    }

    #[test]
    fn ascii_text_is_unchanged(value in "[ -~]{0,40}") {
        prop_assert_eq!(fold_diacritics(&value), value);
    }
}
