//! Diacritic folding.

use serde::Serialize;
use serde::de::DeserializeOwned;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::error::{IngestError, Result};
use crate::schema::Dataset;

/// Removes accents and drops any character with no ASCII base form.
///
/// `"Conceição"` becomes `"Conceicao"`; `"Ø"` is dropped.
pub fn fold_diacritics(value: &str) -> String {
    value
        .nfd()
        .filter(|ch| !is_combining_mark(*ch))
        .filter(char::is_ascii)
        .collect()
}

/// Folds every string in a normalized dataset in a single pass.
///
/// The dataset is serialized to JSON, folded as one text and read back, so
/// nested values receive exactly the same treatment as top-level fields.
/// JSON structure is pure ASCII, so folding cannot corrupt it. Fields marked
/// `#[serde(skip)]` come back as their default.
pub fn fold_dataset<T>(dataset: Dataset, items: &[T]) -> Result<Vec<T>>
where
    T: Serialize + DeserializeOwned,
{
    let json = serde_json::to_string(items)
        .map_err(|source| IngestError::Serialization { dataset, source })?;
    let folded = fold_diacritics(&json);
    serde_json::from_str(&folded).map_err(|source| IngestError::Serialization { dataset, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn folds_portuguese_accents() {
        assert_eq!(fold_diacritics("JOÃO CONCEIÇÃO"), "JOAO CONCEICAO");
        assert_eq!(fold_diacritics("Antônia Lúcia"), "Antonia Lucia");
    }

    #[test]
    fn drops_characters_without_ascii_base() {
        assert_eq!(fold_diacritics("1º ANO"), "1 ANO");
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Item {
        name: String,
        tags: Vec<String>,
    }

    #[test]
    fn folds_nested_values() {
        let items = vec![Item {
            name: "Mãe".to_string(),
            tags: vec!["São Paulo".to_string()],
        }];
        let folded = fold_dataset(Dataset::Benefits, &items).expect("fold");
        assert_eq!(folded[0].name, "Mae");
        assert_eq!(folded[0].tags[0], "Sao Paulo");
    }
}
