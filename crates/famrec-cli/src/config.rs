//! TOML settings file.
//!
//! ```toml
//! [import]
//! age_limit = 18
//! date_format = "%d/%m/%Y"
//! persist_batch_size = 100
//! as_of = "2026-10-16"
//!
//! [input]
//! delimiter = ";"
//! ```
//!
//! Every key is optional. Command-line flags override the file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use famrec_core::ImportOptions;
use famrec_ingest::CsvOptions;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub import: ImportOptions,
    pub input: InputSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputSettings {
    pub delimiter: char,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self { delimiter: ';' }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("read settings file {}", path.display()))?;
        let settings = Self::from_toml(&content)
            .with_context(|| format!("parse settings file {}", path.display()))?;
        tracing::info!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn csv_options(&self) -> Result<CsvOptions> {
        let delimiter = self.input.delimiter;
        if !delimiter.is_ascii() || delimiter.is_ascii_alphanumeric() || delimiter == '"' {
            bail!("unsupported column delimiter {delimiter:?}");
        }
        Ok(CsvOptions {
            delimiter: delimiter as u8,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let settings = Settings::from_toml("").expect("parse");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.csv_options().expect("options").delimiter, b';');
    }

    #[test]
    fn reads_import_and_input_tables() {
        let settings = Settings::from_toml(
            r#"
            [import]
            age_limit = 16
            persist_batch_size = 25
            as_of = "2026-03-20"

            [input]
            delimiter = ","
            "#,
        )
        .expect("parse");
        assert_eq!(settings.import.age_limit, 16);
        assert_eq!(settings.import.persist_batch_size, 25);
        assert_eq!(settings.import.date_format, "%d/%m/%Y");
        assert_eq!(settings.import.as_of, NaiveDate::from_ymd_opt(2026, 3, 20));
        assert_eq!(settings.csv_options().expect("options").delimiter, b',');
    }

    #[test]
    fn rejects_unknown_keys_and_bad_delimiters() {
        assert!(Settings::from_toml("[import]\nage = 3\n").is_err());
        let settings = Settings::from_toml("[input]\ndelimiter = \"ç\"\n").expect("parse");
        assert!(settings.csv_options().is_err());
    }
}
