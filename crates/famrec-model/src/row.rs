use serde::{Deserialize, Serialize};

/// A single source row as read from a CSV file, in header order.
///
/// `line` is the 1-based line in the source file and is carried into the
/// audit trail so rejected rows can be located in the original file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow {
    pub line: usize,
    pub fields: Vec<(String, String)>,
}

impl RawRow {
    pub fn new(line: usize, fields: Vec<(String, String)>) -> Self {
        Self { line, fields }
    }

    /// Returns the value of `column`, if the row has it.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    /// Returns the trimmed value of `column`, or `None` when absent or blank.
    pub fn get_non_empty(&self, column: &str) -> Option<&str> {
        self.get(column)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    pub fn contains(&self, column: &str) -> bool {
        self.fields.iter().any(|(name, _)| name == column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(_, value)| value.as_str())
    }
}
