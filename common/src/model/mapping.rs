use serde::{Deserialize, Serialize};

/// One key/value pair driving one placeholder substitution.
///
/// Keys are literal placeholder tokens as they appear in the document text
/// (usually bracketed, e.g. `[Grantor Name]`). Within one request keys are
/// unique; when the same key is parsed twice, the last value wins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MappingEntry {
    pub key: String,
    pub value: String,
}

impl MappingEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Result of parsing an uploaded mapping file or JSON payload.
///
/// `document_name` is carried by tabular input (first row of the sheet) and
/// falls back to a default otherwise. `warnings` counts array elements that
/// were dropped because they lacked a `key` or `value` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedMapping {
    pub document_name: String,
    pub entries: Vec<MappingEntry>,
    pub warnings: Vec<String>,
}

impl ParsedMapping {
    /// Insert preserving first-seen order, last write wins on duplicates.
    pub fn insert(&mut self, key: String, value: String) {
        if let Some(existing) = self.entries.iter_mut().find(|e| e.key == key) {
            existing.value = value;
        } else {
            self.entries.push(MappingEntry { key, value });
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.value.as_str())
    }

    pub fn remove(&mut self, key: &str) {
        self.entries.retain(|e| e.key != key);
    }
}

impl Default for ParsedMapping {
    fn default() -> Self {
        Self {
            document_name: "lease_population_filled".to_string(),
            entries: Vec::new(),
            warnings: Vec::new(),
        }
    }
}
