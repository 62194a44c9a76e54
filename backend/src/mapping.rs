//! Turns uploaded JSON or tabular input into an ordered placeholder mapping.

use crate::error::{Result, ServiceError};
use common::model::mapping::ParsedMapping;
use log::{debug, warn};
use serde_json::Value;

/// Parse a JSON mapping payload.
///
/// An object yields one entry per key with the value stringified. An array
/// keeps only elements exposing both `key` and `value`; the rest are dropped
/// and reported through `warnings`. Zero resulting pairs is a parse error.
pub fn parse_json_mapping(raw: &str) -> Result<ParsedMapping> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "undefined" || trimmed == "null" {
        return Err(ServiceError::Parse(
            "no key-value mapping provided".to_string(),
        ));
    }

    let value: Value = serde_json::from_str(trimmed)
        .map_err(|e| ServiceError::Parse(format!("invalid mapping JSON: {}", e)))?;

    let mut parsed = ParsedMapping::default();
    match value {
        Value::Object(map) => {
            for (key, v) in map {
                parsed.insert(key, stringify(&v));
            }
        }
        Value::Array(items) => {
            for (idx, item) in items.iter().enumerate() {
                match (item.get("key"), item.get("value")) {
                    (Some(k), Some(v)) => {
                        let value = stringify(v);
                        if value.trim().is_empty() {
                            // blank values would blank out the placeholder
                            debug!("mapping element {} has a blank value, dropped", idx);
                        } else {
                            parsed.insert(stringify(k), value);
                        }
                    }
                    _ => {
                        let note = format!("mapping element {} lacks key/value, dropped", idx);
                        warn!("{}", note);
                        parsed.warnings.push(note);
                    }
                }
            }
        }
        _ => {
            return Err(ServiceError::Parse(
                "mapping must be a JSON object or array of {key, value} pairs".to_string(),
            ))
        }
    }

    if parsed.entries.is_empty() {
        return Err(ServiceError::Parse(
            "mapping contained no usable key-value pairs".to_string(),
        ));
    }
    Ok(parsed)
}

/// Parse a CSV sheet: the first cell of the first row names the output
/// document, every following row with at least two non-empty cells becomes
/// an entry.
pub fn parse_csv_mapping(content: &str) -> Result<ParsedMapping> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut parsed = ParsedMapping::default();
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(|e| ServiceError::Parse(format!("invalid CSV: {}", e)))?;
        if idx == 0 {
            if let Some(name) = record.get(0) {
                if !name.trim().is_empty() {
                    parsed.document_name = name.trim().to_string();
                }
            }
            continue;
        }
        match (record.get(0), record.get(1)) {
            (Some(k), Some(v)) if !k.trim().is_empty() && !v.trim().is_empty() => {
                parsed.insert(k.trim().to_string(), v.trim().to_string());
            }
            _ => {}
        }
    }

    if parsed.entries.is_empty() {
        return Err(ServiceError::Parse(
            "CSV contained no usable key-value rows".to_string(),
        ));
    }
    Ok(parsed)
}

/// Parse `key=value` lines, one entry per line.
pub fn parse_kv_lines(content: &str) -> Result<ParsedMapping> {
    let mut parsed = ParsedMapping::default();
    for line in content.lines() {
        if let Some((key, value)) = line.split_once('=') {
            if !key.trim().is_empty() {
                parsed.insert(key.trim().to_string(), value.trim().to_string());
            }
        }
    }
    if parsed.entries.is_empty() {
        return Err(ServiceError::Parse(
            "file contained no key=value lines".to_string(),
        ));
    }
    Ok(parsed)
}

/// Dispatch on the uploaded file name.
pub fn parse_mapping_file(filename: &str, content: &str) -> Result<ParsedMapping> {
    let lower = filename.to_lowercase();
    if lower.ends_with(".json") {
        parse_json_mapping(content)
    } else if lower.ends_with(".csv") {
        parse_csv_mapping(content)
    } else if lower.ends_with(".txt") {
        parse_kv_lines(content)
    } else {
        Err(ServiceError::Parse(format!(
            "unsupported mapping file type: {}",
            filename
        )))
    }
}

fn stringify(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_yields_one_entry_per_key() {
        let parsed = parse_json_mapping(r#"{"[A]": "1", "[B]": 2, "[C]": true}"#).unwrap();
        assert_eq!(parsed.entries.len(), 3);
        assert_eq!(parsed.get("[A]"), Some("1"));
        assert_eq!(parsed.get("[B]"), Some("2"));
        assert_eq!(parsed.get("[C]"), Some("true"));
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn array_drops_malformed_and_blank_elements() {
        let raw = r#"[
            {"key": "[A]", "value": "x"},
            {"key": "[B]"},
            {"value": "orphan"},
            {"key": "[C]", "value": ""}
        ]"#;
        let parsed = parse_json_mapping(raw).unwrap();
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.get("[A]"), Some("x"));
        assert_eq!(parsed.get("[C]"), None);
        // only the key/value-less elements are worth telling the caller about
        assert_eq!(parsed.warnings.len(), 2);
    }

    #[test]
    fn array_of_only_malformed_elements_errors() {
        let err = parse_json_mapping(r#"[{"k": 1}, {"v": 2}]"#).unwrap_err();
        assert!(matches!(err, ServiceError::Parse(_)));
    }

    #[test]
    fn duplicate_keys_last_write_wins() {
        let raw = r#"[{"key": "[A]", "value": "old"}, {"key": "[A]", "value": "new"}]"#;
        let parsed = parse_json_mapping(raw).unwrap();
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.get("[A]"), Some("new"));
    }

    #[test]
    fn rejects_garbage_and_empty_input() {
        assert!(parse_json_mapping("").is_err());
        assert!(parse_json_mapping("undefined").is_err());
        assert!(parse_json_mapping("not json").is_err());
        assert!(parse_json_mapping("42").is_err());
    }

    #[test]
    fn csv_first_row_is_document_name() {
        let parsed = parse_csv_mapping("My Lease\n[Grantor Name],Jane Roe\n[State],Ohio\n").unwrap();
        assert_eq!(parsed.document_name, "My Lease");
        assert_eq!(parsed.entries.len(), 2);
        assert_eq!(parsed.get("[State]"), Some("Ohio"));
    }

    #[test]
    fn kv_lines_parse() {
        let parsed = parse_kv_lines("[A]=1\nnoise line\n[B] = two\n").unwrap();
        assert_eq!(parsed.entries.len(), 2);
        assert_eq!(parsed.get("[B]"), Some("two"));
    }

    #[test]
    fn file_dispatch_rejects_unknown_extension() {
        assert!(parse_mapping_file("data.xlsx", "").is_err());
    }
}
