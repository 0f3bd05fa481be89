// 📥 Import Parsers - JSON arrays and CSV text into raw records
//
// Parsing only produces source-key → value mappings. Mapping those keys
// onto the canonical schema is normalize.rs's job.

use crate::error::ImportError;
use csv::{ReaderBuilder, Trim};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

// ============================================================================
// RAW RECORD
// ============================================================================

/// One imported row/object before normalization
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    fields: BTreeMap<String, String>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: add a source field
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.insert(key, value);
        self
    }

    /// Later inserts under the same key win
    pub fn insert(&mut self, key: &str, value: &str) {
        self.fields.insert(key.to_string(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// ============================================================================
// FORMAT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Json,
    Csv,
}

impl ImportFormat {
    /// `.csv` files are CSV; everything else (including pasted text) is JSON
    pub fn from_path(path: &Path) -> Self {
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .map_or(false, |e| e.eq_ignore_ascii_case("csv"));

        if is_csv {
            ImportFormat::Csv
        } else {
            ImportFormat::Json
        }
    }

    pub fn parse(&self, text: &str) -> Result<Vec<RawRecord>, ImportError> {
        match self {
            ImportFormat::Json => parse_json(text),
            ImportFormat::Csv => parse_csv(text),
        }
    }
}

impl std::str::FromStr for ImportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ImportFormat::Json),
            "csv" => Ok(ImportFormat::Csv),
            other => Err(format!("unknown import format: {}", other)),
        }
    }
}

// ============================================================================
// JSON
// ============================================================================

/// Parse a JSON array of objects.
///
/// `null` values count as absent keys; numbers and booleans keep their
/// textual form; nested values become compact JSON text.
pub fn parse_json(text: &str) -> Result<Vec<RawRecord>, ImportError> {
    let value: Value = serde_json::from_str(text)?;

    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(ImportError::Shape(format!(
                "expected a JSON array, found {}",
                json_kind(&other)
            )))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(map) => {
                let mut raw = RawRecord::new();
                for (key, value) in map {
                    if let Some(text) = json_text(value) {
                        raw.insert(&key, &text);
                    }
                }
                Ok(raw)
            }
            other => Err(ImportError::Shape(format!(
                "element {} is {}, expected an object",
                index,
                json_kind(&other)
            ))),
        })
        .collect()
}

fn json_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        nested => Some(nested.to_string()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ============================================================================
// CSV
// ============================================================================

/// Parse header + rows, comma-delimited.
///
/// Quoting is disabled on purpose: a value containing a comma is split
/// into two columns. Blank lines are skipped, values are trimmed, short
/// rows are padded with empty strings and extra columns are dropped.
pub fn parse_csv(text: &str) -> Result<Vec<RawRecord>, ImportError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .quoting(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut rows = reader.records();

    let headers: Vec<String> = match rows.next() {
        Some(header) => header?.iter().map(str::to_string).collect(),
        None => return Err(ImportError::Shape("CSV has no header row".to_string())),
    };

    let mut records = Vec::new();
    for row in rows {
        let row = row?;
        let mut raw = RawRecord::new();
        for (i, header) in headers.iter().enumerate() {
            raw.insert(header, row.get(i).unwrap_or(""));
        }
        records.push(raw);
    }

    Ok(records)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv_basic() {
        let rows = parse_csv("Name,Code\nFoo Cert,FO-100").unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("Name"), Some("Foo Cert"));
        assert_eq!(rows[0].get("Code"), Some("FO-100"));
    }

    #[test]
    fn test_parse_csv_trims_and_skips_blank_lines() {
        let text = "\n Name , Status \r\n\r\n  Azure Admin ,  Planned \r\n\nSC-900 cert,Passed (Active)\n";
        let rows = parse_csv(text).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("Name"), Some("Azure Admin"));
        assert_eq!(rows[0].get("Status"), Some("Planned"));
        assert_eq!(rows[1].get("Status"), Some("Passed (Active)"));
    }

    #[test]
    fn test_parse_csv_short_and_long_rows() {
        let rows = parse_csv("Name,Code,Notes\nOnly Name\nA,B,C,D").unwrap();

        assert_eq!(rows[0].get("Code"), Some(""));
        assert_eq!(rows[0].get("Notes"), Some(""));
        assert_eq!(rows[1].get("Notes"), Some("C"));
        assert_eq!(rows[1].len(), 3);
    }

    #[test]
    fn test_parse_csv_does_not_honor_quotes() {
        let rows = parse_csv("Name,Notes\n\"Cert, with comma\",x").unwrap();

        assert_eq!(rows[0].get("Name"), Some("\"Cert"));
        assert_eq!(rows[0].get("Notes"), Some("with comma\""));
    }

    #[test]
    fn test_parse_csv_header_only() {
        assert!(parse_csv("Name,Code\n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_csv_no_header() {
        let err = parse_csv("\n\n").unwrap_err();
        assert!(err.is_parse_error());
    }

    #[test]
    fn test_parse_json_array_of_objects() {
        let text = r#"[{"Name":"Foo","renewal":24,"active":true,"missing":null,"tags":["a"]}]"#;
        let rows = parse_json(text).unwrap();

        assert_eq!(rows[0].get("Name"), Some("Foo"));
        assert_eq!(rows[0].get("renewal"), Some("24"));
        assert_eq!(rows[0].get("active"), Some("true"));
        assert_eq!(rows[0].get("missing"), None);
        assert_eq!(rows[0].get("tags"), Some(r#"["a"]"#));
    }

    #[test]
    fn test_parse_json_malformed() {
        let err = parse_json("{not valid").unwrap_err();
        assert!(matches!(err, ImportError::Json(_)));
    }

    #[test]
    fn test_parse_json_wrong_shape() {
        assert!(matches!(parse_json(r#"{"Name":"x"}"#), Err(ImportError::Shape(_))));
        assert!(matches!(parse_json(r#"[1, 2]"#), Err(ImportError::Shape(_))));
    }

    #[test]
    fn test_import_format_detection() {
        assert_eq!(ImportFormat::from_path(Path::new("certs.CSV")), ImportFormat::Csv);
        assert_eq!(ImportFormat::from_path(Path::new("certs.json")), ImportFormat::Json);
        assert_eq!(ImportFormat::from_path(Path::new("paste")), ImportFormat::Json);
        assert_eq!("csv".parse::<ImportFormat>(), Ok(ImportFormat::Csv));
        assert!("xml".parse::<ImportFormat>().is_err());
    }
}
