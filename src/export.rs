// 📤 Export - the whole collection as a pretty-printed JSON file

use crate::record::Record;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// File name used when exporting into a directory
pub const EXPORT_FILE_NAME: &str = "msft-exam-tracker.json";

/// Records as a pretty-printed JSON array (schema verbatim)
pub fn export_json(records: &[Record]) -> Result<String> {
    serde_json::to_string_pretty(records).context("Failed to serialize records")
}

/// Write the export. A directory target gets [`EXPORT_FILE_NAME`].
pub fn write_export(records: &[Record], target: &Path) -> Result<PathBuf> {
    let path = if target.is_dir() {
        target.join(EXPORT_FILE_NAME)
    } else {
        target.to_path_buf()
    };

    let json = export_json(records)?;
    std::fs::write(&path, json)
        .with_context(|| format!("Failed to write export: {}", path.display()))?;

    info!(count = records.len(), path = %path.display(), "collection exported");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::seed_records;

    #[test]
    fn test_export_json_is_pretty_array() {
        let records = seed_records();
        let json = export_json(&records).unwrap();

        assert!(json.starts_with("[\n  {\n    \"id\""));
        assert!(json.contains("\"datePassed\": \"\""));

        let parsed: Vec<Record> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, records);
    }

    #[test]
    fn test_export_empty_collection() {
        assert_eq!(export_json(&[]).unwrap(), "[]");
    }

    #[test]
    fn test_write_export_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        let records = seed_records();

        let path = write_export(&records, dir.path()).unwrap();

        assert_eq!(path, dir.path().join(EXPORT_FILE_NAME));
        let written = std::fs::read_to_string(path).unwrap();
        assert_eq!(written, export_json(&records).unwrap());
    }

    #[test]
    fn test_write_export_to_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("backup.json");

        let path = write_export(&seed_records(), &target).unwrap();
        assert_eq!(path, target);
        assert!(target.exists());
    }
}
