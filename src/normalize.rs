// 🔀 Import Normalization - alias table + merge into the store
//
// External payloads spell the same field many ways ("Exam Code(s)",
// "Code", "Exam"...). ALIAS_TABLE lists, per canonical field, every
// accepted source key in priority order; `lookup` is the only place
// that consults it.

use crate::db::BlobStorage;
use crate::error::ImportError;
use crate::parser::{ImportFormat, RawRecord};
use crate::record::{
    new_record_id, parse_months, Field, Record, Status, DEFAULT_LEVEL, DEFAULT_RENEWAL_MONTHS,
};
use crate::store::RecordStore;
use tracing::{debug, info, warn};

// ============================================================================
// ALIAS TABLE
// ============================================================================

/// Accepted source keys per field, first present wins.
/// Spreadsheet headers come first; the canonical key is last so our own
/// exports import back losslessly.
pub const ALIAS_TABLE: [(Field, &[&str]); 10] = [
    (Field::Name, &["Certification / Exam Name", "Name", "Title", "name"]),
    (Field::Codes, &["Exam Code(s)", "Code", "Exam", "codes"]),
    (Field::Level, &["Level", "level"]),
    (Field::Status, &["Status", "status"]),
    (Field::DatePassed, &["Date Passed", "datePassed"]),
    (Field::Expiration, &["Expiration Date", "Expiration", "expiration"]),
    (Field::Renewal, &["Renewal Due (months)", "Renewal", "renewal"]),
    (Field::Domain, &["Role / Domain", "Domain", "Role", "domain"]),
    (Field::Source, &["Source Link", "Source", "source"]),
    (Field::Notes, &["Notes", "notes"]),
];

/// Accepted source keys for one field
pub fn aliases(field: Field) -> &'static [&'static str] {
    ALIAS_TABLE
        .iter()
        .find(|(f, _)| *f == field)
        .map(|(_, aliases)| *aliases)
        .unwrap_or(&[])
}

/// First alias present in the raw record, even if its value is empty
pub fn lookup<'a>(raw: &'a RawRecord, field: Field) -> Option<&'a str> {
    aliases(field).iter().find_map(|alias| raw.get(alias))
}

fn text_or(raw: &RawRecord, field: Field, default: &str) -> String {
    match lookup(raw, field) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => default.to_string(),
    }
}

// ============================================================================
// NORMALIZE
// ============================================================================

/// Map a raw record onto the canonical schema. Always mints a fresh id;
/// an imported id is never reused.
pub fn normalize(raw: &RawRecord) -> Record {
    let renewal = match lookup(raw, Field::Renewal) {
        Some(text) if !text.is_empty() => parse_months(text).unwrap_or_else(|| {
            warn!(value = text, "unreadable renewal months, using default");
            DEFAULT_RENEWAL_MONTHS
        }),
        _ => DEFAULT_RENEWAL_MONTHS,
    };

    Record {
        id: new_record_id(),
        name: text_or(raw, Field::Name, ""),
        codes: text_or(raw, Field::Codes, ""),
        level: text_or(raw, Field::Level, DEFAULT_LEVEL),
        status: text_or(raw, Field::Status, Status::Planned.label()),
        date_passed: text_or(raw, Field::DatePassed, ""),
        expiration: text_or(raw, Field::Expiration, ""),
        renewal,
        domain: text_or(raw, Field::Domain, ""),
        source: text_or(raw, Field::Source, ""),
        notes: text_or(raw, Field::Notes, ""),
    }
}

// ============================================================================
// MERGE
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Records prepended to the collection
    pub imported: usize,
    /// Rows dropped because they had no name
    pub skipped: usize,
}

/// Normalize every raw record and prepend the results (payload order kept).
/// No de-duplication against existing records. Rows without a name are
/// skipped since a nameless record can never be persisted.
pub fn merge_imported<S: BlobStorage>(
    store: &mut RecordStore<S>,
    raws: &[RawRecord],
) -> Result<ImportSummary, ImportError> {
    let mut summary = ImportSummary::default();
    let mut merged = Vec::with_capacity(raws.len() + store.len());

    for (index, raw) in raws.iter().enumerate() {
        let record = normalize(raw);
        if record.has_name() {
            merged.push(record);
            summary.imported += 1;
        } else {
            debug!(index, "skipping imported row without a name");
            summary.skipped += 1;
        }
    }

    merged.extend(store.list().iter().cloned());
    store.replace_all(merged)?;

    info!(imported = summary.imported, skipped = summary.skipped, "import merged");
    Ok(summary)
}

/// Parse then merge. Any parse failure aborts before the store is touched.
pub fn import_text<S: BlobStorage>(
    store: &mut RecordStore<S>,
    text: &str,
    format: ImportFormat,
) -> Result<ImportSummary, ImportError> {
    if text.trim().is_empty() {
        return Err(ImportError::Empty);
    }

    let raws = format.parse(text)?;
    merge_imported(store, &raws)
}

// ============================================================================
// TESTS
// ============================================================================
