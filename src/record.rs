// 🎓 Record Model - one certification/exam entry
//
// Identity is the `id` (UUID), minted once and never reused.
// Everything else is a value the user can edit.

use serde::{Deserialize, Deserializer, Serialize};

/// Default renewal period in months
pub const DEFAULT_RENEWAL_MONTHS: i64 = 12;

/// Level assigned when none is given
pub const DEFAULT_LEVEL: &str = "Associate";

/// Level choices offered by the edit dialog (level stays free text)
pub const LEVEL_CHOICES: [&str; 4] = ["Fundamentals", "Associate", "Expert", "Specialty"];

// ============================================================================
// STATUS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Planned,
    Scheduled,
    PassedActive,
    PassedExpired,
    Retired,
}

impl Status {
    pub const ALL: [Status; 5] = [
        Status::Planned,
        Status::Scheduled,
        Status::PassedActive,
        Status::PassedExpired,
        Status::Retired,
    ];

    /// Label as stored in the record and shown in the UI
    pub fn label(&self) -> &'static str {
        match self {
            Status::Planned => "Planned",
            Status::Scheduled => "Scheduled",
            Status::PassedActive => "Passed (Active)",
            Status::PassedExpired => "Passed (Expired)",
            Status::Retired => "Retired",
        }
    }

    pub fn from_label(label: &str) -> Option<Status> {
        Status::ALL.iter().copied().find(|s| s.label() == label)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// CANONICAL FIELDS
// ============================================================================

/// The editable fields of the canonical schema, in dialog order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Codes,
    Level,
    Status,
    DatePassed,
    Expiration,
    Renewal,
    Domain,
    Source,
    Notes,
}

impl Field {
    pub const ALL: [Field; 10] = [
        Field::Name,
        Field::Codes,
        Field::Level,
        Field::Status,
        Field::DatePassed,
        Field::Expiration,
        Field::Renewal,
        Field::Domain,
        Field::Source,
        Field::Notes,
    ];

    /// Serialized key in the persisted/exported schema
    pub fn key(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Codes => "codes",
            Field::Level => "level",
            Field::Status => "status",
            Field::DatePassed => "datePassed",
            Field::Expiration => "expiration",
            Field::Renewal => "renewal",
            Field::Domain => "domain",
            Field::Source => "source",
            Field::Notes => "notes",
        }
    }

    /// Human-readable label for forms
    pub fn label(&self) -> &'static str {
        match self {
            Field::Name => "Certification / Exam Name",
            Field::Codes => "Exam Code(s)",
            Field::Level => "Level",
            Field::Status => "Status",
            Field::DatePassed => "Date Passed",
            Field::Expiration => "Expiration Date",
            Field::Renewal => "Renewal Due (months)",
            Field::Domain => "Role / Domain",
            Field::Source => "Source Link",
            Field::Notes => "Notes",
        }
    }
}

// ============================================================================
// RECORD
// ============================================================================

/// A certification or exam entry.
///
/// Field names serialize in camelCase so persisted blobs and exports
/// carry the schema verbatim (`datePassed`, not `date_passed`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Stable identity - NEVER changes after creation
    #[serde(default = "new_record_id")]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub codes: String,

    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default = "default_status")]
    pub status: String,

    /// Date string or empty
    #[serde(default)]
    pub date_passed: String,

    /// Date string or empty (empty = never expires)
    #[serde(default)]
    pub expiration: String,

    /// Renewal period in months (informational)
    #[serde(default = "default_renewal", deserialize_with = "lenient_months")]
    pub renewal: i64,

    #[serde(default)]
    pub domain: String,

    /// URL, rendered as a link when non-empty
    #[serde(default)]
    pub source: String,

    #[serde(default)]
    pub notes: String,
}

/// Mint a fresh record identity
pub fn new_record_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn default_level() -> String {
    DEFAULT_LEVEL.to_string()
}

fn default_status() -> String {
    Status::Planned.label().to_string()
}

fn default_renewal() -> i64 {
    DEFAULT_RENEWAL_MONTHS
}

// Older blobs may hold renewal as text, null or a float.
fn lenient_months<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .unwrap_or(DEFAULT_RENEWAL_MONTHS),
        serde_json::Value::String(s) => parse_months(&s).unwrap_or(DEFAULT_RENEWAL_MONTHS),
        _ => DEFAULT_RENEWAL_MONTHS,
    })
}

/// Parse a month count; decimal text is truncated.
pub fn parse_months(text: &str) -> Option<i64> {
    let text = text.trim();
    if let Ok(n) = text.parse::<i64>() {
        return Some(n);
    }
    text.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(|f| f.trunc() as i64)
}

impl Record {
    /// Build a record from dialog fields under the given identity
    pub fn from_fields(id: String, fields: RecordFields) -> Self {
        Record {
            id,
            name: fields.name,
            codes: fields.codes,
            level: fields.level,
            status: fields.status,
            date_passed: fields.date_passed,
            expiration: fields.expiration,
            renewal: fields.renewal,
            domain: fields.domain,
            source: fields.source,
            notes: fields.notes,
        }
    }

    /// Everything except the identity
    pub fn fields(&self) -> RecordFields {
        RecordFields {
            name: self.name.clone(),
            codes: self.codes.clone(),
            level: self.level.clone(),
            status: self.status.clone(),
            date_passed: self.date_passed.clone(),
            expiration: self.expiration.clone(),
            renewal: self.renewal,
            domain: self.domain.clone(),
            source: self.source.clone(),
            notes: self.notes.clone(),
        }
    }

    /// Known status, if the free-text value is one of the fixed set
    pub fn known_status(&self) -> Option<Status> {
        Status::from_label(&self.status)
    }

    pub fn with_defaults(mut self) -> Self {
        fill_blank(&mut self.level, DEFAULT_LEVEL);
        fill_blank(&mut self.status, Status::Planned.label());
        self
    }

    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

// ============================================================================
// RECORD FIELDS (edit dialog payload)
// ============================================================================

/// Editable part of a record, as submitted by the edit dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFields {
    pub name: String,
    pub codes: String,
    pub level: String,
    pub status: String,
    pub date_passed: String,
    pub expiration: String,
    pub renewal: i64,
    pub domain: String,
    pub source: String,
    pub notes: String,
}

impl RecordFields {
    pub fn named(name: &str) -> Self {
        RecordFields {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Text value of one field (renewal rendered as digits)
    pub fn get(&self, field: Field) -> String {
        match field {
            Field::Name => self.name.clone(),
            Field::Codes => self.codes.clone(),
            Field::Level => self.level.clone(),
            Field::Status => self.status.clone(),
            Field::DatePassed => self.date_passed.clone(),
            Field::Expiration => self.expiration.clone(),
            Field::Renewal => self.renewal.to_string(),
            Field::Domain => self.domain.clone(),
            Field::Source => self.source.clone(),
            Field::Notes => self.notes.clone(),
        }
    }

    /// Set one field from text. Renewal text that is not a number
    /// (including empty) falls back to the default period.
    pub fn set(&mut self, field: Field, value: &str) {
        let value_string = value.to_string();
        match field {
            Field::Name => self.name = value_string,
            Field::Codes => self.codes = value_string,
            Field::Level => self.level = value_string,
            Field::Status => self.status = value_string,
            Field::DatePassed => self.date_passed = value_string,
            Field::Expiration => self.expiration = value_string,
            Field::Renewal => {
                self.renewal = parse_months(value).unwrap_or(DEFAULT_RENEWAL_MONTHS)
            }
            Field::Domain => self.domain = value_string,
            Field::Source => self.source = value_string,
            Field::Notes => self.notes = value_string,
        }
    }

    /// Blank level or status takes the dialog default, the same value an
    /// import of the blank field would produce
    pub fn with_defaults(mut self) -> Self {
        fill_blank(&mut self.level, DEFAULT_LEVEL);
        fill_blank(&mut self.status, Status::Planned.label());
        self
    }

    /// Trim the free-text inputs the way the dialog does on save.
    /// Dates, level and status come from pickers and are left alone.
    pub fn trimmed(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.codes = self.codes.trim().to_string();
        self.domain = self.domain.trim().to_string();
        self.source = self.source.trim().to_string();
        self.notes = self.notes.trim().to_string();
        self
    }
}

fn fill_blank(value: &mut String, default: &str) {
    if value.trim().is_empty() {
        *value = default.to_string();
    }
}

impl Default for RecordFields {
    fn default() -> Self {
        RecordFields {
            name: String::new(),
            codes: String::new(),
            level: default_level(),
            status: default_status(),
            date_passed: String::new(),
            expiration: String::new(),
            renewal: DEFAULT_RENEWAL_MONTHS,
            domain: String::new(),
            source: String::new(),
            notes: String::new(),
        }
    }
}

// ============================================================================
// SEED DATA
// ============================================================================

/// Example records used when nothing has been persisted yet.
/// Each call mints fresh ids; seeds are never written until the first mutation.
pub fn seed_records() -> Vec<Record> {
    let seed = |name: &str, codes: &str, domain: &str, source: &str, notes: &str| Record {
        id: new_record_id(),
        name: name.to_string(),
        codes: codes.to_string(),
        level: DEFAULT_LEVEL.to_string(),
        status: Status::PassedActive.label().to_string(),
        date_passed: String::new(),
        expiration: String::new(),
        renewal: DEFAULT_RENEWAL_MONTHS,
        domain: domain.to_string(),
        source: source.to_string(),
        notes: notes.to_string(),
    };

    vec![
        seed(
            "Microsoft Endpoint Administrator Associate",
            "MD-102",
            "Endpoint Management",
            "https://learn.microsoft.com/certifications/exams/md-102/",
            "Pre-filled; verify against transcript.",
        ),
        seed(
            "Security Operations Analyst Associate",
            "SC-200",
            "Security / XDR",
            "https://learn.microsoft.com/certifications/exams/sc-200/",
            "Pre-filled; verify against transcript.",
        ),
        seed(
            "Identity and Access Administrator Associate",
            "SC-300",
            "Entra ID / IAM",
            "https://learn.microsoft.com/certifications/exams/sc-300/",
            "Pre-filled; verify against transcript.",
        ),
        seed(
            "Information Protection Administrator Associate",
            "SC-400",
            "Purview / Compliance",
            "https://learn.microsoft.com/certifications/exams/sc-400/",
            "Pre-filled; verify against transcript.",
        ),
        seed(
            "Designing and Implementing Microsoft Security (placeholder)",
            "SC-401",
            "Security / Design",
            "https://learn.microsoft.com/certifications/",
            "Verify exact title/cert mapping on Learn.",
        ),
    ]
}

// ============================================================================
// TESTS
// ============================================================================
