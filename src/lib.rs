// Certification Tracker - Core Library
// Exposes all modules for use in the CLI, the TUI, and tests

pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod normalize;
pub mod parser;
pub mod record;
pub mod store;
pub mod view;

// Re-export commonly used types
pub use config::Config;
pub use db::{BlobStorage, MemoryStorage, SqliteStorage};
pub use error::{ImportError, StoreError};
pub use export::{export_json, write_export, EXPORT_FILE_NAME};
pub use normalize::{aliases, import_text, lookup, merge_imported, normalize, ImportSummary, ALIAS_TABLE};
pub use parser::{parse_csv, parse_json, ImportFormat, RawRecord};
pub use record::{seed_records, Field, Record, RecordFields, Status, LEVEL_CHOICES};
pub use store::{RecordStore, STORAGE_KEY};
pub use view::{
    apply_view, days_until, days_until_at, expiration_badge, expiration_badge_at, filter_records,
    renewal_note, renewal_note_at, renewal_state, renewal_state_at, renewal_window_opens,
    sort_by_key_name, sort_records, summarize, BadgeSeverity, ExpirationBadge, FilterCriteria,
    RenewalState, SortKey, StatusSummary,
};
