// Error types for the record store and the import pipeline

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A save was refused; the collection is unchanged
    #[error("validation failed on {field}: {message}")]
    Validation { field: &'static str, message: String },

    /// Edit or delete referenced an id that no longer exists
    #[error("record not found: {0}")]
    NotFound(String),

    /// The storage collaborator failed to persist the collection
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl StoreError {
    pub fn blank_name() -> Self {
        StoreError::Validation {
            field: "name",
            message: "name is required".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ImportError {
    /// Nothing was pasted or the file was empty
    #[error("nothing to import")]
    Empty,

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Well-formed input with the wrong shape (e.g. not an array of objects)
    #[error("unexpected import payload: {0}")]
    Shape(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ImportError {
    /// Malformed input, as opposed to a storage failure while merging
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            ImportError::Json(_) | ImportError::Csv(_) | ImportError::Shape(_)
        )
    }
}
