//! Core error types for focusnest-core.
//!
//! The hierarchy mirrors how failures propagate: store errors carry the
//! persistence taxonomy (auth, missing schema, read/write), validation
//! errors abort an operation before it has any effect, and config errors
//! stay local to loading and saving preferences.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for focusnest-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Persistence errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Input validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from the persistent store.
///
/// `SchemaMissing` is deliberately separate from `Read`/`Write`: readers
/// swallow it into empty results (degraded mode) while the session-record
/// path surfaces it with a specific message.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No signed-in user identity
    #[error("Not authenticated: no active user")]
    NotAuthenticated,

    /// An expected table is absent from the store
    #[error("Table '{table}' does not exist in the store")]
    SchemaMissing { table: String },

    /// Failed to open the store
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// A query failed for a reason other than missing schema
    #[error("Store read failed: {0}")]
    Read(String),

    /// An insert/update/delete failed
    #[error("Store write failed: {0}")]
    Write(String),
}

impl StoreError {
    /// User-facing message for a failed session record, derived from the
    /// underlying cause (missing table vs. auth mismatch vs. generic).
    pub fn user_message(&self) -> String {
        match self {
            StoreError::SchemaMissing { table } => format!(
                "The {table} table does not exist in the store. Your session was not saved."
            ),
            StoreError::NotAuthenticated => {
                "Not signed in. Please log in and try again.".to_string()
            }
            _ => "Your progress might not be saved.".to_string(),
        }
    }
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Session duration must be a positive whole number of minutes
    #[error("Invalid session duration: {minutes} minutes")]
    InvalidDuration { minutes: i64 },

    /// A configured value fell outside its allowed range
    #[error("Value for '{field}' out of range: {value} (allowed {min}..={max})")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    /// Empty task title
    #[error("Task title must not be empty")]
    EmptyTitle,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse a configuration value
    #[error("Failed to parse configuration value: {0}")]
    ParseFailed(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_missing_message_names_the_table() {
        let err = StoreError::SchemaMissing {
            table: "focus_sessions".into(),
        };
        assert!(err.user_message().contains("focus_sessions"));
    }

    #[test]
    fn generic_write_message_is_nonspecific() {
        let err = StoreError::Write("disk full".into());
        assert_eq!(err.user_message(), "Your progress might not be saved.");
    }
}
