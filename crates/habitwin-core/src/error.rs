//! Core error types for habitwin-core.
//!
//! The engine itself has a single failure path: a collaborator read that
//! fails. Everything else ("no habits", "no core set", missing settings)
//! degrades to a defined outcome. Parsing and configuration errors live here
//! too so callers get one hierarchy.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for habitwin-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A collaborator read failed. Propagated unchanged, never retried.
    #[error("Dependency unavailable: {0}")]
    DependencyUnavailable(#[from] SourceError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Input rejected at the parsing boundary
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    /// Whether this error should be shown as a neutral "stats unavailable"
    /// state rather than a hard failure.
    pub fn is_dependency_failure(&self) -> bool {
        matches!(self, CoreError::DependencyUnavailable(_))
    }
}

/// Failures reported by a [`HabitSource`](crate::source::HabitSource).
#[derive(Error, Debug)]
pub enum SourceError {
    /// Query execution failed
    #[error("Query failed: {0}")]
    Database(String),

    /// Database is locked or busy
    #[error("Database is locked")]
    Locked,

    /// Failed to open the backing store
    #[error("Failed to open database at {path}: {message}")]
    OpenFailed { path: PathBuf, message: String },

    /// Any other backend that cannot answer right now
    #[error("Source '{source_name}' unavailable: {message}")]
    Unavailable {
        source_name: String,
        message: String,
    },
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

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Validation errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Not a `YYYY-MM-DD` calendar date
    #[error("Invalid day '{0}': expected YYYY-MM-DD")]
    InvalidDay(String),

    /// Not a `YYYY-MM` calendar month
    #[error("Invalid month '{0}': expected YYYY-MM")]
    InvalidMonth(String),

    /// Unknown enum value or out-of-range number
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<rusqlite::Error> for SourceError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg)
                if e.code == rusqlite::ErrorCode::DatabaseLocked
                    || e.code == rusqlite::ErrorCode::DatabaseBusy =>
            {
                SourceError::Locked
            }
            _ => SourceError::Database(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::DependencyUnavailable(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
