//! Unified error type for the ingestion engine
//!
//! [`GridError`] is what the store, the time-series materializer and the
//! transformation algorithms hand back to the importers. Importers add
//! context with `anyhow` and let the error terminate the run.
//!
//! # Example
//!
//! ```
//! use gridstore_core::{GridError, GridResult};
//!
//! fn owner_of(column: &str) -> GridResult<i64> {
//!     Err(GridError::unresolved("balancing_topologies", column))
//! }
//!
//! assert!(owner_of("bus4").is_err());
//! ```

use thiserror::Error;

/// Error raised anywhere in the ingestion pipeline.
#[derive(Error, Debug)]
pub enum GridError {
    /// I/O errors (file access, directory scans)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Unparsable cell, timestamp or payload
    #[error("Parse error: {0}")]
    Parse(String),

    /// A source file the importer needs was not found under the source root
    #[error("source file '{0}' not found")]
    MissingFile(String),

    /// A required column is absent from a source table
    #[error("column '{column}' missing from {table}")]
    MissingColumn { table: String, column: String },

    /// A mandatory natural-key reference could not be resolved
    #[error("no {entity_type} entity with key '{key}'")]
    UnresolvedReference { entity_type: String, key: String },

    /// Errors surfaced by the relational store, constraint violations included
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic errors (for wrapping external errors)
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Results using GridError.
pub type GridResult<T> = Result<T, GridError>;

impl GridError {
    pub fn unresolved(entity_type: impl Into<String>, key: impl ToString) -> Self {
        GridError::UnresolvedReference {
            entity_type: entity_type.into(),
            key: key.to_string(),
        }
    }

    pub fn missing_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        GridError::MissingColumn {
            table: table.into(),
            column: column.into(),
        }
    }
}

impl From<anyhow::Error> for GridError {
    fn from(err: anyhow::Error) -> Self {
        GridError::Other(err.to_string())
    }
}

impl From<String> for GridError {
    fn from(s: String) -> Self {
        GridError::Other(s)
    }
}

impl From<&str> for GridError {
    fn from(s: &str) -> Self {
        GridError::Other(s.to_string())
    }
}

impl From<serde_json::Error> for GridError {
    fn from(err: serde_json::Error) -> Self {
        GridError::Parse(err.to_string())
    }
}

impl From<rusqlite::Error> for GridError {
    fn from(err: rusqlite::Error) -> Self {
        GridError::Store(err.to_string())
    }
}

impl From<csv::Error> for GridError {
    fn from(err: csv::Error) -> Self {
        GridError::Parse(err.to_string())
    }
}

impl From<toml::de::Error> for GridError {
    fn from(err: toml::de::Error) -> Self {
        GridError::Config(err.to_string())
    }
}
