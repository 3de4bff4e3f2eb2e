//! Error types for sqlprep
//!
//! Every variant is fatal to a run: nothing is retried and the completion
//! marker is never written once one of these surfaces.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for a preprocessing run
#[derive(Error, Debug)]
pub enum PreprocessError {
    /// The source database could not be opened
    #[error("Failed to open source database '{path}': {source}")]
    SourceOpen {
        path: PathBuf,
        source: rusqlite::Error,
    },

    /// A configured table does not exist in the source
    #[error("Table '{table}' not found in source")]
    Schema { table: String },

    /// A table name that can't be turned into an output file name
    #[error("Table name '{table}' cannot be used as an output file name")]
    InvalidTableName { table: String },

    /// Query or row read failed while streaming a table
    #[error("Failed to extract table '{table}': {source}")]
    Extraction {
        table: String,
        source: rusqlite::Error,
    },

    /// A cleaned value could not be rendered as JSON
    #[error("Failed to serialize table '{table}': {source}")]
    Serialization {
        table: String,
        source: serde_json::Error,
    },

    /// Output directory or file could not be created or written
    #[error("Failed to write '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl PreprocessError {
    pub(crate) fn extraction(table: &str, source: rusqlite::Error) -> Self {
        PreprocessError::Extraction { table: table.to_string(), source }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PreprocessError::Io { path: path.into(), source }
    }

    /// Short machine-friendly name of the error kind, used in log lines
    pub fn kind(&self) -> &'static str {
        match self {
            PreprocessError::SourceOpen { .. } => "source_open",
            PreprocessError::Schema { .. } => "schema",
            PreprocessError::InvalidTableName { .. } => "invalid_table_name",
            PreprocessError::Extraction { .. } => "extraction",
            PreprocessError::Serialization { .. } => "serialization",
            PreprocessError::Io { .. } => "io",
        }
    }
}

/// Result type alias for preprocessing operations
pub type Result<T> = std::result::Result<T, PreprocessError>;
