//! Schema error types

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while building table schemas
#[derive(Error, Debug)]
pub enum SchemaError {
    /// Schema file could not be read
    #[error("Failed to read schema file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    /// Schema document is not valid JSON or is missing required fields
    #[error("Invalid schema document: {0}")]
    Json(#[from] serde_json::Error),

    /// A field spec declares a data type with no semantic mapping
    #[error("Unknown data type {data_type} for column {column}")]
    UnknownDataType { column: String, data_type: String },

    /// A column name appears in more than one partition
    #[error("Column {0} is declared more than once")]
    DuplicateColumn(String),

    /// A date value could not be interpreted in its declared format
    #[error("Invalid date value: {0}")]
    InvalidDate(String),
}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
