//! Query error types
//!
//! Defines the error conditions that can occur while compiling builder state into SQL.

use thiserror::Error;

/// Errors that can occur during query construction
#[derive(Error, Debug)]
pub enum QueryError {
    /// A filter value does not have the shape its operator requires
    #[error("Invalid filter on {column}: {reason}")]
    InvalidFilter { column: String, reason: String },

    /// Bulk filter input could not be decoded
    #[error("Invalid bulk filter spec: {0}")]
    BulkFilter(#[from] serde_json::Error),
}

impl QueryError {
    pub(crate) fn invalid_filter(column: &str, reason: impl Into<String>) -> Self {
        QueryError::InvalidFilter {
            column: column.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;
