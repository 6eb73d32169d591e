//! Database error types for vpay-db.

use std::time::Duration;

use thiserror::Error;
use vpay_core::errors::{CoreError, ErrorCode, ErrorSeverity};

use crate::retry::is_transient_libsql_error;

/// Errors from database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// The row to update does not exist.
    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: &'static str, id: String },

    /// Invalid state encountered (e.g., bad data in DB).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A record failed the ingestion contract before reaching SQL.
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] CoreError),

    /// A uniqueness constraint rejected the insert.
    #[error("Duplicate: {0}")]
    Duplicate(String),

    /// A single attempt exceeded the configured timeout.
    #[error("Store operation timed out after {0:?}")]
    Timeout(Duration),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DatabaseError {
    /// Whether retrying the same operation may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::LibSql(e) => is_transient_libsql_error(e),
            _ => false,
        }
    }

    /// Whether this is a `UNIQUE` constraint violation reported by libSQL.
    #[must_use]
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::Duplicate(_) => true,
            Self::LibSql(e) => e.to_string().contains("UNIQUE constraint failed"),
            _ => false,
        }
    }

    /// Turn a unique violation into [`DatabaseError::Duplicate`], leaving other errors as-is.
    #[must_use]
    pub fn into_duplicate(self, what: impl FnOnce() -> String) -> Self {
        if self.is_unique_violation() && !matches!(self, Self::Duplicate(_)) {
            Self::Duplicate(what())
        } else {
            self
        }
    }

    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Migration(_) => ErrorCode::InitializationError,
            Self::Timeout(_) => ErrorCode::DbConnection,
            Self::InvalidInput(_) => ErrorCode::ValidationData,
            Self::Query(_)
            | Self::NoResult
            | Self::NotFound { .. }
            | Self::InvalidState(_)
            | Self::Duplicate(_) => ErrorCode::DbQuery,
            Self::LibSql(_) | Self::Other(_) => ErrorCode::DbError,
        }
    }

    #[must_use]
    pub const fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Migration(_) => ErrorSeverity::Critical,
            Self::InvalidInput(_) | Self::Duplicate(_) | Self::NotFound { .. } => {
                ErrorSeverity::Warning
            }
            _ => ErrorSeverity::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_is_transient() {
        assert!(DatabaseError::Timeout(Duration::from_millis(5)).is_transient());
        assert!(!DatabaseError::NoResult.is_transient());
    }

    #[test]
    fn invalid_input_reports_validation_code() {
        let err = DatabaseError::from(CoreError::validation("cnpj", "too short"));
        assert_eq!(err.code(), ErrorCode::ValidationData);
        assert_eq!(err.severity(), ErrorSeverity::Warning);
    }

    #[test]
    fn into_duplicate_keeps_unrelated_errors() {
        let err = DatabaseError::Query("boom".into()).into_duplicate(|| "x".into());
        assert!(matches!(err, DatabaseError::Query(_)));
    }
}
