//! Cross-cutting error types for vpay.
//!
//! Domain-specific errors (`DatabaseError`, `ValidationError`, `ConfigError`)
//! live in their crates and report an [`ErrorCode`] and [`ErrorSeverity`]
//! from here so operators see one numbering scheme across the system.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Errors that can be raised by any vpay crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// A field failed the extraction output contract.
    #[error("Validation error on '{field}': {reason}")]
    Validation { field: String, reason: String },

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CoreError {
    #[must_use]
    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Numeric error code by category (`1xxx` config, `2xxx` store, `4xxx` validation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorCode {
    ConfigError,
    ConfigMissing,
    ConfigInvalid,
    InitializationError,
    DbError,
    DbConnection,
    DbQuery,
    DbTransaction,
    ValidationError,
    ValidationSchema,
    ValidationData,
}

impl ErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConfigError => "1000",
            Self::ConfigMissing => "1001",
            Self::ConfigInvalid => "1002",
            Self::InitializationError => "1003",
            Self::DbError => "2000",
            Self::DbConnection => "2001",
            Self::DbQuery => "2002",
            Self::DbTransaction => "2003",
            Self::ValidationError => "4000",
            Self::ValidationSchema => "4001",
            Self::ValidationData => "4002",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How urgently an operator needs to look at an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl ErrorSeverity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_group_by_category() {
        assert!(ErrorCode::ConfigMissing.as_str().starts_with('1'));
        assert!(ErrorCode::DbTransaction.as_str().starts_with('2'));
        assert!(ErrorCode::ValidationData.as_str().starts_with('4'));
    }

    #[test]
    fn severities_are_ordered() {
        assert!(ErrorSeverity::Critical > ErrorSeverity::Error);
        assert!(ErrorSeverity::Warning > ErrorSeverity::Info);
    }

    #[test]
    fn validation_error_message_names_field() {
        let err = CoreError::validation("cnpj", "must have 14 digits");
        assert_eq!(
            err.to_string(),
            "Validation error on 'cnpj': must have 14 digits"
        );
    }
}
