//! Configuration error types.

use thiserror::Error;
use vpay_core::errors::{ErrorCode, ErrorSeverity};

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Figment extraction or merge error.
    #[error("Configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),

    /// A configuration field has an invalid value.
    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl ConfigError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Figment(_) => ErrorCode::ConfigError,
            Self::InvalidValue { .. } => ErrorCode::ConfigInvalid,
        }
    }

    /// The process cannot start without a usable configuration.
    #[must_use]
    pub const fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Critical
    }
}
