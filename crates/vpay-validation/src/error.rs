//! System-level validation failures.
//!
//! Business rejections (`invalid`, `meta_not_found`, `already_validated`)
//! are ordinary results, never errors. A `ValidationError` means no
//! consistent result could be recorded.

use thiserror::Error;
use vpay_core::errors::{ErrorCode, ErrorSeverity};
use vpay_db::error::DatabaseError;

#[derive(Debug, Error)]
pub enum ValidationError {
    /// A store call failed while validating one extraction.
    #[error("store failure while validating {extraction_id} ({file_name}): {source}")]
    Store {
        extraction_id: String,
        file_name: String,
        #[source]
        source: DatabaseError,
    },

    /// A store call failed outside any single extraction.
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] DatabaseError),

    /// The extraction lacks a field the engine needs.
    #[error("extraction {extraction_id} is missing required field '{field}'")]
    Malformed {
        extraction_id: String,
        field: &'static str,
    },

    #[error("extraction not found: {0}")]
    ExtractionNotFound(String),
}

impl ValidationError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Store { source, .. } | Self::StoreUnavailable(source) => source.code(),
            Self::Malformed { .. } => ErrorCode::ValidationData,
            Self::ExtractionNotFound(_) => ErrorCode::ValidationError,
        }
    }

    #[must_use]
    pub const fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Store { .. } | Self::StoreUnavailable(_) => ErrorSeverity::Error,
            Self::Malformed { .. } | Self::ExtractionNotFound(_) => ErrorSeverity::Warning,
        }
    }

    /// Id of the extraction this failure belongs to, if any.
    #[must_use]
    pub fn extraction_id(&self) -> Option<&str> {
        match self {
            Self::Store { extraction_id, .. } | Self::Malformed { extraction_id, .. } => {
                Some(extraction_id.as_str())
            }
            Self::ExtractionNotFound(id) => Some(id.as_str()),
            Self::StoreUnavailable(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_carries_context_and_code() {
        let err = ValidationError::Store {
            extraction_id: "ext-1".into(),
            file_name: "nf.pdf".into(),
            source: DatabaseError::NoResult,
        };
        assert_eq!(
            err.to_string(),
            "store failure while validating ext-1 (nf.pdf): No result returned"
        );
        assert_eq!(err.code(), ErrorCode::DbQuery);
        assert_eq!(err.severity(), ErrorSeverity::Error);
        assert_eq!(err.extraction_id(), Some("ext-1"));
    }

    #[test]
    fn malformed_is_validation_data() {
        let err = ValidationError::Malformed {
            extraction_id: "ext-1".into(),
            field: "cnpj",
        };
        assert_eq!(err.code().as_str(), "4002");
    }
}
