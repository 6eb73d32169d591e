use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::ValidationStatus;

fn default_severity() -> String {
    "error".to_string()
}

/// One human-readable problem found while validating an extraction.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub error: String,
    #[serde(default = "default_severity")]
    pub severity: String,
    #[serde(default)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

impl FieldError {
    #[must_use]
    pub fn new(field: &str, error: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            error: error.into(),
            severity: default_severity(),
            details: serde_json::Map::new(),
        }
    }
}

/// Outcome of one validation attempt. Immutable once stored.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ValidationResult {
    pub id: String,
    pub extraction_id: String,
    pub reference_id: Option<String>,
    pub is_valid: bool,
    pub status: ValidationStatus,
    pub validation_errors: Vec<FieldError>,
    pub details: serde_json::Value,
    pub notes: Option<String>,
    pub validated_at: DateTime<Utc>,
}

impl ValidationResult {
    /// Whether any error entry names `field`.
    #[must_use]
    pub fn has_error_on(&self, field: &str) -> bool {
        self.validation_errors.iter().any(|e| e.field == field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_error_defaults_when_deserialized() {
        let err: FieldError =
            serde_json::from_str(r#"{"field":"cnpj","error":"not found in reference table"}"#)
                .unwrap();
        assert_eq!(err, FieldError::new("cnpj", "not found in reference table"));
        assert_eq!(err.severity, "error");
    }
}
