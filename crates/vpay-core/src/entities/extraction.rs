use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{ExtractionStatus, PaymentType};
use crate::errors::CoreError;
use crate::validators::{normalize_cnpj, validate_amount, validate_competence, validate_confidence};

/// Structured payment data extracted from one uploaded document.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Extraction {
    pub id: String,
    pub file_name: String,
    pub raw_text: String,
    /// Normalized 14-digit tax id.
    pub cnpj: String,
    #[schemars(with = "String")]
    pub amount: Decimal,
    /// Competence period, `MM/YYYY`.
    pub competence: String,
    pub payee_name: String,
    pub description: String,
    pub payment_type: PaymentType,
    pub status: ExtractionStatus,
    #[schemars(with = "String")]
    pub confidence_score: Decimal,
    pub error_message: Option<String>,
    pub extracted_at: DateTime<Utc>,
}

const fn default_status() -> ExtractionStatus {
    ExtractionStatus::Extracted
}

/// Extraction record as handed over by the extraction pipeline.
///
/// This is the import contract: `amount` also accepts the key `valor`, and
/// `status` defaults to `extracted` because the pipeline only hands over
/// completed records.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NewExtraction {
    pub file_name: String,
    #[serde(default)]
    pub raw_text: String,
    pub cnpj: String,
    #[serde(alias = "valor")]
    #[schemars(with = "String")]
    pub amount: Decimal,
    pub competence: String,
    pub payee_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub payment_type: PaymentType,
    #[serde(default = "default_status")]
    pub status: ExtractionStatus,
    #[schemars(with = "String")]
    pub confidence_score: Decimal,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub extracted_at: Option<DateTime<Utc>>,
}

impl NewExtraction {
    /// Check the record against the output contract and normalize the CNPJ.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` naming the first offending field.
    pub fn into_validated(mut self) -> Result<Self, CoreError> {
        self.cnpj = normalize_cnpj(&self.cnpj)?;
        validate_competence(&self.competence)?;
        validate_amount(self.amount)?;
        validate_confidence(self.confidence_score)?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> serde_json::Value {
        serde_json::json!({
            "file_name": "nf-0824.pdf",
            "cnpj": "12.345.678/9012-34",
            "valor": "1000.00",
            "competence": "08/2024",
            "payee_name": "Clinica Exemplo",
            "confidence_score": "0.92"
        })
    }

    #[test]
    fn import_record_defaults() {
        let record: NewExtraction = serde_json::from_value(sample()).unwrap();
        assert_eq!(record.payment_type, PaymentType::Pc);
        assert_eq!(record.status, ExtractionStatus::Extracted);
        assert_eq!(record.amount.to_string(), "1000.00");
        assert!(record.raw_text.is_empty());
        assert!(record.extracted_at.is_none());
    }

    #[test]
    fn into_validated_normalizes_cnpj() {
        let record: NewExtraction = serde_json::from_value(sample()).unwrap();
        let record = record.into_validated().unwrap();
        assert_eq!(record.cnpj, "12345678901234");
    }

    #[test]
    fn into_validated_rejects_bad_competence() {
        let mut value = sample();
        value["competence"] = "2024-08".into();
        let record: NewExtraction = serde_json::from_value(value).unwrap();
        let err = record.into_validated().unwrap_err();
        assert!(matches!(err, CoreError::Validation { ref field, .. } if field == "competence"));
    }

    #[test]
    fn into_validated_rejects_non_positive_amount() {
        let mut value = sample();
        value["valor"] = "0".into();
        let record: NewExtraction = serde_json::from_value(value).unwrap();
        assert!(record.into_validated().is_err());
    }
}
