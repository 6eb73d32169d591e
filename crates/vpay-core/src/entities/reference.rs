use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::PaymentType;
use crate::errors::CoreError;
use crate::validators::{normalize_cnpj, validate_pix_key};

/// Administrative record of a provider and its expected amount per payment type.
///
/// An absent expected amount means no expectation is configured for that type.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ReferenceRecord {
    pub id: String,
    pub cnpj: String,
    pub provider_name: String,
    pub payment_type: PaymentType,
    pub pix_key: String,
    #[schemars(with = "Option<String>")]
    pub expected_pc: Option<Decimal>,
    #[schemars(with = "Option<String>")]
    pub expected_bonus: Option<Decimal>,
    #[schemars(with = "Option<String>")]
    pub expected_reembolso: Option<Decimal>,
}

impl ReferenceRecord {
    /// Expected amount configured for `payment_type`, if any.
    #[must_use]
    pub const fn expected_amount(&self, payment_type: PaymentType) -> Option<Decimal> {
        match payment_type {
            PaymentType::Pc => self.expected_pc,
            PaymentType::Bonus => self.expected_bonus,
            PaymentType::Reembolso => self.expected_reembolso,
        }
    }
}

/// Reference record as supplied by the administrative process.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NewReferenceRecord {
    pub cnpj: String,
    pub provider_name: String,
    #[serde(default)]
    pub payment_type: PaymentType,
    pub pix_key: String,
    #[serde(default)]
    #[schemars(with = "Option<String>")]
    pub expected_pc: Option<Decimal>,
    #[serde(default)]
    #[schemars(with = "Option<String>")]
    pub expected_bonus: Option<Decimal>,
    #[serde(default)]
    #[schemars(with = "Option<String>")]
    pub expected_reembolso: Option<Decimal>,
}

impl NewReferenceRecord {
    /// Normalize the CNPJ and require a PIX key.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` naming the offending field.
    pub fn into_validated(mut self) -> Result<Self, CoreError> {
        self.cnpj = normalize_cnpj(&self.cnpj)?;
        validate_pix_key(&self.pix_key)?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn expected_amount_selects_field_by_type() {
        let record = ReferenceRecord {
            id: "ref-0000000000000001".into(),
            cnpj: "12345678901234".into(),
            provider_name: "Clinica Exemplo".into(),
            payment_type: PaymentType::Pc,
            pix_key: "pix@example.com".into(),
            expected_pc: Some(Decimal::from_str("1000.00").unwrap()),
            expected_bonus: Some(Decimal::from_str("250.00").unwrap()),
            expected_reembolso: None,
        };

        assert_eq!(record.expected_amount(PaymentType::Pc).unwrap().to_string(), "1000.00");
        assert_eq!(record.expected_amount(PaymentType::Bonus).unwrap().to_string(), "250.00");
        assert_eq!(record.expected_amount(PaymentType::Reembolso), None);
    }
}
