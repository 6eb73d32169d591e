use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::PaymentType;

/// Identity of an approval: one provider, one payment type, one competence.
///
/// At most one [`ValidationControl`] may exist per key.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
pub struct ControlKey {
    pub reference_id: String,
    pub payment_type: PaymentType,
    pub competence: String,
}

/// Durable marker that a (provider, payment type, competence) was approved.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ValidationControl {
    pub id: String,
    pub reference_id: String,
    pub payment_type: PaymentType,
    pub competence: String,
    pub validated_at: DateTime<Utc>,
}

impl ValidationControl {
    #[must_use]
    pub fn key(&self) -> ControlKey {
        ControlKey {
            reference_id: self.reference_id.clone(),
            payment_type: self.payment_type,
            competence: self.competence.clone(),
        }
    }
}
