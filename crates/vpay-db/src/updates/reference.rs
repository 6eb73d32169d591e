//! Reference record update builder.

use rust_decimal::Decimal;
use serde::Serialize;
use vpay_core::enums::PaymentType;

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReferenceUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_type: Option<PaymentType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pix_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_pc: Option<Option<Decimal>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_bonus: Option<Option<Decimal>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_reembolso: Option<Option<Decimal>>,
}

impl ReferenceUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.provider_name.is_none()
            && self.payment_type.is_none()
            && self.pix_key.is_none()
            && self.expected_pc.is_none()
            && self.expected_bonus.is_none()
            && self.expected_reembolso.is_none()
    }
}

#[derive(Default)]
pub struct ReferenceUpdateBuilder(ReferenceUpdate);

impl ReferenceUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn provider_name(mut self, val: impl Into<String>) -> Self {
        self.0.provider_name = Some(val.into());
        self
    }

    #[must_use]
    pub const fn payment_type(mut self, val: PaymentType) -> Self {
        self.0.payment_type = Some(val);
        self
    }

    #[must_use]
    pub fn pix_key(mut self, val: impl Into<String>) -> Self {
        self.0.pix_key = Some(val.into());
        self
    }

    /// Set or clear the expected amount for `payment_type`.
    #[must_use]
    pub const fn expected(mut self, payment_type: PaymentType, val: Option<Decimal>) -> Self {
        match payment_type {
            PaymentType::Pc => self.0.expected_pc = Some(val),
            PaymentType::Bonus => self.0.expected_bonus = Some(val),
            PaymentType::Reembolso => self.0.expected_reembolso = Some(val),
        }
        self
    }

    #[must_use]
    pub fn build(self) -> ReferenceUpdate {
        self.0
    }
}
