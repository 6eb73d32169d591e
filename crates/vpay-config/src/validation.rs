//! Validation engine tunables.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One cent.
fn default_amount_tolerance() -> Decimal {
    Decimal::new(1, 2)
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ValidationConfig {
    /// An amount mismatches when `|expected - amount|` exceeds this value.
    #[serde(default = "default_amount_tolerance")]
    pub amount_tolerance: Decimal,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            amount_tolerance: default_amount_tolerance(),
        }
    }
}
