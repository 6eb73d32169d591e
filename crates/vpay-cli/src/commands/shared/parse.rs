use std::str::FromStr;

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;

/// Parse a snake_case enum value using serde-deserialization.
pub fn parse_enum<T>(raw: &str, field: &str) -> anyhow::Result<T>
where
    T: DeserializeOwned,
{
    let normalized = raw.trim().to_ascii_lowercase().replace('-', "_");
    serde_json::from_value(serde_json::Value::String(normalized))
        .map_err(|error| anyhow::anyhow!("invalid {field} '{raw}': {error}"))
}

/// Parse an exact decimal amount. A comma decimal separator is accepted.
pub fn parse_amount(raw: &str, field: &str) -> anyhow::Result<Decimal> {
    let normalized = raw.trim().replace(',', ".");
    Decimal::from_str(&normalized).map_err(|error| anyhow::anyhow!("invalid {field} '{raw}': {error}"))
}

pub fn parse_optional_amount(raw: Option<&str>, field: &str) -> anyhow::Result<Option<Decimal>> {
    raw.map(|value| parse_amount(value, field)).transpose()
}
