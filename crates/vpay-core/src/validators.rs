//! Field validators for the extraction output contract.
//!
//! The extraction pipeline is expected to hand over normalized values; these
//! checks run once more at ingestion so the store never holds a record the
//! validation engine cannot reason about.

use rust_decimal::Decimal;

use crate::errors::CoreError;

/// Number of digits in a normalized CNPJ.
pub const CNPJ_LENGTH: usize = 14;

/// Strip every non-digit character and require exactly [`CNPJ_LENGTH`] digits.
///
/// `"12.345.678/0001-34"` normalizes to `"12345678000134"`.
///
/// # Errors
///
/// Returns `CoreError::Validation` if the digit count is wrong.
pub fn normalize_cnpj(raw: &str) -> Result<String, CoreError> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != CNPJ_LENGTH {
        return Err(CoreError::validation(
            "cnpj",
            format!("must have exactly {CNPJ_LENGTH} digits, got {}", digits.len()),
        ));
    }
    Ok(digits)
}

/// Require a competence period in `MM/YYYY` form with a month between 01 and 12.
///
/// # Errors
///
/// Returns `CoreError::Validation` if the format or month is wrong.
pub fn validate_competence(competence: &str) -> Result<(), CoreError> {
    let invalid = || CoreError::validation("competence", format!("'{competence}' is not MM/YYYY"));

    let (month, year) = competence.split_once('/').ok_or_else(invalid)?;
    if month.len() != 2
        || year.len() != 4
        || !month.chars().all(|c| c.is_ascii_digit())
        || !year.chars().all(|c| c.is_ascii_digit())
    {
        return Err(invalid());
    }

    let month: u32 = month.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(CoreError::validation(
            "competence",
            format!("month {month:02} is out of range"),
        ));
    }
    Ok(())
}

/// Require a strictly positive amount.
///
/// # Errors
///
/// Returns `CoreError::Validation` if the amount is zero or negative.
pub fn validate_amount(amount: Decimal) -> Result<(), CoreError> {
    if amount <= Decimal::ZERO {
        return Err(CoreError::validation(
            "valor",
            format!("must be greater than 0, got {amount}"),
        ));
    }
    Ok(())
}

/// Require a confidence score in the closed interval `[0, 1]`.
///
/// # Errors
///
/// Returns `CoreError::Validation` if the score is out of range.
pub fn validate_confidence(score: Decimal) -> Result<(), CoreError> {
    if score < Decimal::ZERO || score > Decimal::ONE {
        return Err(CoreError::validation(
            "confidence_score",
            format!("must be within [0, 1], got {score}"),
        ));
    }
    Ok(())
}

/// Require a non-blank PIX key.
///
/// # Errors
///
/// Returns `CoreError::Validation` if the key is empty.
pub fn validate_pix_key(pix_key: &str) -> Result<(), CoreError> {
    if pix_key.trim().is_empty() {
        return Err(CoreError::validation("pix_key", "cannot be empty"));
    }
    Ok(())
}
