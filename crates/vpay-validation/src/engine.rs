//! The validation engine.
//!
//! Rules run in a fixed order and the first terminal state wins:
//!
//! 1. no reference record for the CNPJ: `meta_not_found`
//! 2. expected amount for the payment type differs from the extracted amount
//!    by more than the tolerance: mismatch error recorded, evaluation continues
//! 3. a control entry exists for (reference, payment type, competence):
//!    `already_validated`, even when step 2 found a mismatch
//! 4. any error from step 2: `invalid`
//! 5. otherwise `valid`, committed together with a new control entry
//!
//! Every outcome is persisted through [`ValidationStore::commit`] before it
//! is returned. Store failures come back as [`ValidationError`] and nothing
//! is recorded for them.

use rust_decimal::Decimal;
use serde_json::json;

use vpay_core::entities::{ControlKey, Extraction, FieldError, ReferenceRecord, ValidationResult};
use vpay_core::enums::ValidationStatus;
use vpay_db::error::DatabaseError;
use vpay_db::repos::validation::{NewValidationResult, ValidationDraft};

use crate::error::ValidationError;
use crate::store::ValidationStore;

pub const META_NOT_FOUND_MESSAGE: &str = "not found in reference table";
pub const ALREADY_VALIDATED_MESSAGE: &str = "already validated for this period";

pub struct ValidationEngine<S> {
    store: S,
    tolerance: Decimal,
}

impl<S: ValidationStore> ValidationEngine<S> {
    /// `tolerance` is the largest accepted `|expected - amount|`.
    #[must_use]
    pub const fn new(store: S, tolerance: Decimal) -> Self {
        Self { store, tolerance }
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Load an extraction by id and validate it.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::ExtractionNotFound` for an unknown id, or
    /// any error from [`Self::validate`].
    pub async fn validate_by_id(&self, extraction_id: &str) -> Result<ValidationResult, ValidationError> {
        let extraction = self
            .store
            .load_extraction(extraction_id)
            .await?
            .ok_or_else(|| ValidationError::ExtractionNotFound(extraction_id.to_string()))?;
        self.validate(&extraction).await
    }

    /// Validate one extraction and persist the outcome.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` on a store failure or a malformed extraction.
    pub async fn validate(&self, extraction: &Extraction) -> Result<ValidationResult, ValidationError> {
        self.validate_traced(extraction, None).await
    }

    /// [`Self::validate`] with a batch trace id attached to the log row.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` on a store failure or a malformed extraction.
    pub async fn validate_traced(
        &self,
        extraction: &Extraction,
        trace_id: Option<&str>,
    ) -> Result<ValidationResult, ValidationError> {
        if extraction.cnpj.trim().is_empty() {
            return Err(ValidationError::Malformed {
                extraction_id: extraction.id.clone(),
                field: "cnpj",
            });
        }

        let store_err = |source: DatabaseError| ValidationError::Store {
            extraction_id: extraction.id.clone(),
            file_name: extraction.file_name.clone(),
            source,
        };
        let trace_id = trace_id.map(String::from);

        let Some(reference) = self
            .store
            .find_reference(&extraction.cnpj)
            .await
            .map_err(store_err)?
        else {
            let draft = meta_not_found(extraction, trace_id);
            return self.persist(extraction, &draft).await;
        };

        let expected = reference.expected_amount(extraction.payment_type);
        let mut errors = Vec::new();
        if let Some(expected) =
            expected.filter(|exp| (*exp - extraction.amount).abs() > self.tolerance)
        {
            errors.push(amount_mismatch(extraction, expected));
        }

        let key = ControlKey {
            reference_id: reference.id.clone(),
            payment_type: extraction.payment_type,
            competence: extraction.competence.clone(),
        };
        let details = snapshot(&reference, extraction, expected);

        if let Some(control) = self.store.find_control(&key).await.map_err(store_err)? {
            let draft =
                already_validated(extraction, &reference, details, Some(&control.id), trace_id);
            return self.persist(extraction, &draft).await;
        }

        if !errors.is_empty() {
            let draft = ValidationDraft {
                result: NewValidationResult {
                    extraction_id: extraction.id.clone(),
                    reference_id: Some(reference.id.clone()),
                    status: ValidationStatus::Invalid,
                    validation_errors: errors,
                    details,
                    notes: None,
                },
                control: None,
                trace_id,
            };
            return self.persist(extraction, &draft).await;
        }

        let draft = ValidationDraft {
            result: NewValidationResult {
                extraction_id: extraction.id.clone(),
                reference_id: Some(reference.id.clone()),
                status: ValidationStatus::Valid,
                validation_errors: Vec::new(),
                details: details.clone(),
                notes: None,
            },
            control: Some(key.clone()),
            trace_id: trace_id.clone(),
        };

        match self.store.commit(&draft).await {
            Ok(recorded) => Ok(announce(extraction, recorded.result)),
            // Another validation approved the same key between the check and the commit.
            Err(e) if e.is_unique_violation() => {
                tracing::warn!(
                    extraction_id = %extraction.id,
                    file_name = %extraction.file_name,
                    error = %e,
                    "control key approved concurrently"
                );
                let winner = self.store.find_control(&key).await.map_err(store_err)?;
                let draft = already_validated(
                    extraction,
                    &reference,
                    details,
                    winner.as_ref().map(|c| c.id.as_str()),
                    trace_id,
                );
                self.persist(extraction, &draft).await
            }
            Err(e) => Err(store_err(e)),
        }
    }

    /// Validation result history, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::StoreUnavailable` if the query fails.
    pub async fn history(&self, limit: u32) -> Result<Vec<ValidationResult>, ValidationError> {
        Ok(self.store.recent_results(limit).await?)
    }

    async fn persist(
        &self,
        extraction: &Extraction,
        draft: &ValidationDraft,
    ) -> Result<ValidationResult, ValidationError> {
        let recorded = self
            .store
            .commit(draft)
            .await
            .map_err(|source| ValidationError::Store {
                extraction_id: extraction.id.clone(),
                file_name: extraction.file_name.clone(),
                source,
            })?;
        Ok(announce(extraction, recorded.result))
    }
}

fn announce(extraction: &Extraction, result: ValidationResult) -> ValidationResult {
    tracing::info!(
        extraction_id = %extraction.id,
        file_name = %extraction.file_name,
        status = %result.status,
        "validation recorded"
    );
    result
}

fn meta_not_found(extraction: &Extraction, trace_id: Option<String>) -> ValidationDraft {
    ValidationDraft {
        result: NewValidationResult {
            extraction_id: extraction.id.clone(),
            reference_id: None,
            status: ValidationStatus::MetaNotFound,
            validation_errors: vec![FieldError::new("cnpj", META_NOT_FOUND_MESSAGE)],
            details: json!({ "cnpj": extraction.cnpj }),
            notes: None,
        },
        control: None,
        trace_id,
    }
}

fn already_validated(
    extraction: &Extraction,
    reference: &ReferenceRecord,
    details: serde_json::Value,
    control_id: Option<&str>,
    trace_id: Option<String>,
) -> ValidationDraft {
    let mut error = FieldError::new("control", ALREADY_VALIDATED_MESSAGE);
    if let Some(control_id) = control_id {
        error
            .details
            .insert("control_id".to_string(), json!(control_id));
    }
    ValidationDraft {
        result: NewValidationResult {
            extraction_id: extraction.id.clone(),
            reference_id: Some(reference.id.clone()),
            status: ValidationStatus::AlreadyValidated,
            validation_errors: vec![error],
            details,
            notes: None,
        },
        control: None,
        trace_id,
    }
}

fn amount_mismatch(extraction: &Extraction, expected: Decimal) -> FieldError {
    let mut error = FieldError::new(
        "valor",
        format!(
            "amount mismatch for {}: expected {expected}",
            extraction.payment_type
        ),
    );
    error
        .details
        .insert("expected".to_string(), json!(expected.to_string()));
    error
        .details
        .insert("found".to_string(), json!(extraction.amount.to_string()));
    error
}

/// Reference record and compared values at validation time.
fn snapshot(
    reference: &ReferenceRecord,
    extraction: &Extraction,
    expected: Option<Decimal>,
) -> serde_json::Value {
    json!({
        "reference": serde_json::to_value(reference).unwrap_or_default(),
        "expected_amount": expected.map(|d| d.to_string()),
        "amount": extraction.amount.to_string(),
        "payment_type": extraction.payment_type,
        "competence": extraction.competence,
    })
}
