//! Batch runner over every extraction waiting for validation.

use vpay_core::entities::ValidationResult;
use vpay_core::enums::ExtractionStatus;

use crate::engine::ValidationEngine;
use crate::error::ValidationError;
use crate::store::ValidationStore;

/// One extraction the batch could not validate.
#[derive(Debug)]
pub struct BatchFailure {
    pub extraction_id: String,
    pub file_name: String,
    pub error: ValidationError,
}

/// Outcome of one batch run.
#[derive(Debug)]
pub struct BatchReport {
    /// Shared by the processing log rows of this run.
    pub trace_id: String,
    /// Results durably written, in processing order.
    pub results: Vec<ValidationResult>,
    pub failures: Vec<BatchFailure>,
}

/// Drives the engine over a snapshot of all `extracted` extractions.
///
/// Extractions are processed one at a time, oldest `extracted_at` first.
/// A failure on one extraction is logged and recorded in the report; it
/// never stops the batch.
pub struct BatchRunner<'a, S> {
    engine: &'a ValidationEngine<S>,
}

impl<'a, S: ValidationStore> BatchRunner<'a, S> {
    #[must_use]
    pub const fn new(engine: &'a ValidationEngine<S>) -> Self {
        Self { engine }
    }

    /// # Errors
    ///
    /// Returns `ValidationError::StoreUnavailable` if the pending set cannot
    /// be fetched. Per-extraction failures are reported, not returned.
    pub async fn run(&self) -> Result<BatchReport, ValidationError> {
        let store = self.engine.store();
        let trace_id = store.new_trace_id().await?;
        let pending = store
            .extractions_in_status(ExtractionStatus::Extracted)
            .await?;

        tracing::info!(trace_id = %trace_id, count = pending.len(), "batch validation started");

        let mut results = Vec::with_capacity(pending.len());
        let mut failures = Vec::new();
        for extraction in &pending {
            match self.engine.validate_traced(extraction, Some(&trace_id)).await {
                Ok(result) => results.push(result),
                Err(error) => {
                    tracing::error!(
                        trace_id = %trace_id,
                        extraction_id = %extraction.id,
                        file_name = %extraction.file_name,
                        code = %error.code(),
                        error = %error,
                        "validation failed"
                    );
                    failures.push(BatchFailure {
                        extraction_id: extraction.id.clone(),
                        file_name: extraction.file_name.clone(),
                        error,
                    });
                }
            }
        }

        tracing::info!(
            trace_id = %trace_id,
            validated = results.len(),
            failed = failures.len(),
            "batch validation finished"
        );
        Ok(BatchReport {
            trace_id,
            results,
            failures,
        })
    }

    /// Results for every extraction that got a durable result.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::StoreUnavailable` if the pending set cannot
    /// be fetched.
    pub async fn validate_all_pending(&self) -> Result<Vec<ValidationResult>, ValidationError> {
        Ok(self.run().await?.results)
    }
}
