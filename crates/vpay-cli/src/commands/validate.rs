use serde::Serialize;
use vpay_core::entities::ValidationResult;
use vpay_core::errors::ErrorSeverity;
use vpay_validation::{BatchFailure, BatchRunner, ValidationError};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ValidateArgs;
use crate::context::AppContext;
use crate::output::output;

/// Message shown for an extraction the store could not validate. The
/// underlying error is in the log.
const SYSTEM_FAILURE_MESSAGE: &str = "validation could not be completed";

#[derive(Debug, Serialize)]
struct BatchResponse {
    trace_id: String,
    validated: usize,
    failed: usize,
    results: Vec<ValidationResult>,
    failures: Vec<FailureRow>,
}

#[derive(Debug, Serialize)]
struct FailureRow {
    extraction_id: String,
    file_name: String,
    code: &'static str,
    severity: ErrorSeverity,
    message: &'static str,
}

impl From<BatchFailure> for FailureRow {
    fn from(failure: BatchFailure) -> Self {
        Self {
            code: failure.error.code().as_str(),
            severity: failure.error.severity(),
            extraction_id: failure.extraction_id,
            file_name: failure.file_name,
            message: SYSTEM_FAILURE_MESSAGE,
        }
    }
}

/// Handle `vpay validate <extraction-id>`.
///
/// Business rejections are printed like approvals. Store failures become a
/// command error.
pub async fn handle(args: &ValidateArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match ctx.engine().validate_by_id(&args.extraction_id).await {
        Ok(result) => output(&result, flags.format),
        Err(ValidationError::ExtractionNotFound(id)) => {
            anyhow::bail!("extraction not found: {id}")
        }
        Err(error) => {
            let code = error.code();
            Err(anyhow::Error::new(error)
                .context(format!("{SYSTEM_FAILURE_MESSAGE} for {} (code {code})", args.extraction_id)))
        }
    }
}

/// Handle `vpay validate-pending`.
pub async fn handle_pending(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let engine = ctx.engine();
    let report = BatchRunner::new(&engine).run().await?;

    let response = BatchResponse {
        trace_id: report.trace_id,
        validated: report.results.len(),
        failed: report.failures.len(),
        results: report.results,
        failures: report.failures.into_iter().map(FailureRow::from).collect(),
    };
    output(&response, flags.format)
}
