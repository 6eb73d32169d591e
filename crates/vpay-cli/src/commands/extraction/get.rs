use serde::Serialize;
use vpay_core::entities::{Extraction, ValidationResult};
use vpay_db::repos::validation::ResultFilter;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct ExtractionDetailResponse {
    extraction: Extraction,
    validations: Vec<ValidationResult>,
}

pub async fn run(id: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let extraction = ctx
        .service
        .get_extraction(id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("extraction not found: {id}"))?;
    let validations = ctx
        .service
        .list_validation_results(&ResultFilter {
            extraction_id: Some(extraction.id.clone()),
            ..Default::default()
        })
        .await?;

    output(
        &ExtractionDetailResponse {
            extraction,
            validations,
        },
        flags.format,
    )
}
