use serde::Serialize;
use vpay_db::repos::extraction::ExtractionFilter;
use vpay_db::repos::reference::ReferenceFilter;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct InitResponse {
    database: String,
    reference_records: usize,
    extractions: usize,
}

/// Handle `vpay init`. The store and its migrations are applied when the
/// context opens; this reports what the store holds.
pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let references = ctx
        .service
        .list_references(&ReferenceFilter::default())
        .await?;
    let extractions = ctx
        .service
        .list_extractions(&ExtractionFilter::default())
        .await?;

    output(
        &InitResponse {
            database: ctx.config.database.path.display().to_string(),
            reference_records: references.len(),
            extractions: extractions.len(),
        },
        flags.format,
    )
}
