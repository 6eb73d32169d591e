use serde::Serialize;
use vpay_core::entities::ValidationResult;

use crate::cli::GlobalFlags;
use crate::commands::shared::limit::effective_limit;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct HistoryResponse {
    results: Vec<ValidationResult>,
}

/// Handle `vpay history`: newest validation results first.
pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let limit = effective_limit(None, flags.limit, ctx.config.general.default_limit);
    let results = ctx.engine().history(limit).await?;
    output(&HistoryResponse { results }, flags.format)
}
