use serde::Serialize;
use vpay_core::entities::Extraction;
use vpay_core::enums::ExtractionStatus;
use vpay_core::validators::normalize_cnpj;
use vpay_db::repos::extraction::ExtractionFilter;

use crate::cli::GlobalFlags;
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct ExtractionListResponse {
    extractions: Vec<Extraction>,
}

pub async fn run(
    status: Option<&str>,
    cnpj: Option<&str>,
    competence: Option<&str>,
    limit: Option<u32>,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let filter = ExtractionFilter {
        status: status
            .map(|value| parse_enum::<ExtractionStatus>(value, "status"))
            .transpose()?,
        cnpj: cnpj.map(normalize_cnpj).transpose()?,
        competence: competence.map(str::to_string),
        limit: Some(effective_limit(limit, flags.limit, ctx.config.general.default_limit)),
        ..Default::default()
    };
    let extractions = ctx.service.list_extractions(&filter).await?;
    output(&ExtractionListResponse { extractions }, flags.format)
}
