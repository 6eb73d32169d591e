use serde::Serialize;
use vpay_core::entities::ReferenceRecord;
use vpay_core::enums::PaymentType;
use vpay_db::repos::reference::ReferenceFilter;

use crate::cli::GlobalFlags;
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct ReferenceListResponse {
    references: Vec<ReferenceRecord>,
}

pub async fn run(
    payment_type: Option<&str>,
    limit: Option<u32>,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let filter = ReferenceFilter {
        payment_type: payment_type
            .map(|value| parse_enum::<PaymentType>(value, "type"))
            .transpose()?,
        limit: Some(effective_limit(limit, flags.limit, ctx.config.general.default_limit)),
        ..Default::default()
    };
    let references = ctx.service.list_references(&filter).await?;
    output(&ReferenceListResponse { references }, flags.format)
}
