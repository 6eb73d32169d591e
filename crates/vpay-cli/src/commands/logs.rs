use serde::Serialize;
use vpay_core::entities::ProcessingLog;
use vpay_core::enums::LogLevel;
use vpay_db::repos::processing_log::LogFilter;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::LogsArgs;
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct LogsResponse {
    logs: Vec<ProcessingLog>,
}

/// Handle `vpay logs`: newest entries first.
pub async fn handle(args: &LogsArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let filter = LogFilter {
        component: args.component.clone(),
        level: args
            .level
            .as_deref()
            .map(|level| parse_enum::<LogLevel>(level, "level"))
            .transpose()?,
        trace_id: args.trace.clone(),
        limit: Some(effective_limit(None, flags.limit, ctx.config.general.default_limit)),
        ..Default::default()
    };
    let logs = ctx.service.query_logs(&filter).await?;
    output(&LogsResponse { logs }, flags.format)
}
