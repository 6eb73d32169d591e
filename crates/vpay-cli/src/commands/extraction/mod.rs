mod get;
mod import;
mod list;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ExtractionCommands;
use crate::context::AppContext;

/// Handle `vpay extraction`.
pub async fn handle(action: &ExtractionCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        ExtractionCommands::Import { file } => import::run(file, ctx, flags).await,
        ExtractionCommands::Get { id } => get::run(id, ctx, flags).await,
        ExtractionCommands::List {
            status,
            cnpj,
            competence,
            limit,
        } => {
            list::run(
                status.as_deref(),
                cnpj.as_deref(),
                competence.as_deref(),
                *limit,
                ctx,
                flags,
            )
            .await
        }
    }
}
