mod add;
mod get;
mod list;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ReferenceCommands;
use crate::context::AppContext;

/// Handle `vpay reference`.
pub async fn handle(action: &ReferenceCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        ReferenceCommands::Add {
            cnpj,
            provider_name,
            payment_type,
            pix_key,
            expected_pc,
            expected_bonus,
            expected_reembolso,
        } => {
            let args = add::AddArgs {
                cnpj,
                provider_name,
                payment_type: payment_type.as_deref(),
                pix_key,
                expected_pc: expected_pc.as_deref(),
                expected_bonus: expected_bonus.as_deref(),
                expected_reembolso: expected_reembolso.as_deref(),
            };
            add::run(args, ctx, flags).await
        }
        ReferenceCommands::Get { id_or_cnpj } => get::run(id_or_cnpj, ctx, flags).await,
        ReferenceCommands::List {
            payment_type,
            limit,
        } => list::run(payment_type.as_deref(), *limit, ctx, flags).await,
    }
}
