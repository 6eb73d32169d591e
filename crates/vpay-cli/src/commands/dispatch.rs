use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Init => commands::init::handle(ctx, flags).await,
        Commands::Reference { action } => commands::reference::handle(&action, ctx, flags).await,
        Commands::Extraction { action } => commands::extraction::handle(&action, ctx, flags).await,
        Commands::Validate(args) => commands::validate::handle(&args, ctx, flags).await,
        Commands::ValidatePending => commands::validate::handle_pending(ctx, flags).await,
        Commands::History => commands::history::handle(ctx, flags).await,
        Commands::Logs(args) => commands::logs::handle(&args, ctx, flags).await,
        Commands::Schema(args) => commands::schema::handle(&args, flags),
    }
}
