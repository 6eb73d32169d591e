use clap::{Args, Subcommand, ValueEnum};

use crate::cli::subcommands::{ExtractionCommands, ReferenceCommands};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Create the local store and apply migrations.
    Init,
    /// Reference records (expected amounts per provider).
    Reference {
        #[command(subcommand)]
        action: ReferenceCommands,
    },
    /// Extracted invoice data.
    Extraction {
        #[command(subcommand)]
        action: ExtractionCommands,
    },
    /// Validate one extraction.
    Validate(ValidateArgs),
    /// Validate every extraction in status `extracted`.
    #[command(name = "validate-pending")]
    ValidatePending,
    /// Most recent validation results.
    History,
    /// Processing log entries.
    Logs(LogsArgs),
    /// Dump the JSON Schema of an import record.
    Schema(SchemaArgs),
}

/// Arguments for `vpay validate`.
#[derive(Clone, Debug, Args)]
pub struct ValidateArgs {
    /// Extraction ID (`ext-...`).
    pub extraction_id: String,
}

/// Arguments for `vpay logs`.
#[derive(Clone, Debug, Args)]
pub struct LogsArgs {
    /// Only entries from this batch trace (`trc-...`).
    #[arg(long)]
    pub trace: Option<String>,
    /// Only entries at this level.
    #[arg(long)]
    pub level: Option<String>,
    /// Only entries from this component.
    #[arg(long)]
    pub component: Option<String>,
}

/// Arguments for `vpay schema`.
#[derive(Clone, Debug, Args)]
pub struct SchemaArgs {
    #[arg(value_enum)]
    pub record: SchemaRecord,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum SchemaRecord {
    Extraction,
    Reference,
}
