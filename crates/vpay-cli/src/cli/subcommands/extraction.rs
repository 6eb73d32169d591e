use clap::Subcommand;

/// Extraction commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ExtractionCommands {
    /// Import extraction records from a JSON file (one object or an array).
    Import { file: String },
    /// Get an extraction by ID.
    Get { id: String },
    /// List extractions.
    List {
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        cnpj: Option<String>,
        #[arg(long)]
        competence: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
}
