use clap::Subcommand;

/// Reference record commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ReferenceCommands {
    /// Register a provider's reference record.
    Add {
        #[arg(long)]
        cnpj: String,
        #[arg(long)]
        provider_name: String,
        /// Provider's primary payment type: pc, reembolso, bonus
        #[arg(long = "type")]
        payment_type: Option<String>,
        #[arg(long)]
        pix_key: String,
        #[arg(long)]
        expected_pc: Option<String>,
        #[arg(long)]
        expected_bonus: Option<String>,
        #[arg(long)]
        expected_reembolso: Option<String>,
    },
    /// Get a reference record by ID or CNPJ.
    Get { id_or_cnpj: String },
    /// List reference records.
    List {
        #[arg(long = "type")]
        payment_type: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
}
