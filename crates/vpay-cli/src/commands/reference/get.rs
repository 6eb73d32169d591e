use vpay_core::ids::PREFIX_REFERENCE;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

/// Look up by id when the argument carries the reference prefix, else by CNPJ.
pub async fn run(id_or_cnpj: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let by_id = id_or_cnpj.starts_with(&format!("{PREFIX_REFERENCE}-"));
    let record = if by_id {
        ctx.service.get_reference(id_or_cnpj).await?
    } else {
        ctx.service.get_reference_by_cnpj(id_or_cnpj).await?
    };
    let record = record.ok_or_else(|| anyhow::anyhow!("reference record not found: {id_or_cnpj}"))?;
    output(&record, flags.format)
}
