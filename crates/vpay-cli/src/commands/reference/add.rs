use vpay_core::entities::NewReferenceRecord;
use vpay_core::enums::PaymentType;

use crate::cli::GlobalFlags;
use crate::commands::shared::parse::{parse_enum, parse_optional_amount};
use crate::context::AppContext;
use crate::output::output;

#[derive(Clone, Copy, Debug)]
pub struct AddArgs<'a> {
    pub cnpj: &'a str,
    pub provider_name: &'a str,
    pub payment_type: Option<&'a str>,
    pub pix_key: &'a str,
    pub expected_pc: Option<&'a str>,
    pub expected_bonus: Option<&'a str>,
    pub expected_reembolso: Option<&'a str>,
}

impl AddArgs<'_> {
    fn into_record(self) -> anyhow::Result<NewReferenceRecord> {
        Ok(NewReferenceRecord {
            cnpj: self.cnpj.to_string(),
            provider_name: self.provider_name.to_string(),
            payment_type: self
                .payment_type
                .map(|value| parse_enum::<PaymentType>(value, "type"))
                .transpose()?
                .unwrap_or_default(),
            pix_key: self.pix_key.to_string(),
            expected_pc: parse_optional_amount(self.expected_pc, "expected-pc")?,
            expected_bonus: parse_optional_amount(self.expected_bonus, "expected-bonus")?,
            expected_reembolso: parse_optional_amount(self.expected_reembolso, "expected-reembolso")?,
        })
    }
}

pub async fn run(args: AddArgs<'_>, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let record = args.into_record()?;
    let created = ctx.service.create_reference(record).await?;
    output(&created, flags.format)
}
