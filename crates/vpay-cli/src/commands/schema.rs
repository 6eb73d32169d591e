use schemars::schema_for;
use vpay_core::entities::{NewExtraction, NewReferenceRecord};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::{SchemaArgs, SchemaRecord};

/// Handle `vpay schema`. Needs no store.
pub fn handle(args: &SchemaArgs, _flags: &GlobalFlags) -> anyhow::Result<()> {
    let schema = match args.record {
        SchemaRecord::Extraction => schema_for!(NewExtraction),
        SchemaRecord::Reference => schema_for!(NewReferenceRecord),
    };
    // Schemas are always JSON; table output would flatten them.
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
