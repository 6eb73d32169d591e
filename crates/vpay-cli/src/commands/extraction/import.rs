use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use vpay_core::entities::{Extraction, NewExtraction};
use vpay_db::error::DatabaseError;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct ImportResponse {
    imported: Vec<Extraction>,
    rejected: Vec<Rejection>,
}

/// A record that failed the import contract. Other records still import.
#[derive(Debug, Serialize)]
struct Rejection {
    index: usize,
    file_name: String,
    error: String,
}

/// Accept either a single record or an array of records.
fn parse_records(contents: &str) -> anyhow::Result<Vec<NewExtraction>> {
    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum Payload {
        Many(Vec<NewExtraction>),
        One(Box<NewExtraction>),
    }

    let payload: Payload =
        serde_json::from_str(contents).context("import file is not a valid extraction record or array")?;
    Ok(match payload {
        Payload::Many(records) => records,
        Payload::One(record) => vec![*record],
    })
}

pub async fn run(file: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let path = Path::new(file);
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let records = parse_records(&contents)?;

    let mut imported = Vec::with_capacity(records.len());
    let mut rejected = Vec::new();
    for (index, record) in records.into_iter().enumerate() {
        let file_name = record.file_name.clone();
        match ctx.service.create_extraction(record).await {
            Ok(extraction) => imported.push(extraction),
            Err(DatabaseError::InvalidInput(error)) => {
                tracing::warn!(index, file_name = %file_name, error = %error, "extraction rejected");
                rejected.push(Rejection {
                    index,
                    file_name,
                    error: error.to_string(),
                });
            }
            Err(error) => {
                return Err(anyhow::Error::new(error)
                    .context(format!("import stopped at record {index} ({file_name})")));
            }
        }
    }

    tracing::info!(imported = imported.len(), rejected = rejected.len(), "import finished");
    output(&ImportResponse { imported, rejected }, flags.format)
}

#[cfg(test)]
mod tests {
    use vpay_core::enums::{ExtractionStatus, PaymentType};

    use super::parse_records;

    const RECORD: &str = r#"{
        "file_name": "nf-0824.pdf",
        "cnpj": "12.345.678/9012-34",
        "valor": "1000.00",
        "competence": "08/2024",
        "payee_name": "Clinica Exemplo",
        "payment_type": "reembolso",
        "confidence_score": "0.95"
    }"#;

    #[test]
    fn single_object_is_one_record() {
        let records = parse_records(RECORD).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].amount.to_string(), "1000.00");
        assert_eq!(records[0].payment_type, PaymentType::Reembolso);
        assert_eq!(records[0].status, ExtractionStatus::Extracted);
    }

    #[test]
    fn array_keeps_order() {
        let second = RECORD.replace("nf-0824.pdf", "nf-0924.pdf");
        let records = parse_records(&format!("[{RECORD}, {second}]")).unwrap();
        let names: Vec<_> = records.iter().map(|r| r.file_name.as_str()).collect();
        assert_eq!(names, ["nf-0824.pdf", "nf-0924.pdf"]);
    }

    #[test]
    fn record_without_amount_is_rejected() {
        let broken = RECORD.replace(r#""valor": "1000.00","#, "");
        assert!(parse_records(&broken).is_err());
    }
}
