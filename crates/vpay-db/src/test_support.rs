//! Shared test utilities for vpay-db tests.

pub(crate) mod helpers {
    use std::str::FromStr;

    use rust_decimal::Decimal;
    use vpay_core::entities::{Extraction, NewExtraction, NewReferenceRecord, ReferenceRecord};
    use vpay_core::enums::{ExtractionStatus, PaymentType};

    use crate::retry::RetryConfig;
    use crate::service::VpayService;

    /// Create an in-memory VpayService with retries disabled.
    pub async fn test_service() -> VpayService {
        VpayService::new_local(":memory:", RetryConfig::no_retry())
            .await
            .unwrap()
    }

    pub fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    pub fn new_reference(cnpj: &str, expected_pc: Option<&str>) -> NewReferenceRecord {
        NewReferenceRecord {
            cnpj: cnpj.to_string(),
            provider_name: "Clinica Exemplo".to_string(),
            payment_type: PaymentType::Pc,
            pix_key: "pix@example.com".to_string(),
            expected_pc: expected_pc.map(dec),
            expected_bonus: None,
            expected_reembolso: None,
        }
    }

    pub fn new_extraction(cnpj: &str, amount: &str, competence: &str) -> NewExtraction {
        NewExtraction {
            file_name: format!("nf-{cnpj}-{}.pdf", competence.replace('/', "-")),
            raw_text: String::new(),
            cnpj: cnpj.to_string(),
            amount: dec(amount),
            competence: competence.to_string(),
            payee_name: "Clinica Exemplo".to_string(),
            description: String::new(),
            payment_type: PaymentType::Pc,
            status: ExtractionStatus::Extracted,
            confidence_score: dec("0.95"),
            error_message: None,
            extracted_at: None,
        }
    }

    pub async fn seed_reference(svc: &VpayService, cnpj: &str) -> ReferenceRecord {
        svc.create_reference(new_reference(cnpj, Some("1000.00")))
            .await
            .unwrap()
    }

    pub async fn seed_extraction(svc: &VpayService, cnpj: &str, amount: &str) -> Extraction {
        svc.create_extraction(new_extraction(cnpj, amount, "08/2024"))
            .await
            .unwrap()
    }
}
