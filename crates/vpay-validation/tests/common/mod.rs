//! Fixtures and fault-injecting stores shared by the engine tests.

#![allow(dead_code)]

use std::str::FromStr;

use rust_decimal::Decimal;
use vpay_core::entities::{
    ControlKey, Extraction, NewExtraction, NewReferenceRecord, ReferenceRecord, ValidationControl,
    ValidationResult,
};
use vpay_core::enums::{ExtractionStatus, PaymentType};
use vpay_db::error::DatabaseError;
use vpay_db::repos::validation::{RecordedValidation, ValidationDraft};
use vpay_db::retry::RetryConfig;
use vpay_db::service::VpayService;
use vpay_validation::ValidationStore;

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

pub fn tolerance() -> Decimal {
    dec("0.01")
}

pub async fn service() -> VpayService {
    VpayService::new_local(":memory:", RetryConfig::no_retry())
        .await
        .unwrap()
}

pub async fn reference(
    svc: &VpayService,
    cnpj: &str,
    expected: &[(PaymentType, &str)],
) -> ReferenceRecord {
    let mut record = NewReferenceRecord {
        cnpj: cnpj.to_string(),
        provider_name: "Clinica Exemplo".to_string(),
        payment_type: PaymentType::Pc,
        pix_key: "pix@example.com".to_string(),
        expected_pc: None,
        expected_bonus: None,
        expected_reembolso: None,
    };
    for (payment_type, amount) in expected {
        let amount = Some(dec(amount));
        match payment_type {
            PaymentType::Pc => record.expected_pc = amount,
            PaymentType::Bonus => record.expected_bonus = amount,
            PaymentType::Reembolso => record.expected_reembolso = amount,
        }
    }
    svc.create_reference(record).await.unwrap()
}

pub async fn extraction(
    svc: &VpayService,
    cnpj: &str,
    amount: &str,
    payment_type: PaymentType,
    competence: &str,
) -> Extraction {
    svc.create_extraction(NewExtraction {
        file_name: format!("nf-{cnpj}-{}.pdf", competence.replace('/', "")),
        raw_text: String::new(),
        cnpj: cnpj.to_string(),
        amount: dec(amount),
        competence: competence.to_string(),
        payee_name: "Clinica Exemplo".to_string(),
        description: String::new(),
        payment_type,
        status: ExtractionStatus::Extracted,
        confidence_score: dec("0.9"),
        error_message: None,
        extracted_at: None,
    })
    .await
    .unwrap()
}

/// Fails every reference lookup for one CNPJ.
pub struct FlakyStore<'a> {
    pub inner: &'a VpayService,
    pub failing_cnpj: String,
}

impl ValidationStore for FlakyStore<'_> {
    async fn find_reference(&self, cnpj: &str) -> Result<Option<ReferenceRecord>, DatabaseError> {
        if cnpj == self.failing_cnpj {
            return Err(DatabaseError::Query("injected lookup failure".into()));
        }
        self.inner.find_reference(cnpj).await
    }

    async fn find_control(
        &self,
        key: &ControlKey,
    ) -> Result<Option<ValidationControl>, DatabaseError> {
        self.inner.find_control(key).await
    }

    async fn load_extraction(&self, id: &str) -> Result<Option<Extraction>, DatabaseError> {
        self.inner.load_extraction(id).await
    }

    async fn extractions_in_status(
        &self,
        status: ExtractionStatus,
    ) -> Result<Vec<Extraction>, DatabaseError> {
        self.inner.extractions_in_status(status).await
    }

    async fn commit(&self, draft: &ValidationDraft) -> Result<RecordedValidation, DatabaseError> {
        self.inner.commit(draft).await
    }

    async fn recent_results(&self, limit: u32) -> Result<Vec<ValidationResult>, DatabaseError> {
        self.inner.recent_results(limit).await
    }

    async fn new_trace_id(&self) -> Result<String, DatabaseError> {
        self.inner.new_trace_id().await
    }
}

/// Never sees committed control entries, as if another validator approved
/// the same key between the duplicate check and the commit.
pub struct BlindControlStore<'a> {
    pub inner: &'a VpayService,
}

impl ValidationStore for BlindControlStore<'_> {
    async fn find_reference(&self, cnpj: &str) -> Result<Option<ReferenceRecord>, DatabaseError> {
        self.inner.find_reference(cnpj).await
    }

    async fn find_control(
        &self,
        _key: &ControlKey,
    ) -> Result<Option<ValidationControl>, DatabaseError> {
        Ok(None)
    }

    async fn load_extraction(&self, id: &str) -> Result<Option<Extraction>, DatabaseError> {
        self.inner.load_extraction(id).await
    }

    async fn extractions_in_status(
        &self,
        status: ExtractionStatus,
    ) -> Result<Vec<Extraction>, DatabaseError> {
        self.inner.extractions_in_status(status).await
    }

    async fn commit(&self, draft: &ValidationDraft) -> Result<RecordedValidation, DatabaseError> {
        self.inner.commit(draft).await
    }

    async fn recent_results(&self, limit: u32) -> Result<Vec<ValidationResult>, DatabaseError> {
        self.inner.recent_results(limit).await
    }

    async fn new_trace_id(&self) -> Result<String, DatabaseError> {
        self.inner.new_trace_id().await
    }
}

/// Fails every commit, so nothing is ever recorded.
pub struct FailingCommitStore<'a> {
    pub inner: &'a VpayService,
}

impl ValidationStore for FailingCommitStore<'_> {
    async fn find_reference(&self, cnpj: &str) -> Result<Option<ReferenceRecord>, DatabaseError> {
        self.inner.find_reference(cnpj).await
    }

    async fn find_control(
        &self,
        key: &ControlKey,
    ) -> Result<Option<ValidationControl>, DatabaseError> {
        self.inner.find_control(key).await
    }

    async fn load_extraction(&self, id: &str) -> Result<Option<Extraction>, DatabaseError> {
        self.inner.load_extraction(id).await
    }

    async fn extractions_in_status(
        &self,
        status: ExtractionStatus,
    ) -> Result<Vec<Extraction>, DatabaseError> {
        self.inner.extractions_in_status(status).await
    }

    async fn commit(&self, _draft: &ValidationDraft) -> Result<RecordedValidation, DatabaseError> {
        Err(DatabaseError::Query("injected commit failure".into()))
    }

    async fn recent_results(&self, limit: u32) -> Result<Vec<ValidationResult>, DatabaseError> {
        self.inner.recent_results(limit).await
    }

    async fn new_trace_id(&self) -> Result<String, DatabaseError> {
        self.inner.new_trace_id().await
    }
}
