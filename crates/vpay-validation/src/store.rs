//! The store seam the validation engine runs against.
//!
//! `VpayService` is the production implementation. Tests wrap it to inject
//! failures or to hide committed state from the duplicate check.

use vpay_core::entities::{ControlKey, Extraction, ReferenceRecord, ValidationControl, ValidationResult};
use vpay_core::enums::ExtractionStatus;
use vpay_core::ids::PREFIX_TRACE;
use vpay_db::error::DatabaseError;
use vpay_db::repos::extraction::ExtractionFilter;
use vpay_db::repos::validation::{RecordedValidation, ValidationDraft};
use vpay_db::service::VpayService;

#[allow(async_fn_in_trait)]
pub trait ValidationStore {
    /// Reference record for a normalized CNPJ.
    async fn find_reference(&self, cnpj: &str) -> Result<Option<ReferenceRecord>, DatabaseError>;

    async fn find_control(&self, key: &ControlKey)
    -> Result<Option<ValidationControl>, DatabaseError>;

    async fn load_extraction(&self, id: &str) -> Result<Option<Extraction>, DatabaseError>;

    /// Extractions in `status`, in a stable order.
    async fn extractions_in_status(
        &self,
        status: ExtractionStatus,
    ) -> Result<Vec<Extraction>, DatabaseError>;

    /// Persist a validation atomically. A concurrent approval of the same
    /// control key surfaces as a unique violation.
    async fn commit(&self, draft: &ValidationDraft) -> Result<RecordedValidation, DatabaseError>;

    async fn recent_results(&self, limit: u32) -> Result<Vec<ValidationResult>, DatabaseError>;

    /// Fresh `trc-` id shared by the log rows of one batch run.
    async fn new_trace_id(&self) -> Result<String, DatabaseError>;
}

impl ValidationStore for VpayService {
    async fn find_reference(&self, cnpj: &str) -> Result<Option<ReferenceRecord>, DatabaseError> {
        self.get_reference_by_cnpj(cnpj).await
    }

    async fn find_control(
        &self,
        key: &ControlKey,
    ) -> Result<Option<ValidationControl>, DatabaseError> {
        self.get_control(&key.reference_id, key.payment_type, &key.competence)
            .await
    }

    async fn load_extraction(&self, id: &str) -> Result<Option<Extraction>, DatabaseError> {
        self.get_extraction(id).await
    }

    /// Oldest `extracted_at` first, insertion order on ties.
    async fn extractions_in_status(
        &self,
        status: ExtractionStatus,
    ) -> Result<Vec<Extraction>, DatabaseError> {
        self.list_extractions(&ExtractionFilter::by_status(status))
            .await
    }

    async fn commit(&self, draft: &ValidationDraft) -> Result<RecordedValidation, DatabaseError> {
        self.record_validation(draft).await
    }

    async fn recent_results(&self, limit: u32) -> Result<Vec<ValidationResult>, DatabaseError> {
        self.validation_history(limit).await
    }

    async fn new_trace_id(&self) -> Result<String, DatabaseError> {
        self.db().generate_id(PREFIX_TRACE).await
    }
}

impl<T: ValidationStore + ?Sized> ValidationStore for &T {
    async fn find_reference(&self, cnpj: &str) -> Result<Option<ReferenceRecord>, DatabaseError> {
        (**self).find_reference(cnpj).await
    }

    async fn find_control(
        &self,
        key: &ControlKey,
    ) -> Result<Option<ValidationControl>, DatabaseError> {
        (**self).find_control(key).await
    }

    async fn load_extraction(&self, id: &str) -> Result<Option<Extraction>, DatabaseError> {
        (**self).load_extraction(id).await
    }

    async fn extractions_in_status(
        &self,
        status: ExtractionStatus,
    ) -> Result<Vec<Extraction>, DatabaseError> {
        (**self).extractions_in_status(status).await
    }

    async fn commit(&self, draft: &ValidationDraft) -> Result<RecordedValidation, DatabaseError> {
        (**self).commit(draft).await
    }

    async fn recent_results(&self, limit: u32) -> Result<Vec<ValidationResult>, DatabaseError> {
        (**self).recent_results(limit).await
    }

    async fn new_trace_id(&self) -> Result<String, DatabaseError> {
        (**self).new_trace_id().await
    }
}
