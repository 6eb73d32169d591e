//! Extraction repository.
//!
//! Records arrive from the extraction pipeline and are checked against its
//! output contract on insert. After that only the status (and its error
//! message) normally changes, driven by the validation commit.

use chrono::SubsecRound;

use vpay_core::entities::{Extraction, NewExtraction};
use vpay_core::enums::{ExtractionStatus, PaymentType};
use vpay_core::ids::PREFIX_EXTRACTION;

use crate::error::DatabaseError;
use crate::helpers::{
    format_datetime, get_opt_string, now, parse_datetime, parse_decimal, parse_enum,
};
use crate::repos::{Conditions, SortOrder, order_and_limit};
use crate::service::VpayService;
use crate::updates::extraction::ExtractionUpdate;

const COLUMNS: &str = "id, file_name, raw_text, cnpj, amount, competence, payee_name, description, payment_type, status, confidence_score, error_message, extracted_at";

/// Filter criteria for extraction queries, ordered on `extracted_at`.
#[derive(Debug, Default, Clone)]
pub struct ExtractionFilter {
    pub status: Option<ExtractionStatus>,
    pub cnpj: Option<String>,
    pub payment_type: Option<PaymentType>,
    pub competence: Option<String>,
    pub file_name: Option<String>,
    pub order: SortOrder,
    pub limit: Option<u32>,
}

impl ExtractionFilter {
    /// All extractions in `status`, oldest first.
    #[must_use]
    pub fn by_status(status: ExtractionStatus) -> Self {
        Self {
            status: Some(status),
            order: SortOrder::Asc,
            ..Self::default()
        }
    }
}

fn row_to_extraction(row: &libsql::Row) -> Result<Extraction, DatabaseError> {
    Ok(Extraction {
        id: row.get::<String>(0)?,
        file_name: row.get::<String>(1)?,
        raw_text: row.get::<String>(2)?,
        cnpj: row.get::<String>(3)?,
        amount: parse_decimal(&row.get::<String>(4)?)?,
        competence: row.get::<String>(5)?,
        payee_name: row.get::<String>(6)?,
        description: row.get::<String>(7)?,
        payment_type: parse_enum(&row.get::<String>(8)?)?,
        status: parse_enum(&row.get::<String>(9)?)?,
        confidence_score: parse_decimal(&row.get::<String>(10)?)?,
        error_message: get_opt_string(row, 11)?,
        extracted_at: parse_datetime(&row.get::<String>(12)?)?,
    })
}

impl VpayService {
    /// Validate, normalize, and insert an extraction record.
    ///
    /// `extracted_at` defaults to now when the pipeline did not supply it.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidInput` when the record breaks the
    /// extraction output contract.
    pub async fn create_extraction(
        &self,
        record: NewExtraction,
    ) -> Result<Extraction, DatabaseError> {
        let record = record.into_validated()?;
        let extracted_at = record.extracted_at.unwrap_or_else(now).trunc_subsecs(6);
        let id = self.db().generate_id(PREFIX_EXTRACTION).await?;

        self.db()
            .execute_with(
                "INSERT INTO extractions (id, file_name, raw_text, cnpj, amount, competence, payee_name, description, payment_type, status, confidence_score, error_message, extracted_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                || {
                    libsql::params![
                        id.as_str(),
                        record.file_name.as_str(),
                        record.raw_text.as_str(),
                        record.cnpj.as_str(),
                        record.amount.to_string(),
                        record.competence.as_str(),
                        record.payee_name.as_str(),
                        record.description.as_str(),
                        record.payment_type.as_str(),
                        record.status.as_str(),
                        record.confidence_score.to_string(),
                        record.error_message.as_deref(),
                        format_datetime(&extracted_at)
                    ]
                },
            )
            .await?;

        tracing::debug!(
            extraction_id = %id,
            file_name = %record.file_name,
            status = %record.status,
            "extraction stored"
        );

        Ok(Extraction {
            id,
            file_name: record.file_name,
            raw_text: record.raw_text,
            cnpj: record.cnpj,
            amount: record.amount,
            competence: record.competence,
            payee_name: record.payee_name,
            description: record.description,
            payment_type: record.payment_type,
            status: record.status,
            confidence_score: record.confidence_score,
            error_message: record.error_message,
            extracted_at,
        })
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn get_extraction(&self, id: &str) -> Result<Option<Extraction>, DatabaseError> {
        let sql = format!("SELECT {COLUMNS} FROM extractions WHERE id = ?1");
        let mut rows = self.db().query_with(&sql, || [id]).await?;
        rows.next()
            .await?
            .map(|row| row_to_extraction(&row))
            .transpose()
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_extractions(
        &self,
        filter: &ExtractionFilter,
    ) -> Result<Vec<Extraction>, DatabaseError> {
        let mut conditions = Conditions::default();
        conditions.eq_opt("status", filter.status.map(ExtractionStatus::as_str));
        conditions.eq_opt("cnpj", filter.cnpj.clone());
        conditions.eq_opt("payment_type", filter.payment_type.map(PaymentType::as_str));
        conditions.eq_opt("competence", filter.competence.clone());
        conditions.eq_opt("file_name", filter.file_name.clone());
        let (where_clause, params) = conditions.into_sql();

        let sql = format!(
            "SELECT {COLUMNS} FROM extractions {where_clause} {}",
            order_and_limit("extracted_at", filter.order, filter.limit)
        );
        let mut rows = self
            .db()
            .query_with(&sql, || libsql::params_from_iter(params.clone()))
            .await?;

        let mut extractions = Vec::new();
        while let Some(row) = rows.next().await? {
            extractions.push(row_to_extraction(&row)?);
        }
        Ok(extractions)
    }

    /// Apply the `Some` fields of `update` and return the stored extraction.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no extraction has this id.
    pub async fn update_extraction(
        &self,
        id: &str,
        update: ExtractionUpdate,
    ) -> Result<Extraction, DatabaseError> {
        let not_found = || DatabaseError::NotFound {
            entity_type: "extraction",
            id: id.to_string(),
        };
        if update.is_empty() {
            return self.get_extraction(id).await?.ok_or_else(not_found);
        }

        let mut sets = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(status) = update.status {
            params.push(status.as_str().into());
            sets.push(format!("status = ?{}", params.len()));
        }
        if let Some(ref error_message) = update.error_message {
            params.push(error_message.as_deref().into());
            sets.push(format!("error_message = ?{}", params.len()));
        }
        if let Some(ref raw_text) = update.raw_text {
            params.push(raw_text.as_str().into());
            sets.push(format!("raw_text = ?{}", params.len()));
        }
        if let Some(ref description) = update.description {
            params.push(description.as_str().into());
            sets.push(format!("description = ?{}", params.len()));
        }

        params.push(id.into());
        let sql = format!(
            "UPDATE extractions SET {} WHERE id = ?{}",
            sets.join(", "),
            params.len()
        );

        let changed = self
            .db()
            .execute_with(&sql, || libsql::params_from_iter(params.clone()))
            .await?;
        if changed == 0 {
            return Err(not_found());
        }

        self.get_extraction(id).await?.ok_or_else(not_found)
    }
}
