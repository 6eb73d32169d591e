//! Validation result repository and the transactional validation commit.
//!
//! Results are immutable once written. [`VpayService::record_validation`]
//! is the unit the validation engine commits through: result row, control
//! entry (approvals only), extraction status, and processing log land in
//! one libSQL transaction or not at all.

use chrono::{DateTime, Utc};
use serde::Serialize;

use vpay_core::entities::{ControlKey, FieldError, ProcessingLog, ValidationControl, ValidationResult};
use vpay_core::enums::{ExtractionStatus, LogLevel, ValidationStatus};
use vpay_core::ids::{PREFIX_VALIDATION_CONTROL, PREFIX_PROCESSING_LOG, PREFIX_VALIDATION_RESULT};

use crate::error::DatabaseError;
use crate::helpers::{
    bool_to_sql, format_datetime, get_opt_string, now, parse_datetime, parse_enum, parse_json_or,
};
use crate::repos::control::{INSERT_CONTROL_SQL, control_params, duplicate_message};
use crate::repos::processing_log::{INSERT_LOG_SQL, NewProcessingLog, log_params};
use crate::repos::{Conditions, SortOrder, order_and_limit};
use crate::retry::with_retry;
use crate::service::VpayService;

const COLUMNS: &str =
    "id, extraction_id, reference_id, is_valid, status, validation_errors, details, notes, validated_at";

const INSERT_RESULT_SQL: &str = "INSERT INTO validation_results (id, extraction_id, reference_id, is_valid, status, validation_errors, details, notes, validated_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)";

/// Component name on processing log rows written by the validation commit.
pub const VALIDATION_COMPONENT: &str = "validation_engine";

/// A validation outcome before the store assigns its id and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewValidationResult {
    pub extraction_id: String,
    pub reference_id: Option<String>,
    pub status: ValidationStatus,
    pub validation_errors: Vec<FieldError>,
    pub details: serde_json::Value,
    pub notes: Option<String>,
}

impl NewValidationResult {
    fn into_result(self, id: String, validated_at: DateTime<Utc>) -> ValidationResult {
        ValidationResult {
            id,
            extraction_id: self.extraction_id,
            reference_id: self.reference_id,
            is_valid: self.status.is_valid(),
            status: self.status,
            validation_errors: self.validation_errors,
            details: self.details,
            notes: self.notes,
            validated_at,
        }
    }
}

/// Everything one validation commits.
///
/// `control` must be `Some` exactly when the result status is `valid`.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationDraft {
    pub result: NewValidationResult,
    pub control: Option<ControlKey>,
    /// Shared by all rows of one batch run.
    pub trace_id: Option<String>,
}

/// What [`VpayService::record_validation`] persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedValidation {
    pub result: ValidationResult,
    pub control: Option<ValidationControl>,
    pub log: ProcessingLog,
}

/// Filter criteria for validation result queries, ordered on `validated_at`.
#[derive(Debug, Default, Clone)]
pub struct ResultFilter {
    pub extraction_id: Option<String>,
    pub reference_id: Option<String>,
    pub status: Option<ValidationStatus>,
    pub is_valid: Option<bool>,
    pub order: SortOrder,
    pub limit: Option<u32>,
}

fn row_to_result(row: &libsql::Row) -> Result<ValidationResult, DatabaseError> {
    let errors = parse_json_or(get_opt_string(row, 5)?.as_deref(), serde_json::json!([]))?;
    Ok(ValidationResult {
        id: row.get::<String>(0)?,
        extraction_id: row.get::<String>(1)?,
        reference_id: get_opt_string(row, 2)?,
        is_valid: row.get::<i64>(3)? != 0,
        status: parse_enum(&row.get::<String>(4)?)?,
        validation_errors: serde_json::from_value(errors)
            .map_err(|e| DatabaseError::Query(format!("Invalid validation_errors: {e}")))?,
        details: parse_json_or(get_opt_string(row, 6)?.as_deref(), serde_json::json!({}))?,
        notes: get_opt_string(row, 7)?,
        validated_at: parse_datetime(&row.get::<String>(8)?)?,
    })
}

fn result_params(result: &ValidationResult) -> Result<libsql::params::Params, DatabaseError> {
    let errors = serde_json::to_string(&result.validation_errors)
        .map_err(|e| DatabaseError::Other(e.into()))?;
    Ok(libsql::params::Params::Positional(vec![
        libsql::Value::from(result.id.as_str()),
        libsql::Value::from(result.extraction_id.as_str()),
        libsql::Value::from(result.reference_id.as_deref()),
        libsql::Value::from(bool_to_sql(result.is_valid)),
        libsql::Value::from(result.status.as_str()),
        libsql::Value::from(errors),
        libsql::Value::from(result.details.to_string()),
        libsql::Value::from(result.notes.as_deref()),
        libsql::Value::from(format_datetime(&result.validated_at)),
    ]))
}

/// `"<field>: <error>"` entries joined with `; `.
fn summarize_errors(errors: &[FieldError]) -> Option<String> {
    if errors.is_empty() {
        return None;
    }
    Some(
        errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.error))
            .collect::<Vec<_>>()
            .join("; "),
    )
}

const fn log_level_for(status: ValidationStatus) -> LogLevel {
    if status.is_valid() {
        LogLevel::Info
    } else {
        LogLevel::Warning
    }
}

/// Ids and timestamp for one commit attempt, generated before the transaction opens.
struct CommitIds {
    result: String,
    control: Option<String>,
    log: String,
    at: DateTime<Utc>,
}

impl VpayService {
    /// Insert a standalone result without touching extraction status.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT fails.
    pub async fn create_validation_result(
        &self,
        result: NewValidationResult,
    ) -> Result<ValidationResult, DatabaseError> {
        let id = self.db().generate_id(PREFIX_VALIDATION_RESULT).await?;
        let result = result.into_result(id, now());
        let params = result_params(&result)?;
        self.db()
            .execute_with(INSERT_RESULT_SQL, || params.clone())
            .await?;
        Ok(result)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn get_validation_result(
        &self,
        id: &str,
    ) -> Result<Option<ValidationResult>, DatabaseError> {
        let sql = format!("SELECT {COLUMNS} FROM validation_results WHERE id = ?1");
        let mut rows = self.db().query_with(&sql, || [id]).await?;
        rows.next().await?.map(|row| row_to_result(&row)).transpose()
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_validation_results(
        &self,
        filter: &ResultFilter,
    ) -> Result<Vec<ValidationResult>, DatabaseError> {
        let mut conditions = Conditions::default();
        conditions.eq_opt("extraction_id", filter.extraction_id.clone());
        conditions.eq_opt("reference_id", filter.reference_id.clone());
        conditions.eq_opt("status", filter.status.map(ValidationStatus::as_str));
        conditions.eq_opt("is_valid", filter.is_valid.map(bool_to_sql));
        let (where_clause, params) = conditions.into_sql();

        let sql = format!(
            "SELECT {COLUMNS} FROM validation_results {where_clause} {}",
            order_and_limit("validated_at", filter.order, filter.limit)
        );
        let mut rows = self
            .db()
            .query_with(&sql, || libsql::params_from_iter(params.clone()))
            .await?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            results.push(row_to_result(&row)?);
        }
        Ok(results)
    }

    /// Most recent results first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn validation_history(
        &self,
        limit: u32,
    ) -> Result<Vec<ValidationResult>, DatabaseError> {
        self.list_validation_results(&ResultFilter {
            order: SortOrder::Desc,
            limit: Some(limit),
            ..Default::default()
        })
        .await
    }

    /// Commit one validation atomically.
    ///
    /// Writes the result, the control entry when approving, the extraction
    /// status (`validated` when approving, `failed` otherwise), and one
    /// processing log row. Any failure rolls all of them back. The whole
    /// transaction is retried on transient errors.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Duplicate` if the control key was approved
    /// concurrently, `DatabaseError::NotFound` if the extraction does not
    /// exist, and `DatabaseError::InvalidState` if the draft pairs a `valid`
    /// status with no control key or vice versa.
    pub async fn record_validation(
        &self,
        draft: &ValidationDraft,
    ) -> Result<RecordedValidation, DatabaseError> {
        if draft.result.status.is_valid() != draft.control.is_some() {
            return Err(DatabaseError::InvalidState(format!(
                "status '{}' with control key {}",
                draft.result.status,
                if draft.control.is_some() { "present" } else { "absent" }
            )));
        }

        let ids = CommitIds {
            result: self.db().generate_id(PREFIX_VALIDATION_RESULT).await?,
            control: match draft.control {
                Some(_) => Some(self.db().generate_id(PREFIX_VALIDATION_CONTROL).await?),
                None => None,
            },
            log: self.db().generate_id(PREFIX_PROCESSING_LOG).await?,
            at: now(),
        };

        let ids = &ids;
        let recorded = with_retry(self.db().retry_config(), move || async move {
            self.commit_validation(draft, ids).await
        })
        .await?;

        tracing::debug!(
            extraction_id = %recorded.result.extraction_id,
            result_id = %recorded.result.id,
            status = %recorded.result.status,
            "validation recorded"
        );
        Ok(recorded)
    }

    async fn commit_validation(
        &self,
        draft: &ValidationDraft,
        ids: &CommitIds,
    ) -> Result<RecordedValidation, DatabaseError> {
        let tx = self.db().conn().transaction().await?;
        let outcome = Self::write_validation(&tx, draft, ids).await;
        match outcome {
            Ok(recorded) => {
                tx.commit().await?;
                Ok(recorded)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!(error = %rollback_err, "rollback failed");
                }
                Err(e)
            }
        }
    }

    async fn write_validation(
        conn: &libsql::Connection,
        draft: &ValidationDraft,
        ids: &CommitIds,
    ) -> Result<RecordedValidation, DatabaseError> {
        let result = draft.result.clone().into_result(ids.result.clone(), ids.at);
        conn.execute(INSERT_RESULT_SQL, result_params(&result)?)
            .await?;

        let control = match (&draft.control, &ids.control) {
            (Some(key), Some(control_id)) => {
                conn.execute(INSERT_CONTROL_SQL, control_params(control_id, key, &ids.at))
                    .await
                    .map_err(|e| DatabaseError::from(e).into_duplicate(|| duplicate_message(key)))?;
                Some(ValidationControl {
                    id: control_id.clone(),
                    reference_id: key.reference_id.clone(),
                    payment_type: key.payment_type,
                    competence: key.competence.clone(),
                    validated_at: ids.at,
                })
            }
            _ => None,
        };

        let (status, error_message) = if result.is_valid {
            (ExtractionStatus::Validated, None)
        } else {
            (ExtractionStatus::Failed, summarize_errors(&result.validation_errors))
        };
        let updated = conn
            .execute(
                "UPDATE extractions SET status = ?1, error_message = ?2 WHERE id = ?3",
                libsql::params![status.as_str(), error_message.as_deref(), result.extraction_id.as_str()],
            )
            .await?;
        if updated == 0 {
            return Err(DatabaseError::NotFound {
                entity_type: "extraction",
                id: result.extraction_id.clone(),
            });
        }

        let log = NewProcessingLog::new(
            VALIDATION_COMPONENT,
            log_level_for(result.status),
            format!("validation {} for {}", result.status, result.extraction_id),
        )
        .with_details(serde_json::json!({
            "result_id": result.id,
            "extraction_id": result.extraction_id,
            "reference_id": result.reference_id,
            "status": result.status,
            "extraction_status": status,
        }))
        .with_trace(draft.trace_id.clone())
        .into_log(ids.log.clone(), ids.at);
        conn.execute(INSERT_LOG_SQL, log_params(&log)).await?;

        Ok(RecordedValidation {
            result,
            control,
            log,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::control::ControlFilter;
    use crate::repos::processing_log::LogFilter;
    use crate::test_support::helpers::{seed_extraction, seed_reference, test_service};
    use pretty_assertions::assert_eq;
    use vpay_core::enums::PaymentType;

    fn draft_for(
        extraction_id: &str,
        reference_id: &str,
        status: ValidationStatus,
        competence: &str,
    ) -> ValidationDraft {
        let approving = status.is_valid();
        let validation_errors = if approving {
            Vec::new()
        } else {
            vec![FieldError::new("valor", "amount mismatch for pc: expected 1000.00")]
        };
        ValidationDraft {
            result: NewValidationResult {
                extraction_id: extraction_id.to_string(),
                reference_id: Some(reference_id.to_string()),
                status,
                validation_errors,
                details: serde_json::json!({"competence": competence}),
                notes: None,
            },
            control: approving.then(|| ControlKey {
                reference_id: reference_id.to_string(),
                payment_type: PaymentType::Pc,
                competence: competence.to_string(),
            }),
            trace_id: Some("trc-00000000000000aa".into()),
        }
    }

    #[tokio::test]
    async fn approving_commit_writes_all_rows() {
        let svc = test_service().await;
        let reference = seed_reference(&svc, "12345678901234").await;
        let extraction = seed_extraction(&svc, "12345678901234", "1000.00").await;

        let recorded = svc
            .record_validation(&draft_for(&extraction.id, &reference.id, ValidationStatus::Valid, "08/2024"))
            .await
            .unwrap();

        assert!(recorded.result.is_valid);
        assert!(recorded.result.id.starts_with("vrs-"));
        let control = recorded.control.unwrap();
        assert_eq!(control.reference_id, reference.id);

        let stored = svc
            .get_validation_result(&recorded.result.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored, recorded.result);

        let extraction = svc.get_extraction(&extraction.id).await.unwrap().unwrap();
        assert_eq!(extraction.status, ExtractionStatus::Validated);
        assert_eq!(extraction.error_message, None);

        let found = svc
            .get_control(&reference.id, PaymentType::Pc, "08/2024")
            .await
            .unwrap();
        assert_eq!(found, Some(control));

        let logs = svc
            .query_logs(&LogFilter {
                trace_id: Some("trc-00000000000000aa".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].component, VALIDATION_COMPONENT);
        assert_eq!(logs[0].level, LogLevel::Info);
    }

    #[tokio::test]
    async fn rejecting_commit_marks_extraction_failed() {
        let svc = test_service().await;
        let reference = seed_reference(&svc, "12345678901234").await;
        let extraction = seed_extraction(&svc, "12345678901234", "950.00").await;

        let recorded = svc
            .record_validation(&draft_for(&extraction.id, &reference.id, ValidationStatus::Invalid, "08/2024"))
            .await
            .unwrap();
        assert!(recorded.control.is_none());
        assert!(recorded.result.has_error_on("valor"));

        let extraction = svc.get_extraction(&extraction.id).await.unwrap().unwrap();
        assert_eq!(extraction.status, ExtractionStatus::Failed);
        assert_eq!(
            extraction.error_message.as_deref(),
            Some("valor: amount mismatch for pc: expected 1000.00")
        );
        assert!(svc.list_controls(&ControlFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_control_rolls_back_everything() {
        let svc = test_service().await;
        let reference = seed_reference(&svc, "12345678901234").await;
        let first = seed_extraction(&svc, "12345678901234", "1000.00").await;
        let second = seed_extraction(&svc, "12345678901234", "1000.00").await;

        svc.record_validation(&draft_for(&first.id, &reference.id, ValidationStatus::Valid, "08/2024"))
            .await
            .unwrap();
        let err = svc
            .record_validation(&draft_for(&second.id, &reference.id, ValidationStatus::Valid, "08/2024"))
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Duplicate(_)), "got {err:?}");

        let second = svc.get_extraction(&second.id).await.unwrap().unwrap();
        assert_eq!(second.status, ExtractionStatus::Extracted);

        let results = svc
            .list_validation_results(&ResultFilter {
                extraction_id: Some(second.id.clone()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(results.is_empty(), "rolled-back result must not be visible");

        let logs = svc.query_logs(&LogFilter::default()).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(svc.list_controls(&ControlFilter::default()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rejection_after_approval_marks_extraction_failed() {
        let svc = test_service().await;
        let reference = seed_reference(&svc, "12345678901234").await;
        let extraction = seed_extraction(&svc, "12345678901234", "1000.00").await;

        svc.record_validation(&draft_for(&extraction.id, &reference.id, ValidationStatus::Valid, "08/2024"))
            .await
            .unwrap();
        let recorded = svc
            .record_validation(&draft_for(&extraction.id, &reference.id, ValidationStatus::AlreadyValidated, "08/2024"))
            .await
            .unwrap();
        assert_eq!(recorded.log.details["extraction_status"], "failed");

        let stored = svc.get_extraction(&extraction.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ExtractionStatus::Failed);
        let latest = &svc.validation_history(1).await.unwrap()[0];
        assert!(!latest.is_valid);
        assert_eq!(latest.extraction_id, extraction.id);
    }

    #[tokio::test]
    async fn missing_extraction_rolls_back_result() {
        let svc = test_service().await;
        let reference = seed_reference(&svc, "12345678901234").await;

        let err = svc
            .record_validation(&draft_for("ext-missing", &reference.id, ValidationStatus::Invalid, "08/2024"))
            .await
            .unwrap_err();
        // The result insert itself trips the foreign key before the status update runs.
        assert!(!matches!(err, DatabaseError::Duplicate(_)));

        let results = svc.validation_history(10).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn valid_status_without_control_is_rejected() {
        let svc = test_service().await;
        let reference = seed_reference(&svc, "12345678901234").await;
        let extraction = seed_extraction(&svc, "12345678901234", "1000.00").await;

        let mut draft = draft_for(&extraction.id, &reference.id, ValidationStatus::Valid, "08/2024");
        draft.control = None;
        let err = svc.record_validation(&draft).await.unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidState(_)));
    }

    #[tokio::test]
    async fn history_is_newest_first_and_limited() {
        let svc = test_service().await;
        let reference = seed_reference(&svc, "12345678901234").await;

        let mut ids = Vec::new();
        for competence in ["06/2024", "07/2024", "08/2024"] {
            let extraction = seed_extraction(&svc, "12345678901234", "1000.00").await;
            let recorded = svc
                .record_validation(&draft_for(&extraction.id, &reference.id, ValidationStatus::Valid, competence))
                .await
                .unwrap();
            ids.push(recorded.result.id);
        }

        let history = svc.validation_history(2).await.unwrap();
        let got: Vec<_> = history.iter().map(|r| r.id.clone()).collect();
        assert_eq!(got, vec![ids[2].clone(), ids[1].clone()]);
    }

    #[tokio::test]
    async fn standalone_result_leaves_status_alone() {
        let svc = test_service().await;
        let extraction = seed_extraction(&svc, "12345678901234", "1000.00").await;

        let result = svc
            .create_validation_result(NewValidationResult {
                extraction_id: extraction.id.clone(),
                reference_id: None,
                status: ValidationStatus::Pending,
                validation_errors: Vec::new(),
                details: serde_json::json!({}),
                notes: Some("queued for manual review".into()),
            })
            .await
            .unwrap();
        assert!(!result.is_valid);

        let listed = svc
            .list_validation_results(&ResultFilter {
                status: Some(ValidationStatus::Pending),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(listed, vec![result]);

        let extraction = svc.get_extraction(&extraction.id).await.unwrap().unwrap();
        assert_eq!(extraction.status, ExtractionStatus::Extracted);
    }
}
