//! Validation control repository.
//!
//! The control ledger holds one row per approved (reference, payment type,
//! competence). The unique index `idx_control_key` is the only duplicate
//! guard: a second insert for the same key fails with
//! [`DatabaseError::Duplicate`] instead of being checked and then written.

use chrono::{DateTime, Utc};

use vpay_core::entities::{ControlKey, ValidationControl};
use vpay_core::enums::PaymentType;
use vpay_core::ids::PREFIX_VALIDATION_CONTROL;

use crate::error::DatabaseError;
use crate::helpers::{format_datetime, now, parse_datetime, parse_enum};
use crate::repos::{Conditions, SortOrder, order_and_limit};
use crate::service::VpayService;

const COLUMNS: &str = "id, reference_id, payment_type, competence, validated_at";

pub(crate) const INSERT_CONTROL_SQL: &str = "INSERT INTO validation_control (id, reference_id, payment_type, competence, validated_at)
     VALUES (?1, ?2, ?3, ?4, ?5)";

/// Filter criteria for control entry queries, ordered on `validated_at`.
#[derive(Debug, Default, Clone)]
pub struct ControlFilter {
    pub reference_id: Option<String>,
    pub payment_type: Option<PaymentType>,
    pub competence: Option<String>,
    pub order: SortOrder,
    pub limit: Option<u32>,
}

fn row_to_control(row: &libsql::Row) -> Result<ValidationControl, DatabaseError> {
    Ok(ValidationControl {
        id: row.get::<String>(0)?,
        reference_id: row.get::<String>(1)?,
        payment_type: parse_enum(&row.get::<String>(2)?)?,
        competence: row.get::<String>(3)?,
        validated_at: parse_datetime(&row.get::<String>(4)?)?,
    })
}

pub(crate) fn control_params(id: &str, key: &ControlKey, at: &DateTime<Utc>) -> libsql::params::Params {
    libsql::params::Params::Positional(vec![
        libsql::Value::from(id),
        libsql::Value::from(key.reference_id.as_str()),
        libsql::Value::from(key.payment_type.as_str()),
        libsql::Value::from(key.competence.as_str()),
        libsql::Value::from(format_datetime(at)),
    ])
}

pub(crate) fn duplicate_message(key: &ControlKey) -> String {
    format!(
        "control entry for ({}, {}, {})",
        key.reference_id, key.payment_type, key.competence
    )
}

impl VpayService {
    /// Find the approval for a (reference, payment type, competence), if any.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn get_control(
        &self,
        reference_id: &str,
        payment_type: PaymentType,
        competence: &str,
    ) -> Result<Option<ValidationControl>, DatabaseError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM validation_control
             WHERE reference_id = ?1 AND payment_type = ?2 AND competence = ?3"
        );
        let mut rows = self
            .db()
            .query_with(&sql, || {
                libsql::params![reference_id, payment_type.as_str(), competence]
            })
            .await?;
        rows.next()
            .await?
            .map(|row| row_to_control(&row))
            .transpose()
    }

    /// Conditionally insert a control entry.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Duplicate` if an entry for `key` already exists.
    pub async fn create_control(&self, key: &ControlKey) -> Result<ValidationControl, DatabaseError> {
        let validated_at = now();
        let id = self.db().generate_id(PREFIX_VALIDATION_CONTROL).await?;

        self.db()
            .execute_with(INSERT_CONTROL_SQL, || control_params(&id, key, &validated_at))
            .await
            .map_err(|e| e.into_duplicate(|| duplicate_message(key)))?;

        Ok(ValidationControl {
            id,
            reference_id: key.reference_id.clone(),
            payment_type: key.payment_type,
            competence: key.competence.clone(),
            validated_at,
        })
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_controls(
        &self,
        filter: &ControlFilter,
    ) -> Result<Vec<ValidationControl>, DatabaseError> {
        let mut conditions = Conditions::default();
        conditions.eq_opt("reference_id", filter.reference_id.clone());
        conditions.eq_opt("payment_type", filter.payment_type.map(PaymentType::as_str));
        conditions.eq_opt("competence", filter.competence.clone());
        let (where_clause, params) = conditions.into_sql();

        let sql = format!(
            "SELECT {COLUMNS} FROM validation_control {where_clause} {}",
            order_and_limit("validated_at", filter.order, filter.limit)
        );
        let mut rows = self
            .db()
            .query_with(&sql, || libsql::params_from_iter(params.clone()))
            .await?;

        let mut controls = Vec::new();
        while let Some(row) = rows.next().await? {
            controls.push(row_to_control(&row)?);
        }
        Ok(controls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{seed_reference, test_service};

    fn key(reference_id: &str, competence: &str) -> ControlKey {
        ControlKey {
            reference_id: reference_id.to_string(),
            payment_type: PaymentType::Pc,
            competence: competence.to_string(),
        }
    }

    #[tokio::test]
    async fn create_then_get_control() {
        let svc = test_service().await;
        let reference = seed_reference(&svc, "12345678901234").await;

        let created = svc.create_control(&key(&reference.id, "08/2024")).await.unwrap();
        assert!(created.id.starts_with("vct-"));

        let found = svc
            .get_control(&reference.id, PaymentType::Pc, "08/2024")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found, created);

        let other_type = svc
            .get_control(&reference.id, PaymentType::Bonus, "08/2024")
            .await
            .unwrap();
        assert!(other_type.is_none());
    }

    #[tokio::test]
    async fn second_control_for_same_key_is_duplicate() {
        let svc = test_service().await;
        let reference = seed_reference(&svc, "12345678901234").await;

        svc.create_control(&key(&reference.id, "08/2024")).await.unwrap();
        let err = svc
            .create_control(&key(&reference.id, "08/2024"))
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Duplicate(_)), "got {err:?}");

        svc.create_control(&key(&reference.id, "09/2024")).await.unwrap();
        let all = svc
            .list_controls(&ControlFilter {
                reference_id: Some(reference.id.clone()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
    }
}
