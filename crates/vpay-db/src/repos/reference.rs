//! Reference record repository.
//!
//! Reference records are owned by an administrative process; the validation
//! engine only reads them. The CNPJ is the business key.

use rust_decimal::Decimal;

use vpay_core::entities::{NewReferenceRecord, ReferenceRecord};
use vpay_core::enums::PaymentType;
use vpay_core::ids::PREFIX_REFERENCE;
use vpay_core::validators::normalize_cnpj;

use crate::error::DatabaseError;
use crate::helpers::{format_datetime, get_opt_string, now, parse_enum, parse_optional_decimal};
use crate::repos::{Conditions, SortOrder, order_and_limit};
use crate::service::VpayService;
use crate::updates::reference::ReferenceUpdate;

const COLUMNS: &str = "id, cnpj, provider_name, payment_type, pix_key, expected_pc, expected_bonus, expected_reembolso";

/// Filter criteria for reference record queries.
#[derive(Debug, Default, Clone)]
pub struct ReferenceFilter {
    pub cnpj: Option<String>,
    pub payment_type: Option<PaymentType>,
    pub provider_name: Option<String>,
    pub order: SortOrder,
    pub limit: Option<u32>,
}

fn row_to_reference(row: &libsql::Row) -> Result<ReferenceRecord, DatabaseError> {
    Ok(ReferenceRecord {
        id: row.get::<String>(0)?,
        cnpj: row.get::<String>(1)?,
        provider_name: row.get::<String>(2)?,
        payment_type: parse_enum(&row.get::<String>(3)?)?,
        pix_key: row.get::<String>(4)?,
        expected_pc: parse_optional_decimal(get_opt_string(row, 5)?.as_deref())?,
        expected_bonus: parse_optional_decimal(get_opt_string(row, 6)?.as_deref())?,
        expected_reembolso: parse_optional_decimal(get_opt_string(row, 7)?.as_deref())?,
    })
}

fn decimal_value(value: Option<Decimal>) -> libsql::Value {
    value.map(|d| d.to_string()).into()
}

impl VpayService {
    /// Insert a reference record after normalizing its CNPJ.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidInput` for a malformed record and
    /// `DatabaseError::Duplicate` if the CNPJ is already registered.
    pub async fn create_reference(
        &self,
        record: NewReferenceRecord,
    ) -> Result<ReferenceRecord, DatabaseError> {
        let record = record.into_validated()?;
        let stamp = format_datetime(&now());
        let id = self.db().generate_id(PREFIX_REFERENCE).await?;

        self.db()
            .execute_with(
                "INSERT INTO reference_records (id, cnpj, provider_name, payment_type, pix_key, expected_pc, expected_bonus, expected_reembolso, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                || {
                    libsql::params![
                        id.as_str(),
                        record.cnpj.as_str(),
                        record.provider_name.as_str(),
                        record.payment_type.as_str(),
                        record.pix_key.as_str(),
                        decimal_value(record.expected_pc),
                        decimal_value(record.expected_bonus),
                        decimal_value(record.expected_reembolso),
                        stamp.as_str(),
                        stamp.as_str()
                    ]
                },
            )
            .await
            .map_err(|e| {
                e.into_duplicate(|| format!("reference record for cnpj {}", record.cnpj))
            })?;

        tracing::debug!(reference_id = %id, cnpj = %record.cnpj, "reference record created");

        Ok(ReferenceRecord {
            id,
            cnpj: record.cnpj,
            provider_name: record.provider_name,
            payment_type: record.payment_type,
            pix_key: record.pix_key,
            expected_pc: record.expected_pc,
            expected_bonus: record.expected_bonus,
            expected_reembolso: record.expected_reembolso,
        })
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn get_reference(&self, id: &str) -> Result<Option<ReferenceRecord>, DatabaseError> {
        let sql = format!("SELECT {COLUMNS} FROM reference_records WHERE id = ?1");
        let mut rows = self.db().query_with(&sql, || [id]).await?;
        rows.next()
            .await?
            .map(|row| row_to_reference(&row))
            .transpose()
    }

    /// Look up a reference record by CNPJ. The input is normalized first, so
    /// formatted tax ids match.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidInput` if the CNPJ does not have 14 digits.
    pub async fn get_reference_by_cnpj(
        &self,
        cnpj: &str,
    ) -> Result<Option<ReferenceRecord>, DatabaseError> {
        let cnpj = normalize_cnpj(cnpj)?;
        let sql = format!("SELECT {COLUMNS} FROM reference_records WHERE cnpj = ?1");
        let mut rows = self.db().query_with(&sql, || [cnpj.as_str()]).await?;
        rows.next()
            .await?
            .map(|row| row_to_reference(&row))
            .transpose()
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_references(
        &self,
        filter: &ReferenceFilter,
    ) -> Result<Vec<ReferenceRecord>, DatabaseError> {
        let mut conditions = Conditions::default();
        conditions.eq_opt("cnpj", filter.cnpj.clone());
        conditions.eq_opt("payment_type", filter.payment_type.map(PaymentType::as_str));
        conditions.eq_opt("provider_name", filter.provider_name.clone());
        let (where_clause, params) = conditions.into_sql();

        let sql = format!(
            "SELECT {COLUMNS} FROM reference_records {where_clause} {}",
            order_and_limit("created_at", filter.order, filter.limit)
        );
        let mut rows = self
            .db()
            .query_with(&sql, || libsql::params_from_iter(params.clone()))
            .await?;

        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            records.push(row_to_reference(&row)?);
        }
        Ok(records)
    }

    /// Apply the `Some` fields of `update` and return the stored record.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no record has this id.
    pub async fn update_reference(
        &self,
        id: &str,
        update: ReferenceUpdate,
    ) -> Result<ReferenceRecord, DatabaseError> {
        let not_found = || DatabaseError::NotFound {
            entity_type: "reference record",
            id: id.to_string(),
        };
        if update.is_empty() {
            return self.get_reference(id).await?.ok_or_else(not_found);
        }

        let mut sets = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(ref provider_name) = update.provider_name {
            params.push(provider_name.as_str().into());
            sets.push(format!("provider_name = ?{}", params.len()));
        }
        if let Some(payment_type) = update.payment_type {
            params.push(payment_type.as_str().into());
            sets.push(format!("payment_type = ?{}", params.len()));
        }
        if let Some(ref pix_key) = update.pix_key {
            vpay_core::validators::validate_pix_key(pix_key)?;
            params.push(pix_key.as_str().into());
            sets.push(format!("pix_key = ?{}", params.len()));
        }
        if let Some(expected) = update.expected_pc {
            params.push(decimal_value(expected));
            sets.push(format!("expected_pc = ?{}", params.len()));
        }
        if let Some(expected) = update.expected_bonus {
            params.push(decimal_value(expected));
            sets.push(format!("expected_bonus = ?{}", params.len()));
        }
        if let Some(expected) = update.expected_reembolso {
            params.push(decimal_value(expected));
            sets.push(format!("expected_reembolso = ?{}", params.len()));
        }

        params.push(format_datetime(&now()).into());
        sets.push(format!("updated_at = ?{}", params.len()));

        params.push(id.into());
        let sql = format!(
            "UPDATE reference_records SET {} WHERE id = ?{}",
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

        self.get_reference(id).await?.ok_or_else(not_found)
    }
}
