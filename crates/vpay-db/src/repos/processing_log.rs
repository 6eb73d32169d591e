//! Processing log repository.
//!
//! Append-only operator trail. The validation commit writes its log row
//! inside the same transaction as the result; other components append
//! through [`VpayService::append_log`].

use chrono::{DateTime, Utc};

use vpay_core::entities::ProcessingLog;
use vpay_core::enums::LogLevel;
use vpay_core::ids::PREFIX_PROCESSING_LOG;

use crate::error::DatabaseError;
use crate::helpers::{format_datetime, get_opt_string, now, parse_datetime, parse_enum, parse_json_or};
use crate::repos::{Conditions, SortOrder, order_and_limit};
use crate::service::VpayService;

pub(crate) const INSERT_LOG_SQL: &str = "INSERT INTO processing_logs (id, component, message, level, details, trace_id, timestamp)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";

/// A log entry before the store assigns its id and timestamp.
#[derive(Debug, Clone)]
pub struct NewProcessingLog {
    pub component: String,
    pub message: String,
    pub level: LogLevel,
    pub details: serde_json::Value,
    pub trace_id: Option<String>,
}

impl NewProcessingLog {
    #[must_use]
    pub fn new(component: &str, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            component: component.to_string(),
            message: message.into(),
            level,
            details: serde_json::json!({}),
            trace_id: None,
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }

    #[must_use]
    pub fn with_trace(mut self, trace_id: Option<String>) -> Self {
        self.trace_id = trace_id;
        self
    }

    pub(crate) fn into_log(self, id: String, timestamp: DateTime<Utc>) -> ProcessingLog {
        ProcessingLog {
            id,
            component: self.component,
            message: self.message,
            level: self.level,
            details: self.details,
            trace_id: self.trace_id,
            timestamp,
        }
    }
}

/// Filter criteria for log queries, ordered on `timestamp`.
#[derive(Debug, Default, Clone)]
pub struct LogFilter {
    pub component: Option<String>,
    pub level: Option<LogLevel>,
    pub trace_id: Option<String>,
    pub order: SortOrder,
    pub limit: Option<u32>,
}

pub(crate) fn log_params(log: &ProcessingLog) -> libsql::params::Params {
    libsql::params::Params::Positional(vec![
        libsql::Value::from(log.id.as_str()),
        libsql::Value::from(log.component.as_str()),
        libsql::Value::from(log.message.as_str()),
        libsql::Value::from(log.level.as_str()),
        libsql::Value::from(log.details.to_string()),
        libsql::Value::from(log.trace_id.as_deref()),
        libsql::Value::from(format_datetime(&log.timestamp)),
    ])
}

fn row_to_log(row: &libsql::Row) -> Result<ProcessingLog, DatabaseError> {
    Ok(ProcessingLog {
        id: row.get::<String>(0)?,
        component: row.get::<String>(1)?,
        message: row.get::<String>(2)?,
        level: parse_enum(&row.get::<String>(3)?)?,
        details: parse_json_or(get_opt_string(row, 4)?.as_deref(), serde_json::json!({}))?,
        trace_id: get_opt_string(row, 5)?,
        timestamp: parse_datetime(&row.get::<String>(6)?)?,
    })
}

impl VpayService {
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT fails.
    pub async fn append_log(&self, entry: NewProcessingLog) -> Result<ProcessingLog, DatabaseError> {
        let id = self.db().generate_id(PREFIX_PROCESSING_LOG).await?;
        let log = entry.into_log(id, now());
        self.db()
            .execute_with(INSERT_LOG_SQL, || log_params(&log))
            .await?;
        Ok(log)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn query_logs(&self, filter: &LogFilter) -> Result<Vec<ProcessingLog>, DatabaseError> {
        let mut conditions = Conditions::default();
        conditions.eq_opt("component", filter.component.clone());
        conditions.eq_opt("level", filter.level.map(LogLevel::as_str));
        conditions.eq_opt("trace_id", filter.trace_id.clone());
        let (where_clause, params) = conditions.into_sql();

        let sql = format!(
            "SELECT id, component, message, level, details, trace_id, timestamp
             FROM processing_logs {where_clause} {}",
            order_and_limit("timestamp", filter.order, filter.limit)
        );
        let mut rows = self
            .db()
            .query_with(&sql, || libsql::params_from_iter(params.clone()))
            .await?;

        let mut logs = Vec::new();
        while let Some(row) = rows.next().await? {
            logs.push(row_to_log(&row)?);
        }
        Ok(logs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::test_service;

    #[tokio::test]
    async fn append_and_query_by_trace() {
        let svc = test_service().await;
        svc.append_log(
            NewProcessingLog::new("batch_runner", LogLevel::Info, "batch started")
                .with_trace(Some("trc-0000000000000001".into())),
        )
        .await
        .unwrap();
        svc.append_log(
            NewProcessingLog::new("batch_runner", LogLevel::Error, "item failed")
                .with_details(serde_json::json!({"extraction_id": "ext-1"}))
                .with_trace(Some("trc-0000000000000001".into())),
        )
        .await
        .unwrap();
        svc.append_log(NewProcessingLog::new("cli", LogLevel::Info, "unrelated"))
            .await
            .unwrap();

        let traced = svc
            .query_logs(&LogFilter {
                trace_id: Some("trc-0000000000000001".into()),
                order: SortOrder::Asc,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(traced.len(), 2);
        assert_eq!(traced[0].message, "batch started");
        assert_eq!(traced[1].details["extraction_id"], "ext-1");

        let errors = svc
            .query_logs(&LogFilter {
                level: Some(LogLevel::Error),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(errors.len(), 1);
    }
}
