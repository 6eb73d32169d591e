//! # vpay-db
//!
//! libSQL storage for vpay: reference records, extractions, validation
//! results, the validation control ledger, and the processing log.
//!
//! Every statement outside a transaction runs through [`retry::with_retry`],
//! so callers get a per-attempt timeout and bounded retry on lock contention.
//! The validation commit (`VpayService::record_validation`) is one libSQL
//! transaction retried as a whole.

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod retry;
pub mod service;
pub mod updates;

#[cfg(test)]
mod test_support;

use error::DatabaseError;
use libsql::Builder;
use libsql::params::IntoParams;
use retry::{RetryConfig, with_retry};

/// Central database handle for all vpay state operations.
pub struct VpayDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
    retry: RetryConfig,
}

impl VpayDb {
    /// Open a local database at the given path (`":memory:"` for tests).
    ///
    /// Runs migrations automatically on open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str, retry: RetryConfig) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Enable foreign keys (must be per-connection in SQLite)
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let vpay_db = Self { db, conn, retry };
        vpay_db.run_migrations().await?;
        tracing::debug!(path, "database opened");
        Ok(vpay_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    #[must_use]
    pub const fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// Generate a prefixed ID via libSQL, e.g. `"ext-3f9a0c1d22b4e871"`.
    ///
    /// Uses `randomblob(8)` in SQL to produce 16 hex chars, then prepends the prefix.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, DatabaseError> {
        let sql = format!("SELECT '{prefix}-' || lower(hex(randomblob(8)))");
        let mut rows = self.query_with(&sql, || ()).await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<String>(0)?)
    }

    /// Execute a statement with retry. `params` is called once per attempt.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` once retries are exhausted or on a permanent error.
    pub async fn execute_with<P, F>(&self, sql: &str, params: F) -> Result<u64, DatabaseError>
    where
        P: IntoParams,
        F: Fn() -> P,
    {
        let conn = &self.conn;
        let params = &params;
        with_retry(&self.retry, move || async move {
            conn.execute(sql, params()).await.map_err(DatabaseError::from)
        })
        .await
    }

    /// Run a query with retry. `params` is called once per attempt.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` once retries are exhausted or on a permanent error.
    pub async fn query_with<P, F>(&self, sql: &str, params: F) -> Result<libsql::Rows, DatabaseError>
    where
        P: IntoParams,
        F: Fn() -> P,
    {
        let conn = &self.conn;
        let params = &params;
        with_retry(&self.retry, move || async move {
            conn.query(sql, params()).await.map_err(DatabaseError::from)
        })
        .await
    }
}
