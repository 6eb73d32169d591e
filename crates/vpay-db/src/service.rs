//! Service layer over the raw database handle.
//!
//! `VpayService` wraps `VpayDb`. All repo methods are implemented as
//! `impl VpayService` blocks under [`crate::repos`].

use crate::VpayDb;
use crate::error::DatabaseError;
use crate::retry::RetryConfig;

/// Store handle constructed once at process start and passed to the
/// validation engine and batch runner.
pub struct VpayService {
    db: VpayDb,
}

impl VpayService {
    /// Open a local database and wrap it.
    ///
    /// # Arguments
    ///
    /// * `db_path` - Path to the libSQL database file, or `":memory:"` for tests.
    /// * `retry` - Retry and timeout policy for every store call.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or migrated.
    pub async fn new_local(db_path: &str, retry: RetryConfig) -> Result<Self, DatabaseError> {
        let db = VpayDb::open_local(db_path, retry).await?;
        Ok(Self { db })
    }

    /// Create from an existing `VpayDb`.
    #[must_use]
    pub const fn from_db(db: VpayDb) -> Self {
        Self { db }
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &VpayDb {
        &self.db
    }
}
