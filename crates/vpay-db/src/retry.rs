//! Transient store error retry logic.
//!
//! Every store call runs under [`with_retry`]: each attempt is bounded by
//! `RetryConfig::timeout`, and transient failures (lock contention, busy
//! database, Turso node recycling, attempt timeout) are retried up to
//! `max_attempts` times with a fixed delay. Constraint violations and other
//! SQL errors are returned immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::DatabaseError;

/// Configuration for retry behavior on transient store errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the initial one).
    pub max_attempts: u32,
    /// Fixed delay between attempts.
    pub delay: Duration,
    /// Upper bound on a single attempt.
    pub timeout: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(1),
            timeout: Duration::from_secs(10),
        }
    }
}

impl RetryConfig {
    /// One attempt, no delay. Used by tests that inject failures.
    #[must_use]
    pub const fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            delay: Duration::ZERO,
            timeout: Duration::from_secs(10),
        }
    }
}

/// Detect transient libSQL errors.
///
/// The predicate is narrow on purpose: genuine SQL or constraint errors must
/// surface on the first attempt.
pub fn is_transient_libsql_error(e: &libsql::Error) -> bool {
    let msg = e.to_string();
    msg.contains("database is locked")
        || msg.contains("database table is locked")
        || msg.contains("SQLITE_BUSY")
        || msg.contains("unable to acquire shared lock")
        || msg.contains("deletion must be in progress")
}

/// Run `op` until it succeeds, fails permanently, or runs out of attempts.
///
/// # Errors
///
/// Returns the last error once attempts are exhausted, or the first
/// non-transient error.
pub async fn with_retry<T, F, Fut>(config: &RetryConfig, mut op: F) -> Result<T, DatabaseError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DatabaseError>>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        let outcome = match tokio::time::timeout(config.timeout, op()).await {
            Ok(result) => result,
            Err(_) => Err(DatabaseError::Timeout(config.timeout)),
        };

        match outcome {
            Err(e) if e.is_transient() && attempt < max_attempts => {
                tracing::warn!(
                    attempt,
                    max_attempts,
                    error = %e,
                    "transient store error, retrying"
                );
                tokio::time::sleep(config.delay).await;
                attempt += 1;
            }
            other => return other,
        }
    }
}
