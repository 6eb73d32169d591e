use anyhow::Context;
use vpay_config::{StoreConfig, VpayConfig};
use vpay_db::retry::RetryConfig;
use vpay_db::service::VpayService;
use vpay_validation::ValidationEngine;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub service: VpayService,
    pub config: VpayConfig,
}

impl AppContext {
    /// Open the configured store, creating its directory on first use.
    pub async fn init(config: VpayConfig) -> anyhow::Result<Self> {
        let path = &config.database.path;
        if !config.database.is_in_memory() {
            if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("failed to create {}", dir.display()))?;
            }
        }

        let service = VpayService::new_local(&path.to_string_lossy(), retry_config(&config.store))
            .await
            .with_context(|| format!("failed to open store at {}", path.display()))?;

        tracing::debug!(path = %path.display(), "store ready");
        Ok(Self { service, config })
    }

    /// Engine bound to this context's store and configured tolerance.
    #[must_use]
    pub const fn engine(&self) -> ValidationEngine<&VpayService> {
        ValidationEngine::new(&self.service, self.config.validation.amount_tolerance)
    }
}

#[must_use]
pub const fn retry_config(store: &StoreConfig) -> RetryConfig {
    RetryConfig {
        max_attempts: store.max_attempts,
        delay: store.retry_delay(),
        timeout: store.timeout(),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use vpay_config::StoreConfig;
    use vpay_db::repos::reference::ReferenceFilter;

    use super::*;

    #[test]
    fn retry_config_follows_store_section() {
        let store = StoreConfig {
            max_attempts: 5,
            retry_delay_ms: 250,
            timeout_ms: 2000,
        };
        let retry = retry_config(&store);
        assert_eq!(retry.max_attempts, 5);
        assert_eq!(retry.delay, Duration::from_millis(250));
        assert_eq!(retry.timeout, Duration::from_secs(2));
    }

    #[tokio::test]
    async fn init_creates_database_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = VpayConfig::default();
        config.database.path = dir.path().join("nested").join("vpay.db");

        let ctx = AppContext::init(config).await.unwrap();
        assert!(dir.path().join("nested").is_dir());
        assert!(
            ctx.service
                .list_references(&ReferenceFilter::default())
                .await
                .unwrap()
                .is_empty()
        );
    }
}
