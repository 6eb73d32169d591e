//! # vpay-config
//!
//! Layered configuration loading for vpay using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`VPAY_*` prefix, `__` as separator)
//! 2. Project-level `.vpay/config.toml`
//! 3. User-level `~/.config/vpay/config.toml`
//! 4. Built-in defaults
//!
//! Figment maps `VPAY_STORE__MAX_ATTEMPTS` -> `store.max_attempts`,
//! `VPAY_VALIDATION__AMOUNT_TOLERANCE` -> `validation.amount_tolerance`, etc.
//!
//! ```no_run
//! use vpay_config::VpayConfig;
//!
//! let config = VpayConfig::load_with_dotenv().expect("config");
//! println!("database: {}", config.database.path.display());
//! ```

mod database;
mod error;
mod general;
mod store;
mod validation;

pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use general::GeneralConfig;
pub use store::StoreConfig;
pub use validation::ValidationConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Project-local config file, relative to the working directory.
pub const PROJECT_CONFIG_PATH: &str = ".vpay/config.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct VpayConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl VpayConfig {
    /// Load configuration from TOML files and environment variables.
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source cannot be parsed or a value is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(&Self::figment())
    }

    /// Load configuration after reading `.env` from the working directory.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source cannot be parsed or a value is out of range.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Extract and check a config from an arbitrary figment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if extraction fails or a value is out of range.
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Build the figment provider chain.
    #[must_use]
    pub fn figment() -> Figment {
        Self::figment_with_project_file(Path::new(PROJECT_CONFIG_PATH))
    }

    /// Provider chain with an explicit project-level file.
    #[must_use]
    pub fn figment_with_project_file(project_file: &Path) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path().filter(|p| p.exists()) {
            figment = figment.merge(Toml::file(global_path));
        }

        if project_file.exists() {
            figment = figment.merge(Toml::file(project_file));
        }

        figment.merge(Env::prefixed("VPAY_").split("__"))
    }

    /// Reject values no component can work with.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.max_attempts == 0 {
            return Err(ConfigError::invalid(
                "store.max_attempts",
                "must be at least 1",
            ));
        }
        if self.store.timeout_ms == 0 {
            return Err(ConfigError::invalid("store.timeout_ms", "must be positive"));
        }
        if self.validation.amount_tolerance < Decimal::ZERO {
            return Err(ConfigError::invalid(
                "validation.amount_tolerance",
                format!("cannot be negative, got {}", self.validation.amount_tolerance),
            ));
        }
        if self.general.default_limit == 0 {
            return Err(ConfigError::invalid(
                "general.default_limit",
                "must be positive",
            ));
        }
        Ok(())
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("vpay").join("config.toml"))
    }
}
