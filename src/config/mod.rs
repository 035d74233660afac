//! Engine configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Configuration is loaded with the
//! `ENTITLEMENT_` prefix and nested values use double underscores as
//! separators.
//!
//! # Example
//!
//! ```no_run
//! use entitlement_engine::config::EntitlementConfig;
//!
//! let config = EntitlementConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod error;
mod listener;
mod storage;

pub use error::{ConfigError, ValidationError};
pub use listener::ListenerConfig;
pub use storage::StorageConfig;

use serde::Deserialize;
use uuid::Uuid;

/// Root engine configuration
///
/// Load using [`EntitlementConfig::load()`] which reads from environment
/// variables, or construct directly from the embedding application's own
/// settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntitlementConfig {
    /// Durable preference storage (entitlement cache file)
    #[serde(default)]
    pub storage: StorageConfig,

    /// Background transaction-update worker behavior
    #[serde(default)]
    pub listener: ListenerConfig,

    /// Application-scoped account token attached to purchases
    #[serde(default)]
    pub account_token: Option<Uuid>,
}

impl EntitlementConfig {
    /// Load configuration from environment variables
    ///
    /// Loads a `.env` file if present, then reads environment variables with
    /// the `ENTITLEMENT` prefix, `__` separating nested values:
    ///
    /// - `ENTITLEMENT__STORAGE__PATH=/var/lib/app/prefs.json`
    /// - `ENTITLEMENT__LISTENER__ACKNOWLEDGE_ON_DELIVERY=false`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when values cannot be parsed into the expected
    /// types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("ENTITLEMENT")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.storage.validate()?;
        Ok(())
    }
}

/// Install a `tracing` subscriber reading `RUST_LOG`, defaulting to `info`.
///
/// Intended for binaries and integration tests; calling it twice is a no-op
/// (the second install fails quietly).
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
