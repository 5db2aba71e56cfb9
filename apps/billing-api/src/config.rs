//! # Billing API Configuration
//!
//! Settings are layered with the `config` crate.
//!
//! ## Configuration Priority (highest to lowest)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Environment variables   TABULA_BIND_ADDR, TABULA_STRIPE__SECRET_KEY │
//! │  2. Config file             ./tabula.toml (optional)                    │
//! │  3. Built-in defaults                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nested keys use a double underscore in the environment:
//! `TABULA_STRIPE__WEBHOOK_SECRET` sets `stripe.webhook_secret`.
//!
//! ## Example Config File
//! ```toml
//! bind_addr = "0.0.0.0:8080"
//! database_path = "/var/lib/tabula/tabula.db"
//! app_url = "https://billing.example.com"
//!
//! [stripe]
//! secret_key = "sk_test_..."
//! webhook_secret = "whsec_..."
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use tabula_billing::signature::DEFAULT_TOLERANCE;
use tabula_billing::stripe::{DEFAULT_API_BASE, DEFAULT_TIMEOUT};
use tabula_billing::StripeConfig;
use tabula_core::DEFAULT_ITEM_NAME;

/// Config file looked up in the working directory (extension resolved by
/// the `config` crate).
pub const CONFIG_FILE: &str = "tabula";

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "TABULA";

// =============================================================================
// Root Configuration
// =============================================================================

/// Billing API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Socket address the HTTP server listens on.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Public application origin used for checkout redirects.
    /// When unset it is derived from request headers.
    #[serde(default)]
    pub app_url: Option<String>,

    #[serde(default)]
    pub stripe: StripeSettings,

    /// Maximum accepted age of a webhook signature (seconds).
    #[serde(default = "default_webhook_tolerance")]
    pub webhook_tolerance_secs: u64,

    /// Name shown for line items saved without one.
    #[serde(default = "default_item_placeholder")]
    pub item_placeholder: String,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_database_path() -> PathBuf {
    PathBuf::from("tabula.db")
}

fn default_webhook_tolerance() -> u64 {
    DEFAULT_TOLERANCE.as_secs()
}

fn default_item_placeholder() -> String {
    DEFAULT_ITEM_NAME.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            bind_addr: default_bind_addr(),
            database_path: default_database_path(),
            app_url: None,
            stripe: StripeSettings::default(),
            webhook_tolerance_secs: default_webhook_tolerance(),
            item_placeholder: default_item_placeholder(),
        }
    }
}

// =============================================================================
// Stripe Settings
// =============================================================================

/// Payment processor credentials and client settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct StripeSettings {
    /// Secret API key.
    #[serde(default)]
    pub secret_key: String,

    /// Signing secret for webhook deliveries.
    #[serde(default)]
    pub webhook_secret: String,

    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Request timeout (seconds).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

impl Default for StripeSettings {
    fn default() -> Self {
        StripeSettings {
            secret_key: String::new(),
            webhook_secret: String::new(),
            api_base: default_api_base(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl std::fmt::Debug for StripeSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeSettings")
            .field("secret_key", &"<redacted>")
            .field("webhook_secret", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl StripeSettings {
    /// Client settings for [`tabula_billing::StripeGateway`].
    pub fn client_config(&self) -> StripeConfig {
        StripeConfig::new(self.secret_key.clone())
            .api_base(self.api_base.clone())
            .timeout(Duration::from_secs(self.timeout_secs))
    }
}

// =============================================================================
// Loading
// =============================================================================

impl ApiConfig {
    /// Loads configuration from `tabula.toml` (if present) and the
    /// environment, then validates it.
    pub fn load() -> Result<Self, ConfigError> {
        let builder = config::Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(environment());

        Self::from_builder(builder)
    }

    /// Builds and validates from an already-assembled source stack.
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let mut config: ApiConfig = builder.build()?.try_deserialize()?;

        config.app_url = config
            .app_url
            .take()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        config.validate()?;
        Ok(config)
    }

    /// Checks required secrets and parses the bind address.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stripe.secret_key.trim().is_empty() {
            return Err(ConfigError::MissingRequired("stripe.secret_key".to_string()));
        }

        if self.stripe.webhook_secret.trim().is_empty() {
            return Err(ConfigError::MissingRequired(
                "stripe.webhook_secret".to_string(),
            ));
        }

        self.socket_addr()?;

        if self.stripe.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue("stripe.timeout_secs".to_string()));
        }

        Ok(())
    }

    /// Parsed listen address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind_addr
            .parse()
            .map_err(|_| ConfigError::InvalidValue("bind_addr".to_string()))
    }

    pub fn webhook_tolerance(&self) -> Duration {
        Duration::from_secs(self.webhook_tolerance_secs)
    }
}

/// `TABULA_` prefixed variables, `__` between nested keys.
fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
}

// =============================================================================
// Errors
// =============================================================================

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        environment().source(Some(map))
    }

    fn from_toml(toml: &str, vars: &[(&str, &str)]) -> Result<ApiConfig, ConfigError> {
        let builder = config::Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .add_source(env(vars));
        ApiConfig::from_builder(builder)
    }

    const SECRETS: &str = r#"
        [stripe]
        secret_key = "sk_test_123"
        webhook_secret = "whsec_123"
    "#;

    #[test]
    fn test_defaults() {
        let config = from_toml(SECRETS, &[]).unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.database_path, PathBuf::from("tabula.db"));
        assert_eq!(config.app_url, None);
        assert_eq!(config.stripe.api_base, "https://api.stripe.com");
        assert_eq!(config.stripe.timeout_secs, 15);
        assert_eq!(config.webhook_tolerance_secs, 300);
        assert_eq!(config.item_placeholder, "Item");
    }

    #[test]
    fn test_environment_overrides_file() {
        let config = from_toml(
            SECRETS,
            &[
                ("TABULA_BIND_ADDR", "127.0.0.1:9000"),
                ("TABULA_STRIPE__WEBHOOK_SECRET", "whsec_env"),
                ("TABULA_APP_URL", "https://billing.example.com"),
            ],
        )
        .unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:9000");
        assert_eq!(config.stripe.webhook_secret, "whsec_env");
        assert_eq!(config.stripe.secret_key, "sk_test_123");
        assert_eq!(config.app_url.as_deref(), Some("https://billing.example.com"));
    }

    #[test]
    fn test_blank_app_url_is_unset() {
        let config = from_toml(SECRETS, &[("TABULA_APP_URL", "  ")]).unwrap();
        assert_eq!(config.app_url, None);
    }

    #[test]
    fn test_missing_secrets_rejected() {
        let err = from_toml("", &[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired(ref key) if key == "stripe.secret_key"));

        let err = from_toml("[stripe]\nsecret_key = \"sk_test_123\"", &[]).unwrap_err();
        assert!(
            matches!(err, ConfigError::MissingRequired(ref key) if key == "stripe.webhook_secret")
        );
    }

    #[test]
    fn test_invalid_bind_addr() {
        let err = from_toml(SECRETS, &[("TABULA_BIND_ADDR", "not-an-address")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = from_toml(SECRETS, &[]).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk_test_123"));
        assert!(!debug.contains("whsec_123"));
    }
}
