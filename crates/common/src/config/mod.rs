//! Configuration management for Smart Legal Platform services
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config.toml, config.yaml)
//! - Default values

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Relational database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Chat-completion provider configuration
    #[serde(default)]
    pub llm: LlmConfig,

    /// Token accounting configuration
    #[serde(default)]
    pub billing: BillingConfig,

    /// Manual request document store configuration
    #[serde(default)]
    pub document_store: DocumentStoreConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port for the contracts API
    #[serde(default = "default_port")]
    pub port: u16,

    /// Port for the manual intake API
    #[serde(default = "default_intake_port")]
    pub intake_port: u16,

    /// Request timeout in seconds (0 disables)
    #[serde(default)]
    pub request_timeout_secs: u64,

    /// Shutdown timeout in seconds
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,

    /// Allowed CORS origins (empty allows any)
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Primary database URL (for writes). `memory://` selects the in-memory store.
    #[serde(default = "default_database_url")]
    pub url: String,

    /// Read replica URL (optional, falls back to primary)
    pub read_url: Option<String>,

    /// Maximum number of connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum number of connections
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Idle timeout in seconds
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,

    /// Apply embedded migrations at startup
    #[serde(default = "default_enabled")]
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    /// Provider: openai, simulated
    #[serde(default = "default_llm_provider")]
    pub provider: String,

    /// API key for the provider. Absent means AI calls report a missing key.
    pub api_key: Option<String>,

    /// API base URL (for OpenAI-compatible endpoints)
    #[serde(default = "default_llm_api_base")]
    pub api_base: String,

    /// Chat model
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Request timeout in seconds; the HTTP client default applies when unset
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BillingConfig {
    /// Minimum balance required before an AI call is attempted
    #[serde(default = "default_estimated_cost")]
    pub estimated_analysis_cost: i32,

    /// Balance granted to newly provisioned profiles
    #[serde(default = "default_tokens")]
    pub default_tokens: i32,

    /// Subscription level of newly provisioned profiles
    #[serde(default = "default_subscription")]
    pub default_subscription: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DocumentStoreConfig {
    /// Redis URL. Absent means the intake service runs in degraded mode.
    pub url: Option<String>,

    /// Application id used to namespace collections
    #[serde(default = "default_app_id")]
    pub app_id: String,

    /// Key prefix for namespacing
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error) or a full EnvFilter directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Metrics port (0 to disable)
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,

    /// Service name for tracing
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

// Default value functions
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_intake_port() -> u16 { 8081 }
fn default_shutdown_timeout() -> u64 { 30 }
fn default_database_url() -> String { "postgres://localhost/smartlegal".to_string() }
fn default_max_connections() -> u32 { 20 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 10 }
fn default_idle_timeout() -> u64 { 300 }
fn default_llm_provider() -> String { "openai".to_string() }
fn default_llm_api_base() -> String { "https://api.openai.com/v1".to_string() }
fn default_llm_model() -> String { crate::DEFAULT_CHAT_MODEL.to_string() }
fn default_estimated_cost() -> i32 { 500 }
fn default_tokens() -> i32 { 1000 }
fn default_subscription() -> String { "Basic".to_string() }
fn default_app_id() -> String { "default-app-id".to_string() }
fn default_key_prefix() -> String { "smartlegal".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { true }
fn default_metrics_port() -> u16 { 9090 }
fn default_service_name() -> String { "smartlegal".to_string() }
fn default_enabled() -> bool { true }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            intake_port: default_intake_port(),
            request_timeout_secs: 0,
            shutdown_timeout_secs: default_shutdown_timeout(),
            cors_allowed_origins: Vec::new(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            read_url: None,
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            run_migrations: default_enabled(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            api_key: None,
            api_base: default_llm_api_base(),
            model: default_llm_model(),
            timeout_secs: None,
        }
    }
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            estimated_analysis_cost: default_estimated_cost(),
            default_tokens: default_tokens(),
            default_subscription: default_subscription(),
        }
    }
}

impl Default for DocumentStoreConfig {
    fn default() -> Self {
        Self {
            url: None,
            app_id: default_app_id(),
            key_prefix: default_key_prefix(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: default_json_logging(),
            metrics_port: default_metrics_port(),
            service_name: default_service_name(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))

            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))

            // Load local overrides
            .add_source(File::with_name("config/local").required(false))

            // Load from environment variables with APP__ prefix
            // e.g., APP__LLM__API_KEY=sk-...
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )

            .build()?;

        config.try_deserialize()
    }

    /// Get request timeout as Duration, if one is configured
    pub fn request_timeout(&self) -> Option<Duration> {
        match self.server.request_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Get shutdown timeout as Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.server.shutdown_timeout_secs)
    }

    /// Whether the relational store should be the in-memory one
    pub fn uses_memory_store(&self) -> bool {
        self.database.url.starts_with("memory:")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            llm: LlmConfig::default(),
            billing: BillingConfig::default(),
            document_store: DocumentStoreConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.intake_port, 8081);
        assert_eq!(config.llm.model, "gpt-4-turbo");
        assert!(config.llm.api_key.is_none());
        assert!(config.llm.timeout_secs.is_none());
    }

    #[test]
    fn test_billing_defaults_match_profile_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.billing.estimated_analysis_cost, 500);
        assert_eq!(config.billing.default_tokens, 1000);
        assert_eq!(config.billing.default_subscription, "Basic");
    }

    #[test]
    fn test_memory_store_selection() {
        let mut config = AppConfig::default();
        assert!(!config.uses_memory_store());
        config.database.url = "memory://".to_string();
        assert!(config.uses_memory_store());
    }

    #[test]
    fn test_request_timeout_disabled_by_default() {
        let mut config = AppConfig::default();
        assert!(config.request_timeout().is_none());
        config.server.request_timeout_secs = 45;
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(45)));
    }
}
