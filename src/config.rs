use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::services::ReadinessTimeouts;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub signal_service: SignalServiceConfig,
    pub router: RouterConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Port for the trigger/health HTTP server
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,
}

fn default_listen_port() -> u16 {
    8080
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Account/algorithm store connection URL (from `DB_URI`)
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignalServiceConfig {
    /// Base URL of the signal-generation service
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouterConfig {
    /// Router base URL (from `TRANSACTION_ROUTER_URI` / `TRANSACTOR_URI`)
    pub base_url: String,
    /// Command line to spawn the router as a child process for each run;
    /// unset when the router is managed externally
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default = "default_readiness_overall_ms")]
    pub readiness_overall_ms: u64,
    #[serde(default = "default_readiness_retry_ms")]
    pub readiness_retry_ms: u64,
}

fn default_readiness_overall_ms() -> u64 {
    30_000
}

fn default_readiness_retry_ms() -> u64 {
    500
}

impl RouterConfig {
    pub fn readiness_timeouts(&self) -> ReadinessTimeouts {
        ReadinessTimeouts {
            overall: Duration::from_millis(self.readiness_overall_ms),
            retry: Duration::from_millis(self.readiness_retry_ms),
        }
    }
}

/// How built transactions leave the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// Forward to the external router service
    #[default]
    Router,
    /// Call the exchange provider directly
    Direct,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DispatchConfig {
    #[serde(default)]
    pub mode: DispatchMode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrchestratorConfig {
    /// Bounded worker pool size for per-account processing; 1 = sequential
    #[serde(default = "default_max_concurrent_accounts")]
    pub max_concurrent_accounts: usize,
}

fn default_max_concurrent_accounts() -> usize {
    4
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_accounts: default_max_concurrent_accounts(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory.
    ///
    /// `DB_URI` and `TRANSACTION_ROUTER_URI` (alias `TRANSACTOR_URI`) are
    /// hard requirements: missing either aborts startup before anything else
    /// happens.
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let db_uri = std::env::var("DB_URI")
            .map_err(|_| ConfigError::NotFound("DB_URI".to_string()))?;
        let router_uri = std::env::var("TRANSACTION_ROUTER_URI")
            .or_else(|_| std::env::var("TRANSACTOR_URI"))
            .map_err(|_| ConfigError::NotFound("TRANSACTION_ROUTER_URI".to_string()))?;

        let builder = Config::builder()
            // Start with default values
            .set_default("signal_service.base_url", "http://127.0.0.1:5000")?
            .set_default("database.max_connections", 5)?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g. config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("TRANSACTOR_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (TRANSACTOR_DISPATCH__MODE, etc.)
            .add_source(
                Environment::with_prefix("TRANSACTOR")
                    .separator("__")
                    .try_parsing(true),
            )
            // The two required env vars win over everything
            .set_override("database.url", db_uri)?
            .set_override("router.base_url", router_uri)?;

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.database.url.is_empty() {
            errors.push("database.url must not be empty".to_string());
        }
        if self.router.base_url.is_empty() {
            errors.push("router.base_url must not be empty".to_string());
        }
        if self.signal_service.base_url.is_empty() {
            errors.push("signal_service.base_url must not be empty".to_string());
        }
        if self.orchestrator.max_concurrent_accounts == 0 {
            errors.push("orchestrator.max_concurrent_accounts must be at least 1".to_string());
        }
        if self.router.readiness_retry_ms >= self.router.readiness_overall_ms {
            errors.push(
                "router.readiness_retry_ms must be smaller than readiness_overall_ms".to_string(),
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
