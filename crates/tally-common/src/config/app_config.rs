//! Application configuration structs
//!
//! Loads configuration from environment variables, or from an optional
//! config file layered under `TALLY__*` environment overrides.

use serde::Deserialize;
use std::env;
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSettings,
    /// Absent when running against the in-memory store
    pub database: Option<DatabaseConfig>,
    pub transaction: TransactionConfig,
    pub engine: EngineConfig,
    pub telemetry: TelemetryConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            env: default_env(),
        }
    }
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Retry policy for optimistic transactions
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TransactionConfig {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    /// Randomize each backoff by up to 30%
    pub jitter: bool,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_backoff_ms: 20,
            max_backoff_ms: 1000,
            jitter: true,
        }
    }
}

/// Engine limits
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Owned children deleted inside a comment-delete transaction
    pub max_cascade_children: usize,
    /// Public streak documents fetched per leaderboard page
    pub leaderboard_page_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_cascade_children: 400,
            leaderboard_page_size: 500,
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub json: bool,
    pub level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            json: false,
            level: "info".to_string(),
        }
    }
}

// Default value functions
fn default_app_name() -> String {
    "tally".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

/// Parse an optional variable, failing only when it is set but malformed
fn parse_var<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(name, raw)),
        Err(_) => Ok(None),
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a variable is set to an unparsable value
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let tx_defaults = TransactionConfig::default();
        let engine_defaults = EngineConfig::default();
        let telemetry_defaults = TelemetryConfig::default();

        let database = match env::var("DATABASE_URL") {
            Ok(url) => Some(DatabaseConfig {
                url,
                max_connections: parse_var("DATABASE_MAX_CONNECTIONS")?
                    .unwrap_or_else(default_max_connections),
                min_connections: parse_var("DATABASE_MIN_CONNECTIONS")?
                    .unwrap_or_else(default_min_connections),
            }),
            Err(_) => None,
        };

        Self {
            app: AppSettings {
                name: env::var("APP_NAME").unwrap_or_else(|_| default_app_name()),
                env: env::var("APP_ENV")
                    .ok()
                    .and_then(|s| Environment::parse(&s))
                    .unwrap_or_default(),
            },
            database,
            transaction: TransactionConfig {
                max_retries: parse_var("TX_MAX_RETRIES")?.unwrap_or(tx_defaults.max_retries),
                initial_backoff_ms: parse_var("TX_INITIAL_BACKOFF_MS")?
                    .unwrap_or(tx_defaults.initial_backoff_ms),
                max_backoff_ms: parse_var("TX_MAX_BACKOFF_MS")?
                    .unwrap_or(tx_defaults.max_backoff_ms),
                jitter: parse_var("TX_JITTER")?.unwrap_or(tx_defaults.jitter),
            },
            engine: EngineConfig {
                max_cascade_children: parse_var("ENGINE_MAX_CASCADE_CHILDREN")?
                    .unwrap_or(engine_defaults.max_cascade_children),
                leaderboard_page_size: parse_var("ENGINE_LEADERBOARD_PAGE_SIZE")?
                    .unwrap_or(engine_defaults.leaderboard_page_size),
            },
            telemetry: TelemetryConfig {
                json: parse_var("LOG_JSON")?.unwrap_or(telemetry_defaults.json),
                level: env::var("LOG_LEVEL").unwrap_or(telemetry_defaults.level),
            },
        }
        .validated()
    }

    /// Load an optional config file (any format the `config` crate knows),
    /// overridden by `TALLY__SECTION__KEY` environment variables
    ///
    /// # Errors
    /// Returns an error if a source cannot be read or deserialized
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("TALLY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ConfigError::Load(e.to_string()))?;

        settings
            .try_deserialize::<Self>()
            .map_err(|e| ConfigError::Load(e.to_string()))?
            .validated()
    }

    fn validated(self) -> Result<Self, ConfigError> {
        if self.transaction.initial_backoff_ms > self.transaction.max_backoff_ms {
            return Err(ConfigError::InvalidValue(
                "initial_backoff_ms",
                format!(
                    "{} exceeds max_backoff_ms {}",
                    self.transaction.initial_backoff_ms, self.transaction.max_backoff_ms
                ),
            ));
        }
        if self.engine.max_cascade_children == 0 {
            return Err(ConfigError::InvalidValue(
                "max_cascade_children",
                "must be at least 1".to_string(),
            ));
        }
        Ok(self)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),

    #[error("Failed to load configuration: {0}")]
    Load(String),
}
