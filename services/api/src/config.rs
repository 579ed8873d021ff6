//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    pub analysis_model: String,
    pub fix_model: String,
    pub scan_timeout: Duration,
    pub cors_origin: String,
    pub fetch_user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 3000)),
            log_level: Level::INFO,
            openai_api_key: None,
            openai_base_url: None,
            analysis_model: "gpt-4o".to_string(),
            fix_model: "gpt-4o".to_string(),
            scan_timeout: Duration::from_secs(10),
            cors_origin: "http://localhost:5173".to_string(),
            fetch_user_agent: default_user_agent(),
        }
    }
}

fn default_user_agent() -> String {
    format!("ResponsiveTester/{}", env!("CARGO_PKG_VERSION"))
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        // --- Server Settings ---
        let bind_address = match lookup("BIND_ADDRESS") {
            Some(value) => value.parse::<SocketAddr>().map_err(|e| {
                ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
            })?,
            None => defaults.bind_address,
        };

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin = lookup("CORS_ORIGIN").unwrap_or(defaults.cors_origin);
        let fetch_user_agent = lookup("FETCH_USER_AGENT").unwrap_or(defaults.fetch_user_agent);

        // --- Scanner Settings ---
        let scan_timeout = match lookup("SCAN_TIMEOUT_SECS") {
            Some(value) => {
                let secs = value.parse::<u64>().map_err(|e| {
                    ConfigError::InvalidValue("SCAN_TIMEOUT_SECS".to_string(), e.to_string())
                })?;
                if secs == 0 {
                    return Err(ConfigError::InvalidValue(
                        "SCAN_TIMEOUT_SECS".to_string(),
                        "must be greater than zero".to_string(),
                    ));
                }
                Duration::from_secs(secs)
            }
            None => defaults.scan_timeout,
        };

        // --- Completion Service (optional) ---
        let openai_api_key = lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty());
        let openai_base_url = lookup("OPENAI_BASE_URL").filter(|u| !u.trim().is_empty());
        let analysis_model = lookup("ANALYSIS_MODEL").unwrap_or(defaults.analysis_model);
        let fix_model = lookup("FIX_MODEL").unwrap_or(defaults.fix_model);

        Ok(Self {
            bind_address,
            log_level,
            openai_api_key,
            openai_base_url,
            analysis_model,
            fix_model,
            scan_timeout,
            cors_origin,
            fetch_user_agent,
        })
    }
}
