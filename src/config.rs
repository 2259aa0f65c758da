//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Runtime configuration, loaded from the environment with sane defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server bind address
    pub server_host: String,

    /// Server port
    pub server_port: u16,

    /// Directory served under `/static`
    pub static_dir: PathBuf,

    /// Upper bound on any single multipart field, template included
    pub max_upload_bytes: usize,

    /// Timeout for one provider round trip, in seconds
    pub llm_timeout_secs: u64,

    /// Log filter when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 8000,
            static_dir: PathBuf::from("static"),
            max_upload_bytes: 25 * 1024 * 1024,
            llm_timeout_secs: 60,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and `.env`.
    ///
    /// Unset or unparsable variables fall back to the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file (ignore if not exists)
        let _ = dotenv::dotenv();

        let defaults = Self::default();
        let config = Self {
            server_host: std::env::var("LONGAN_HOST").unwrap_or(defaults.server_host),
            server_port: std::env::var("LONGAN_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.server_port),
            static_dir: std::env::var("LONGAN_STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            max_upload_bytes: std::env::var("LONGAN_MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_upload_bytes),
            llm_timeout_secs: std::env::var("LONGAN_LLM_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.llm_timeout_secs),
            log_level: std::env::var("LONGAN_LOG_LEVEL").unwrap_or(defaults.log_level),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server_port == 0 {
            return Err(ConfigError::Invalid("server_port must be non-zero".to_string()));
        }
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_upload_bytes must be non-zero".to_string(),
            ));
        }
        if self.llm_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "llm_timeout_secs must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }
}
