//! Service configuration
//!
//! Values are layered, later sources overriding earlier ones:
//!
//! 1. built-in defaults
//! 2. `config/credit.toml` (optional)
//! 3. environment variables prefixed with `CREDIT_`, nested keys separated by `__`
//!
//! * `CREDIT_HOST` - Server host (default: 0.0.0.0)
//! * `CREDIT_PORT` - Server port (default: 8080)
//! * `CREDIT_LOG_LEVEL` - Default tracing filter, overridden by `RUST_LOG` (default: info)
//! * `CREDIT_LOG_FORMAT` - `text` or `json` (default: text)
//! * `CREDIT_DATABASE__URL` - PostgreSQL connection string; in-memory storage when unset

use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    /// Relational storage; `None` selects the in-memory store
    pub database: Option<DatabaseSettings>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    2
}

fn default_acquire_timeout_secs() -> u64 {
    30
}

impl Settings {
    /// Load settings from the configuration file and the environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::with_defaults()?
            .add_source(File::with_name("config/credit").required(false))
            .add_source(
                Environment::with_prefix("CREDIT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Builder holding only the built-in defaults
    pub fn with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 8080)?
            .set_default("log_level", "info")?
            .set_default("log_format", "text")
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use speculoos::prelude::*;

    #[test]
    fn test_defaults() -> Result<(), ConfigError> {
        let settings: Settings = Settings::with_defaults()?.build()?.try_deserialize()?;

        assert_that!(settings.server_addr().as_str()).is_equal_to("0.0.0.0:8080");
        assert_that!(settings.log_level.as_str()).is_equal_to("info");
        assert_that!(settings.log_format).is_equal_to(LogFormat::Text);
        assert_that!(settings.database.is_none()).is_true();
        Ok(())
    }

    #[test]
    fn test_database_section() -> Result<(), ConfigError> {
        let settings: Settings = Settings::with_defaults()?
            .set_override("database.url", "postgres://localhost/credit")?
            .set_override("database.max_connections", 4)?
            .set_override("log_format", "json")?
            .build()?
            .try_deserialize()?;

        assert_that!(settings.log_format).is_equal_to(LogFormat::Json);
        assert_that!(settings.database)
            .is_some()
            .matches(|database| {
                database.url == "postgres://localhost/credit"
                    && database.max_connections == 4
                    && database.min_connections == 2
                    && database.acquire_timeout_secs == 30
            });
        Ok(())
    }
}
