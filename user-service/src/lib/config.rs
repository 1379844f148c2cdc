use std::env;
use std::time::Duration;

use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    /// Upper bound for a single store call, in seconds.
    pub timeout_secs: u64,
}

impl DatabaseConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Deserialize, Clone)]
pub struct JwtConfig {
    #[serde(default)]
    pub secret: String,
    pub expiration_hours: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("expiration_hours", &self.expiration_hours)
            .finish()
    }
}

/// Startup configuration is unusable. The service must not start.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ConfigError),

    #[error("jwt.secret must be set and non-empty")]
    MissingJwtSecret,

    #[error(
        "jwt.expiration_hours must be between 1 and {} hours, got {0}",
        auth::JwtHandler::MAX_TTL_HOURS
    )]
    InvalidTokenTtl(i64),

    #[error("database.timeout_secs must be greater than zero")]
    InvalidDatabaseTimeout,

    #[error("database.max_connections must be greater than zero")]
    InvalidMaxConnections,
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (APP_JWT__SECRET, APP_DATABASE__URL, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigurationError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: APP_DATABASE__URL=postgres://... overrides database.url
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Reject settings the service cannot run with.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.jwt.secret.trim().is_empty() {
            return Err(ConfigurationError::MissingJwtSecret);
        }
        if self.jwt.expiration_hours <= 0
            || self.jwt.expiration_hours > auth::JwtHandler::MAX_TTL_HOURS
        {
            return Err(ConfigurationError::InvalidTokenTtl(self.jwt.expiration_hours));
        }
        if self.database.timeout_secs == 0 {
            return Err(ConfigurationError::InvalidDatabaseTimeout);
        }
        if self.database.max_connections == 0 {
            return Err(ConfigurationError::InvalidMaxConnections);
        }
        Ok(())
    }
}
