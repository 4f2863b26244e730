//! Server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults that suit a single-outlet development setup.

use std::env;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,

    /// SQLite database file path
    pub database_path: String,

    /// Allowed CORS origin for the register console
    pub cors_origin: String,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = ServerConfig {
            http_port: env::var("AQUAPOS_HTTP_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("AQUAPOS_HTTP_PORT".to_string()))?,

            database_path: env::var("AQUAPOS_DATABASE_PATH")
                .unwrap_or_else(|_| "./data/aquapos.db".to_string()),

            cors_origin: env::var("AQUAPOS_CORS_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
        };

        Ok(config)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        // Only read the defaults when the variables are unset in the
        // test environment
        if env::var("AQUAPOS_HTTP_PORT").is_err() {
            let config = ServerConfig::load().unwrap();
            assert_eq!(config.http_port, 3000);
            assert_eq!(config.database_path, "./data/aquapos.db");
        }
    }
}
