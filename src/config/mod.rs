//! Configuration management for Actiongate

use anyhow::{Context, Result};
use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// HTTP server host
    pub http_host: String,
    /// HTTP server port
    pub http_port: u16,
    /// Whether group-based authorization is enabled system-wide
    pub group_authorization_enabled: bool,
    /// Log output format: "text" or "json"
    pub log_format: String,
}

impl AdminConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (local development)
        let _ = dotenvy::dotenv();

        Ok(Self {
            http_host: env::var("ADMIN_HTTP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            http_port: env::var("ADMIN_HTTP_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("Invalid ADMIN_HTTP_PORT")?,
            group_authorization_enabled: env::var("ADMIN_GROUP_AUTHORIZATION")
                .map(|s| s.to_lowercase() == "true")
                .unwrap_or(false),
            log_format: env::var("ADMIN_LOG_FORMAT").unwrap_or_else(|_| "text".to_string()),
        })
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            http_host: "0.0.0.0".to_string(),
            http_port: 8080,
            group_authorization_enabled: false,
            log_format: "text".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AdminConfig::default();
        assert_eq!(config.http_port, 8080);
        assert!(!config.group_authorization_enabled);
        assert_eq!(config.log_format, "text");
    }
}
