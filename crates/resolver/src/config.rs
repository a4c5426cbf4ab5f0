//! Resolver configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `RESOLVER_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `RESOLVER_HOST` - Health server bind address (default: 127.0.0.1)
//! - `RESOLVER_PORT` - Health server port (default: 8082)
//! - `NATS_URL` - NATS server URL (default: nats://localhost:4222)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Resolver configuration.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// NATS server URL
    pub nats_url: String,
    /// IP address the health server binds to
    pub host: IpAddr,
    /// Health server port
    pub port: u16,
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
}

impl ResolverConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if no database URL is set or a value cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let database_url = get_optional_env("RESOLVER_DATABASE_URL")
            .or_else(|| get_optional_env("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("RESOLVER_DATABASE_URL".to_string()))?;

        Ok(Self {
            database_url,
            nats_url: get_env_or_default("NATS_URL", "nats://localhost:4222"),
            host: parse_value("RESOLVER_HOST", &get_env_or_default("RESOLVER_HOST", "127.0.0.1"))?,
            port: parse_value("RESOLVER_PORT", &get_env_or_default("RESOLVER_PORT", "8082"))?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_value(
                "SENTRY_SAMPLE_RATE",
                &get_env_or_default("SENTRY_SAMPLE_RATE", "1.0"),
            )?,
            sentry_traces_sample_rate: parse_value(
                "SENTRY_TRACES_SAMPLE_RATE",
                &get_env_or_default("SENTRY_TRACES_SAMPLE_RATE", "0.0"),
            )?,
        })
    }

    /// Returns the socket address for the health server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_port() {
        let port: u16 = parse_value("RESOLVER_PORT", "8082").unwrap();
        assert_eq!(port, 8082);
    }

    #[test]
    fn test_parse_invalid_host() {
        let err = parse_value::<IpAddr>("RESOLVER_HOST", "not-an-ip").unwrap_err();
        assert!(err.to_string().contains("RESOLVER_HOST"));
    }
}
