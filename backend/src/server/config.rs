//! Environment-driven server configuration.

use std::env;
use std::net::SocketAddr;

use thiserror::Error;

#[cfg(feature = "smtp")]
use crate::outbound::mailer::SmtpConfig;

/// Configuration failure raised at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable {name} is not set")]
    Missing { name: &'static str },
    #[error("environment variable {name} is invalid: {message}")]
    Invalid { name: &'static str, message: String },
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing { name })
}

fn parsed<T: std::str::FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
        name,
        message: e.to_string(),
    })
}

/// Startup settings for the HTTP server and its adapters.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    /// HMAC secret for activation tokens. Must stay stable across restarts
    /// or outstanding activation links become invalid.
    pub secret_key: String,
    /// Base URL used when rendering links into outgoing mail.
    pub public_base_url: String,
    pub pool_max_size: u32,
    #[cfg(feature = "smtp")]
    pub smtp: Option<SmtpConfig>,
}

impl ServerConfig {
    /// Read the configuration from the environment.
    ///
    /// `DATABASE_URL` and `SECRET_KEY` are required; everything else has a
    /// development default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_raw = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_owned());
        let bind_addr = parsed("BIND_ADDR", &bind_raw)?;
        let pool_raw = env::var("DB_POOL_SIZE").unwrap_or_else(|_| "10".to_owned());
        let pool_max_size = parsed("DB_POOL_SIZE", &pool_raw)?;
        Ok(Self {
            bind_addr,
            database_url: required("DATABASE_URL")?,
            secret_key: required("SECRET_KEY")?,
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_owned()),
            pool_max_size,
            #[cfg(feature = "smtp")]
            smtp: Self::smtp_from_env(),
        })
    }

    /// SMTP settings are all-or-nothing; when `SMTP_HOST` is absent the
    /// server falls back to console mail delivery.
    #[cfg(feature = "smtp")]
    fn smtp_from_env() -> Option<SmtpConfig> {
        let host = env::var("SMTP_HOST").ok()?;
        Some(SmtpConfig {
            host,
            username: env::var("SMTP_USERNAME").unwrap_or_default(),
            password: env::var("SMTP_PASSWORD").unwrap_or_default(),
            from: env::var("SMTP_FROM")
                .unwrap_or_else(|_| "Marketplace <noreply@localhost>".to_owned()),
        })
    }
}
