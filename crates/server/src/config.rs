//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DATABASE_URL` - `PostgreSQL` connection string
//! - `ADMIN_PASSWORD` - Shared password for the admin surface
//!
//! ## Optional
//! - `HOST` - Bind address (default: 127.0.0.1)
//! - `PORT` - Listen port (default: 5000)
//! - `AZURE_OPENAI_API_KEY` - Azure OpenAI API key
//! - `AZURE_OPENAI_ENDPOINT` - Azure OpenAI resource endpoint
//! - `AZURE_OPENAI_DEPLOYMENT` - Deployment name (default: gpt-4)
//! - `AZURE_OPENAI_API_VERSION` - API version (default: 2023-05-15)
//!
//! The AI gateway calls the real API only when both the key and the endpoint
//! are set; otherwise the canned gateway serves every query.

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_DEPLOYMENT: &str = "gpt-4";
const DEFAULT_API_VERSION: &str = "2023-05-15";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `PostgreSQL` connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Shared admin password
    pub admin_password: SecretString,
    /// Azure OpenAI configuration (optional; canned gateway without it)
    pub ai: Option<AiConfig>,
}

/// Azure OpenAI API configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct AiConfig {
    pub api_key: SecretString,
    pub endpoint: String,
    pub deployment: String,
    pub api_version: String,
}

impl std::fmt::Debug for AiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiConfig")
            .field("api_key", &"[REDACTED]")
            .field("endpoint", &self.endpoint)
            .field("deployment", &self.deployment)
            .field("api_version", &self.api_version)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or a
    /// value fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = required("DATABASE_URL")?;
        let admin_password = required("ADMIN_PASSWORD")?;

        let host: IpAddr = optional("HOST")
            .unwrap_or_else(|| DEFAULT_HOST.to_string())
            .parse()
            .map_err(|err: std::net::AddrParseError| {
                ConfigError::InvalidEnvVar("HOST".to_string(), err.to_string())
            })?;

        let port = match optional("PORT") {
            Some(raw) => raw.parse().map_err(|err: std::num::ParseIntError| {
                ConfigError::InvalidEnvVar("PORT".to_string(), err.to_string())
            })?,
            None => DEFAULT_PORT,
        };

        let ai = match (optional("AZURE_OPENAI_API_KEY"), optional("AZURE_OPENAI_ENDPOINT")) {
            (Some(api_key), Some(endpoint)) => Some(AiConfig {
                api_key: api_key.into(),
                endpoint,
                deployment: optional("AZURE_OPENAI_DEPLOYMENT")
                    .unwrap_or_else(|| DEFAULT_DEPLOYMENT.to_string()),
                api_version: optional("AZURE_OPENAI_API_VERSION")
                    .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            }),
            _ => None,
        };

        Ok(Self {
            database_url: database_url.into(),
            host,
            port,
            admin_password: admin_password.into(),
            ai,
        })
    }

    /// The socket address to bind.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn required(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}
