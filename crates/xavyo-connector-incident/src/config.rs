//! Configuration for the incident.io connector.

use secrecy::{ExposeSecret, SecretString};
use std::env::VarError;
use url::Url;
use xavyo_connector::config::ConnectionSettings;
use xavyo_connector::error::ConnectorError;
use xavyo_connector::rate_limit::RetryConfig;

use crate::client::DEFAULT_BASE_URL;

/// Connector configuration.
#[derive(Debug, Clone)]
pub struct IncidentConfig {
    /// API key used as a bearer token. Never logged.
    pub api_token: SecretString,

    /// API root, e.g. `https://api.incident.io/v2`.
    pub base_url: String,

    /// HTTP timeouts.
    pub connection: ConnectionSettings,

    /// Retry policy for transient failures.
    pub retry: RetryConfig,
}

impl IncidentConfig {
    /// Configuration with default settings for `api_token`.
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: SecretString::from(api_token.into()),
            base_url: DEFAULT_BASE_URL.to_string(),
            connection: ConnectionSettings::default(),
            retry: RetryConfig::default(),
        }
    }

    /// Override the API root.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_connection(mut self, connection: ConnectionSettings) -> Self {
        self.connection = connection;
        self
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_reader(|key| std::env::var(key))
    }

    /// Load configuration from a custom variable reader.
    ///
    /// Reads `INCIDENT_API_TOKEN` (required), `INCIDENT_BASE_URL`,
    /// `INCIDENT_CONNECT_TIMEOUT_SECS`, `INCIDENT_READ_TIMEOUT_SECS` and
    /// `INCIDENT_MAX_RETRIES`.
    pub fn from_reader<F>(reader: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        let api_token = reader("INCIDENT_API_TOKEN")
            .map_err(|_| ConfigError::MissingVar("INCIDENT_API_TOKEN".into()))?;

        let base_url =
            reader("INCIDENT_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let connection_timeout_secs = parse_var(&reader, "INCIDENT_CONNECT_TIMEOUT_SECS", 30)?;
        let read_timeout_secs = parse_var(&reader, "INCIDENT_READ_TIMEOUT_SECS", 60)?;
        let max_retries = parse_var(&reader, "INCIDENT_MAX_RETRIES", 3)?;

        let config = Self::new(api_token)
            .with_base_url(base_url)
            .with_connection(
                ConnectionSettings::new()
                    .with_connection_timeout(connection_timeout_secs)
                    .with_read_timeout(read_timeout_secs),
            )
            .with_retry(RetryConfig::new(max_retries));

        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for obviously unusable values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_token.expose_secret().trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "INCIDENT_API_TOKEN".into(),
                "must not be empty".into(),
            ));
        }

        let url = Url::parse(&self.base_url)
            .map_err(|e| ConfigError::InvalidValue("INCIDENT_BASE_URL".into(), e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue(
                "INCIDENT_BASE_URL".into(),
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }

        if self.connection.connection_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "INCIDENT_CONNECT_TIMEOUT_SECS".into(),
                "must be greater than zero".into(),
            ));
        }
        if self.connection.read_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "INCIDENT_READ_TIMEOUT_SECS".into(),
                "must be greater than zero".into(),
            ));
        }

        Ok(())
    }
}

fn parse_var<F, T>(reader: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Result<String, VarError>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match reader(key) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(key.into(), e.to_string())),
        Err(_) => Ok(default),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(String),

    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl From<ConfigError> for ConnectorError {
    fn from(err: ConfigError) -> Self {
        ConnectorError::InvalidConfiguration {
            message: err.to_string(),
        }
    }
}
