//! Connector Framework configuration types
//!
//! Connection settings shared by HTTP based connectors.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{ConnectorError, ConnectorResult};

/// Common connection settings shared across connector types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionSettings {
    /// Connection timeout in seconds.
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout_secs: u64,

    /// Read timeout in seconds.
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,
}

fn default_connection_timeout() -> u64 {
    30
}

fn default_read_timeout() -> u64 {
    60
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            connection_timeout_secs: default_connection_timeout(),
            read_timeout_secs: default_read_timeout(),
        }
    }
}

impl ConnectionSettings {
    /// Create new connection settings with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the connection timeout.
    #[must_use]
    pub fn with_connection_timeout(mut self, secs: u64) -> Self {
        self.connection_timeout_secs = secs;
        self
    }

    /// Set the read timeout.
    #[must_use]
    pub fn with_read_timeout(mut self, secs: u64) -> Self {
        self.read_timeout_secs = secs;
        self
    }

    /// Get connection timeout as Duration.
    #[must_use]
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout_secs)
    }

    /// Get read timeout as Duration.
    #[must_use]
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    /// Reject zero timeouts.
    pub fn validate(&self) -> ConnectorResult<()> {
        if self.connection_timeout_secs == 0 {
            return Err(ConnectorError::InvalidConfiguration {
                message: "connection timeout must be greater than zero".to_string(),
            });
        }
        if self.read_timeout_secs == 0 {
            return Err(ConnectorError::InvalidConfiguration {
                message: "read timeout must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
