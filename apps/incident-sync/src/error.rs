//! CLI error types and exit codes

use thiserror::Error;
use xavyo_connector::error::ConnectorError;
use xavyo_connector_incident::ConfigError;

/// Exit codes for the CLI
/// - 0: Success
/// - 1: General error
/// - 2: Authentication failed
/// - 3: Network error
/// - 4: Invalid data
/// - 5: Server error
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid data: {0}")]
    Validation(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Sync failed: {0}")]
    Sync(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::AuthenticationFailed(_) => 2,
            CliError::Network(_) => 3,
            CliError::Validation(_) => 4,
            CliError::Server(_) => 5,
            CliError::Config(_) | CliError::Sync(_) | CliError::Io(_) => 1,
        }
    }

    /// Print the error to stderr
    pub fn print(&self) {
        let use_color = std::env::var("NO_COLOR").is_err();

        if use_color {
            eprintln!("\x1b[31mError:\x1b[0m {self}");
        } else {
            eprintln!("Error: {self}");
        }

        if let Some(suggestion) = self.suggestion() {
            if use_color {
                eprintln!("\n\x1b[33mSuggestion:\x1b[0m {suggestion}");
            } else {
                eprintln!("\nSuggestion: {suggestion}");
            }
        }
    }

    fn suggestion(&self) -> Option<&'static str> {
        match self {
            CliError::AuthenticationFailed(_) => {
                Some("Check that INCIDENT_API_TOKEN holds a valid incident.io API key.")
            }
            CliError::Config(_) => Some("Run with --help to see the accepted options."),
            _ => None,
        }
    }
}

/// The innermost connector error behind syncer context wrapping.
fn root_cause(err: &ConnectorError) -> &ConnectorError {
    match err {
        ConnectorError::OperationFailed {
            source: Some(source),
            ..
        } => source
            .downcast_ref::<ConnectorError>()
            .map_or(err, root_cause),
        _ => err,
    }
}

impl From<ConnectorError> for CliError {
    fn from(err: ConnectorError) -> Self {
        let message = err.to_string();
        match root_cause(&err) {
            ConnectorError::AuthenticationFailed | ConnectorError::AuthorizationFailed { .. } => {
                CliError::AuthenticationFailed(message)
            }
            ConnectorError::ConnectionFailed { .. }
            | ConnectorError::ConnectionTimeout { .. }
            | ConnectorError::NetworkError { .. } => CliError::Network(message),
            ConnectorError::TargetUnavailable { .. } => CliError::Server(message),
            ConnectorError::InvalidData { .. } | ConnectorError::InvalidPageToken { .. } => {
                CliError::Validation(message)
            }
            ConnectorError::InvalidConfiguration { .. } => CliError::Config(message),
            _ => CliError::Sync(message),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Io(format!("JSON error: {e}"))
    }
}
