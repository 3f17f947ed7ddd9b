//! Connector errors.
//!
//! Every failure a syncer or the HTTP transport reports is a
//! [`ConnectorError`]. Hosts branch on [`ConnectorError::is_transient`] to
//! decide whether to try the sync again later.

use thiserror::Error;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Error returned by connector operations.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// The request never reached the target system.
    #[error("connection failed: {message}")]
    ConnectionFailed {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("connection timeout after {timeout_secs} seconds")]
    ConnectionTimeout { timeout_secs: u64 },

    /// Rate limited or a 5xx response.
    #[error("target system unavailable: {message}")]
    TargetUnavailable { message: String },

    /// The connection dropped mid-response.
    #[error("network error: {message}")]
    NetworkError {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("authentication failed: invalid credentials")]
    AuthenticationFailed,

    #[error("authorization failed: insufficient permissions for {operation}")]
    AuthorizationFailed { operation: String },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("object not found: {identifier}")]
    ObjectNotFound { identifier: String },

    /// Undecodable response body, malformed identifier or header.
    #[error("invalid data: {message}")]
    InvalidData { message: String },

    /// A page token that this connector did not produce.
    #[error("invalid page token: {message}")]
    InvalidPageToken { message: String },

    /// A syncer step failed; `source` holds the cause.
    #[error("operation failed: {message}")]
    OperationFailed {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("serialization error: {message}")]
    Serialization { message: String },

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl ConnectorError {
    /// Whether retrying later may succeed.
    ///
    /// An `OperationFailed` wrapping another connector error takes the
    /// classification of its cause.
    pub fn is_transient(&self) -> bool {
        match self {
            ConnectorError::ConnectionFailed { .. }
            | ConnectorError::ConnectionTimeout { .. }
            | ConnectorError::TargetUnavailable { .. }
            | ConnectorError::NetworkError { .. } => true,
            ConnectorError::OperationFailed {
                source: Some(source),
                ..
            } => source
                .downcast_ref::<ConnectorError>()
                .is_some_and(ConnectorError::is_transient),
            _ => false,
        }
    }

    /// Stable code for logs and exit status mapping.
    pub fn error_code(&self) -> &'static str {
        match self {
            ConnectorError::ConnectionFailed { .. } => "CONNECTION_FAILED",
            ConnectorError::ConnectionTimeout { .. } => "CONNECTION_TIMEOUT",
            ConnectorError::TargetUnavailable { .. } => "TARGET_UNAVAILABLE",
            ConnectorError::NetworkError { .. } => "NETWORK_ERROR",
            ConnectorError::AuthenticationFailed => "AUTH_FAILED",
            ConnectorError::AuthorizationFailed { .. } => "AUTHORIZATION_FAILED",
            ConnectorError::InvalidConfiguration { .. } => "INVALID_CONFIG",
            ConnectorError::ObjectNotFound { .. } => "OBJECT_NOT_FOUND",
            ConnectorError::InvalidData { .. } => "INVALID_DATA",
            ConnectorError::InvalidPageToken { .. } => "INVALID_PAGE_TOKEN",
            ConnectorError::OperationFailed { .. } => "OPERATION_FAILED",
            ConnectorError::Serialization { .. } => "SERIALIZATION_ERROR",
            ConnectorError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    pub fn connection_failed_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ConnectorError::ConnectionFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn network_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ConnectorError::NetworkError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn operation_failed(message: impl Into<String>) -> Self {
        ConnectorError::OperationFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Name the syncer step that failed, keeping the cause as `source()`.
    pub fn operation_failed_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ConnectorError::OperationFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn invalid_data(message: impl Into<String>) -> Self {
        ConnectorError::InvalidData {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ConnectorError::Internal {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for ConnectorError {
    fn from(err: serde_json::Error) -> Self {
        ConnectorError::Serialization {
            message: err.to_string(),
        }
    }
}

/// Result type for connector operations.
pub type ConnectorResult<T> = Result<T, ConnectorError>;
