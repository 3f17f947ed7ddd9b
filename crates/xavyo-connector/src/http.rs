//! HTTP transport for REST connectors.
//!
//! Wraps a `reqwest::Client` with retry on transient statuses, rate limit
//! annotation extraction and status-to-error mapping.

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::annotations::{Annotations, RateLimitDescription};
use crate::config::ConnectionSettings;
use crate::error::{ConnectorError, ConnectorResult};
use crate::rate_limit::{parse_retry_after, RetryConfig};

/// Longest error body echoed back in error messages.
const MAX_ERROR_BODY_LEN: usize = 512;

/// Shared HTTP client. Cheap to clone.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    retry: RetryConfig,
    read_timeout_secs: u64,
}

impl HttpClient {
    /// Build a client with the given timeouts and retry policy.
    pub fn new(settings: &ConnectionSettings, retry: RetryConfig) -> ConnectorResult<Self> {
        settings.validate()?;

        let client = Client::builder()
            .timeout(settings.read_timeout())
            .connect_timeout(settings.connection_timeout())
            .build()
            .map_err(|e| ConnectorError::InvalidConfiguration {
                message: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            retry,
            read_timeout_secs: settings.read_timeout_secs,
        })
    }

    /// The retry policy in use.
    #[must_use]
    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// GET `url` and decode the JSON body.
    ///
    /// Returns the decoded body with any rate limit annotations found on the
    /// response.
    #[instrument(skip(self, headers), fields(url = %url))]
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        headers: &HeaderMap,
    ) -> ConnectorResult<(T, Annotations)> {
        let response = self.send_with_retry(url, headers).await?;
        let status = response.status();

        let mut annotations = Annotations::new();
        if let Some(desc) = RateLimitDescription::from_response(status, response.headers())? {
            annotations.push_rate_limit(desc);
        }

        let body = response.text().await.map_err(|e| {
            ConnectorError::network_with_source(format!("Failed to read response body: {url}"), e)
        })?;

        if !status.is_success() {
            return Err(handle_response_error(status, &body));
        }

        let decoded = serde_json::from_str(&body).map_err(|e| {
            ConnectorError::invalid_data(format!("Failed to decode response from {url}: {e}"))
        })?;

        Ok((decoded, annotations))
    }

    async fn send_with_retry(&self, url: &Url, headers: &HeaderMap) -> ConnectorResult<Response> {
        let retry_config = &self.retry;
        let mut attempt = 0;

        loop {
            attempt += 1;

            debug!(url = %url, attempt = attempt, "Sending request");

            let response = self
                .client
                .get(url.clone())
                .headers(headers.clone())
                .send()
                .await;

            match response {
                Ok(resp) => {
                    let status = resp.status();
                    debug!(url = %url, status = %status, attempt = attempt, "Received response");

                    if retry_config.should_retry(status.as_u16())
                        && attempt <= retry_config.max_retries
                    {
                        let retry_after = if status == StatusCode::TOO_MANY_REQUESTS {
                            resp.headers()
                                .get(RETRY_AFTER)
                                .and_then(|v| v.to_str().ok())
                                .and_then(parse_retry_after)
                        } else {
                            None
                        };
                        let wait = match retry_after {
                            Some(delay) => delay.min(retry_config.max_backoff()),
                            None => retry_config.calculate_backoff(attempt),
                        };

                        warn!(
                            url = %url,
                            status = %status,
                            attempt = attempt,
                            wait_ms = wait.as_millis(),
                            "Transient error, retrying with backoff"
                        );

                        tokio::time::sleep(wait).await;
                        continue;
                    }

                    return Ok(resp);
                }
                Err(e) => {
                    if attempt <= retry_config.max_retries {
                        let backoff = retry_config.calculate_backoff(attempt);
                        warn!(
                            url = %url,
                            error = %e,
                            attempt = attempt,
                            wait_ms = backoff.as_millis(),
                            "Request failed, retrying with backoff"
                        );

                        tokio::time::sleep(backoff).await;
                        continue;
                    }

                    if e.is_timeout() {
                        return Err(ConnectorError::ConnectionTimeout {
                            timeout_secs: self.read_timeout_secs,
                        });
                    }

                    return Err(ConnectorError::connection_failed_with_source(
                        format!("Request failed after {attempt} attempts: {url}"),
                        e,
                    ));
                }
            }
        }
    }
}

/// Map a non-success response to a connector error.
fn handle_response_error(status: StatusCode, body: &str) -> ConnectorError {
    let error_message = error_message(body);

    match status {
        StatusCode::UNAUTHORIZED => ConnectorError::AuthenticationFailed,
        StatusCode::FORBIDDEN => ConnectorError::AuthorizationFailed {
            operation: error_message,
        },
        StatusCode::NOT_FOUND => ConnectorError::ObjectNotFound {
            identifier: error_message,
        },
        StatusCode::TOO_MANY_REQUESTS => ConnectorError::TargetUnavailable {
            message: format!("Rate limited: {error_message}"),
        },
        s if s.is_server_error() => ConnectorError::TargetUnavailable {
            message: format!("HTTP {status}: {error_message}"),
        },
        _ => ConnectorError::operation_failed(format!("HTTP {status}: {error_message}")),
    }
}

/// Pull a readable message out of an error body.
///
/// Understands `{"errors":[{"message":..}]}` and `{"message":..}`; anything
/// else is echoed back, truncated.
fn error_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        let message = json
            .pointer("/errors/0/message")
            .or_else(|| json.get("message"))
            .and_then(Value::as_str);
        if let Some(message) = message {
            return message.to_string();
        }
    }

    if body.len() <= MAX_ERROR_BODY_LEN {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY_LEN;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
