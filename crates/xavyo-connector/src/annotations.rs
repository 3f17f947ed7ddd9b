//! Annotations attached to resources, grants and pages.

use chrono::{DateTime, Duration, TimeZone, Utc};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::{ConnectorError, ConnectorResult};

/// Values above this are treated as Unix timestamps rather than a delay.
const EPOCH_RESET_THRESHOLD: i64 = 1_000_000_000;

/// One annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Annotation {
    /// Rate limit state observed on the response that produced a page.
    RateLimit(RateLimitDescription),
    /// Stable identifier used by the platform to deduplicate grants across syncs.
    V1Identifier { id: String },
}

/// Ordered collection of annotations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Annotations(Vec<Annotation>);

impl Annotations {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append an annotation.
    pub fn push(&mut self, annotation: Annotation) {
        self.0.push(annotation);
    }

    /// Append an annotation using builder pattern.
    #[must_use]
    pub fn with(mut self, annotation: Annotation) -> Self {
        self.push(annotation);
        self
    }

    /// Record rate limit data.
    pub fn push_rate_limit(&mut self, description: RateLimitDescription) {
        self.push(Annotation::RateLimit(description));
    }

    /// Append every annotation from `other`.
    pub fn extend(&mut self, other: Annotations) {
        self.0.extend(other.0);
    }

    /// Latest rate limit description, if any.
    #[must_use]
    pub fn rate_limit(&self) -> Option<&RateLimitDescription> {
        self.0.iter().rev().find_map(|a| match a {
            Annotation::RateLimit(desc) => Some(desc),
            Annotation::V1Identifier { .. } => None,
        })
    }

    /// First `V1Identifier`, if any.
    #[must_use]
    pub fn v1_identifier(&self) -> Option<&str> {
        self.0.iter().find_map(|a| match a {
            Annotation::V1Identifier { id } => Some(id.as_str()),
            Annotation::RateLimit(_) => None,
        })
    }

    /// Iterate over annotations.
    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.0.iter()
    }

    /// Number of annotations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Whether the caller is currently within its rate limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateLimitStatus {
    Ok,
    Overlimit,
}

/// Rate limit state reported by the target system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitDescription {
    pub status: RateLimitStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_at: Option<DateTime<Utc>>,
}

impl RateLimitDescription {
    /// Extract rate limit data from a response.
    ///
    /// Reads `X-RateLimit-Limit`/`-Remaining`/`-Reset`, falling back to the
    /// IETF `RateLimit-*` names and to `Retry-After` for the reset time.
    /// Returns `Ok(None)` when the response carries no rate limit headers and
    /// was not a 429. A header that is present but not an integer is an error.
    pub fn from_response(status: StatusCode, headers: &HeaderMap) -> ConnectorResult<Option<Self>> {
        Self::from_response_at(status, headers, Utc::now())
    }

    fn from_response_at(
        status: StatusCode,
        headers: &HeaderMap,
        now: DateTime<Utc>,
    ) -> ConnectorResult<Option<Self>> {
        let limit = header_i64(headers, &["x-ratelimit-limit", "ratelimit-limit"])?;
        let remaining = header_i64(headers, &["x-ratelimit-remaining", "ratelimit-remaining"])?;
        let reset = header_i64(headers, &["x-ratelimit-reset", "ratelimit-reset"])?;

        let reset_at = match reset {
            Some(value) => Some(reset_to_instant(value, now)?),
            None => match headers.get(RETRY_AFTER) {
                Some(value) => {
                    let value = value.to_str().map_err(|e| {
                        ConnectorError::invalid_data(format!("invalid Retry-After header: {e}"))
                    })?;
                    crate::rate_limit::parse_retry_after(value)
                        .and_then(|delay| Duration::from_std(delay).ok())
                        .and_then(|delay| now.checked_add_signed(delay))
                }
                None => None,
            },
        };

        let overlimit =
            status == StatusCode::TOO_MANY_REQUESTS || remaining.is_some_and(|r| r <= 0);

        if limit.is_none() && remaining.is_none() && reset_at.is_none() && !overlimit {
            return Ok(None);
        }

        Ok(Some(Self {
            status: if overlimit {
                RateLimitStatus::Overlimit
            } else {
                RateLimitStatus::Ok
            },
            limit,
            remaining,
            reset_at,
        }))
    }
}

fn header_i64(headers: &HeaderMap, names: &[&str]) -> ConnectorResult<Option<i64>> {
    for name in names {
        if let Some(value) = headers.get(*name) {
            let parsed = value
                .to_str()
                .ok()
                .and_then(|v| v.trim().parse::<i64>().ok())
                .ok_or_else(|| {
                    ConnectorError::invalid_data(format!(
                        "rate limit header {name} is not an integer: {value:?}"
                    ))
                })?;
            return Ok(Some(parsed));
        }
    }
    Ok(None)
}

fn reset_to_instant(value: i64, now: DateTime<Utc>) -> ConnectorResult<DateTime<Utc>> {
    if value >= EPOCH_RESET_THRESHOLD {
        return Utc
            .timestamp_opt(value, 0)
            .single()
            .ok_or_else(|| ConnectorError::invalid_data(format!("invalid rate limit reset {value}")));
    }
    Ok(now + Duration::seconds(value.max(0)))
}
