//! incident.io REST API client.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;
use xavyo_connector::annotations::Annotations;
use xavyo_connector::error::{ConnectorError, ConnectorResult};
use xavyo_connector::http::HttpClient;

use crate::config::IncidentConfig;
use crate::models::{Schedule, SchedulesResponse, SingleUserResponse, User, UsersResponse};

/// Public API root.
pub const DEFAULT_BASE_URL: &str = "https://api.incident.io/v2";

/// Page size used when the caller asks for zero.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Paging parameters for list calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageOptions {
    /// Items per page. Zero means [`DEFAULT_PAGE_SIZE`].
    pub page_size: u32,
    /// Cursor from the previous page, empty for the first.
    pub after: String,
}

impl PageOptions {
    pub fn new(page_size: u32, after: impl Into<String>) -> Self {
        Self {
            page_size,
            after: after.into(),
        }
    }

    fn effective_page_size(&self) -> u32 {
        if self.page_size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            self.page_size
        }
    }
}

/// One page of a list endpoint.
#[derive(Debug, Clone)]
pub struct ApiPage<T> {
    pub items: Vec<T>,
    /// Continuation cursor, empty on the last page.
    pub after: String,
    pub annotations: Annotations,
}

/// incident.io API client.
///
/// Holds only immutable state and may be shared between syncers.
#[derive(Debug, Clone)]
pub struct IncidentClient {
    http: HttpClient,
    base_url: Url,
    headers: HeaderMap,
}

impl IncidentClient {
    /// Build a client from configuration.
    pub fn new(config: &IncidentConfig) -> ConnectorResult<Self> {
        config.validate()?;

        let base_url =
            Url::parse(&config.base_url).map_err(|e| ConnectorError::InvalidConfiguration {
                message: format!("invalid base URL '{}': {e}", config.base_url),
            })?;

        let mut auth = HeaderValue::from_str(&format!(
            "Bearer {}",
            config.api_token.expose_secret()
        ))
        .map_err(|_| ConnectorError::InvalidConfiguration {
            message: "API token contains characters not allowed in a header".to_string(),
        })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, auth);

        let http = HttpClient::new(&config.connection, config.retry.clone())?;

        Ok(Self {
            http,
            base_url,
            headers,
        })
    }

    /// The API root this client talks to.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `GET /users`
    #[instrument(skip(self), fields(page_size = options.page_size))]
    pub async fn list_users(&self, options: &PageOptions) -> ConnectorResult<ApiPage<User>> {
        let url = self.list_url("users", options)?;
        let (body, annotations): (UsersResponse, _) = self.get(&url).await?;

        debug!(count = body.users.len(), "Fetched users page");

        Ok(ApiPage {
            after: body.pagination_meta.after().to_string(),
            items: body.users,
            annotations,
        })
    }

    /// `GET /schedules`
    #[instrument(skip(self), fields(page_size = options.page_size))]
    pub async fn list_schedules(
        &self,
        options: &PageOptions,
    ) -> ConnectorResult<ApiPage<Schedule>> {
        let url = self.list_url("schedules", options)?;
        let (body, annotations): (SchedulesResponse, _) = self.get(&url).await?;

        debug!(count = body.schedules.len(), "Fetched schedules page");

        Ok(ApiPage {
            after: body.pagination_meta.after().to_string(),
            items: body.schedules,
            annotations,
        })
    }

    /// `GET /users/{id}`
    #[instrument(skip(self))]
    pub async fn get_user(&self, user_id: &str) -> ConnectorResult<(User, Annotations)> {
        let url = self.endpoint(&["users", user_id])?;
        let (body, annotations): (SingleUserResponse, _) = self.get(&url).await?;
        Ok((body.user, annotations))
    }

    async fn get<T: DeserializeOwned>(&self, url: &Url) -> ConnectorResult<(T, Annotations)> {
        self.http.get_json(url, &self.headers).await
    }

    fn list_url(&self, resource: &str, options: &PageOptions) -> ConnectorResult<Url> {
        let mut url = self.endpoint(&[resource])?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("page_size", &options.effective_page_size().to_string());
            if !options.after.is_empty() {
                query.append_pair("after", &options.after);
            }
        }
        Ok(url)
    }

    /// Append path segments to the base URL. Segments are percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> ConnectorResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ConnectorError::InvalidConfiguration {
                message: format!("base URL '{}' cannot have a path", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}
