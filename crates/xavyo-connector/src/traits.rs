//! Connector Framework traits
//!
//! A connector exposes one [`ResourceSyncer`] per resource type. The host
//! pages through each syncer's resources, then asks for the entitlements
//! and grants of every resource it received.

use async_trait::async_trait;
use serde::Serialize;

use crate::annotations::Annotations;
use crate::entitlement::Entitlement;
use crate::error::ConnectorResult;
use crate::grant::Grant;
use crate::ids::ResourceId;
use crate::pagination::PageToken;
use crate::resource::Resource;
use crate::types::ResourceType;

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Token for the next page, empty when the listing is complete.
    pub next_page_token: String,
    pub annotations: Annotations,
}

impl<T> Page<T> {
    /// A complete listing in a single page.
    #[must_use]
    pub fn complete(items: Vec<T>) -> Self {
        Self {
            items,
            next_page_token: String::new(),
            annotations: Annotations::new(),
        }
    }

    /// An empty, complete listing.
    #[must_use]
    pub fn empty() -> Self {
        Self::complete(Vec::new())
    }

    /// A page followed by `next_page_token`.
    #[must_use]
    pub fn with_next(items: Vec<T>, next_page_token: impl Into<String>) -> Self {
        Self {
            items,
            next_page_token: next_page_token.into(),
            annotations: Annotations::new(),
        }
    }

    #[must_use]
    pub fn with_annotations(mut self, annotations: Annotations) -> Self {
        self.annotations.extend(annotations);
        self
    }

    /// Whether another page follows.
    #[must_use]
    pub fn has_more(&self) -> bool {
        !self.next_page_token.is_empty()
    }
}

/// Lists resources of one type along with their entitlements and grants.
///
/// Implementations hold no per-call mutable state and may be called
/// concurrently.
#[async_trait]
pub trait ResourceSyncer: Send + Sync {
    /// The resource type this syncer handles.
    fn resource_type(&self) -> &ResourceType;

    /// List one page of resources, parented under `parent` when given.
    async fn list(
        &self,
        parent: Option<&ResourceId>,
        token: &PageToken,
    ) -> ConnectorResult<Page<Resource>>;

    /// List the entitlements `resource` offers.
    async fn entitlements(
        &self,
        resource: &Resource,
        token: &PageToken,
    ) -> ConnectorResult<Page<Entitlement>>;

    /// List grants related to `resource`.
    async fn grants(&self, resource: &Resource, token: &PageToken)
        -> ConnectorResult<Page<Grant>>;
}

/// Descriptive metadata shown by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectorMetadata {
    pub display_name: String,
    pub description: String,
}

/// Base trait for all connectors.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Metadata for this connector.
    fn metadata(&self) -> ConnectorMetadata;

    /// Check that the connector can reach the target system with its
    /// credentials.
    async fn validate(&self) -> ConnectorResult<()>;

    /// Syncers for every resource type this connector exposes.
    fn resource_syncers(&self) -> Vec<Box<dyn ResourceSyncer>>;
}
