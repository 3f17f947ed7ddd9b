//! # Connector Framework
//!
//! Core abstractions for syncing identity data from external systems into
//! the xavyo governance model.
//!
//! ## Architecture
//!
//! A connector describes a target system as resources, the entitlements
//! those resources offer and the grants principals hold:
//!
//! - [`Connector`] - Entry point: metadata, credential validation, syncers
//! - [`ResourceSyncer`] - Lists one resource type, its entitlements and grants
//! - [`PageBag`] - Cursor state carried in opaque page tokens
//! - [`HttpClient`] - Retrying JSON transport for REST connectors
//! - [`SyncRunner`] - Full sync driver that collects everything a connector exposes
//!
//! ## Example
//!
//! ```ignore
//! use xavyo_connector::prelude::*;
//!
//! let connector = build_connector(config)?;
//! connector.validate().await?;
//!
//! let output = SyncRunner::new(100).run(&connector).await?;
//! println!("{} grants", output.grants.len());
//! ```
//!
//! ## Crate Organization
//!
//! - [`ids`] - Validated resource references
//! - [`types`] - Resource type descriptors and traits
//! - [`error`] - Error types with transient/permanent classification
//! - [`resource`], [`entitlement`], [`grant`] - The governance object model
//! - [`annotations`] - Rate limit and identifier annotations
//! - [`pagination`] - Page tokens and the cursor bag
//! - [`traits`] - Connector and syncer traits
//! - [`config`], [`rate_limit`], [`http`] - HTTP transport and its settings
//! - [`sync`] - Full sync driver

pub mod annotations;
pub mod config;
pub mod entitlement;
pub mod error;
pub mod grant;
pub mod http;
pub mod ids;
pub mod pagination;
pub mod rate_limit;
pub mod resource;
pub mod sync;
pub mod traits;
pub mod types;

pub use http::HttpClient;
pub use pagination::PageBag;
pub use sync::SyncRunner;
pub use traits::{Connector, ResourceSyncer};

/// Prelude module for convenient imports.
///
/// ```
/// use xavyo_connector::prelude::*;
/// ```
pub mod prelude {
    // IDs and types
    pub use crate::ids::ResourceId;
    pub use crate::types::{ResourceTrait, ResourceType};

    // Error handling
    pub use crate::error::{ConnectorError, ConnectorResult};

    // Object model
    pub use crate::annotations::{Annotation, Annotations, RateLimitDescription, RateLimitStatus};
    pub use crate::entitlement::Entitlement;
    pub use crate::grant::Grant;
    pub use crate::resource::{GroupTrait, Resource, UserStatus, UserTrait};

    // Pagination
    pub use crate::pagination::{PageBag, PageState, PageToken};

    // Traits
    pub use crate::traits::{Connector, ConnectorMetadata, Page, ResourceSyncer};

    // Transport
    pub use crate::config::ConnectionSettings;
    pub use crate::http::HttpClient;
    pub use crate::rate_limit::RetryConfig;

    // Sync
    pub use crate::sync::{SyncOutput, SyncRunner};
}

// Re-export async_trait for connector implementors
pub use async_trait::async_trait;
