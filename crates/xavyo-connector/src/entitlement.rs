//! Entitlements: permissions a resource offers to principals.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::annotations::Annotations;
use crate::ids::ResourceId;
use crate::resource::Resource;
use crate::types::ResourceType;

/// Kind of entitlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntitlementPurpose {
    #[default]
    Permission,
    Assignment,
}

/// A permission on a resource that can be granted to principals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entitlement {
    /// `{resource_type}:{resource}:{slug}`
    pub id: String,
    pub resource: ResourceId,
    pub slug: String,
    pub purpose: EntitlementPurpose,
    pub display_name: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub description: String,
    /// Resource type IDs that may receive this entitlement.
    pub grantable_to: Vec<String>,
    #[serde(skip_serializing_if = "Annotations::is_empty", default)]
    pub annotations: Annotations,
}

impl Entitlement {
    /// Declare a permission entitlement on `resource`.
    ///
    /// The display name defaults to the slug.
    pub fn permission(resource: &Resource, slug: impl Into<String>) -> Self {
        Self::for_resource_id(&resource.id, slug)
    }

    /// Declare a permission entitlement on the resource `resource_id`.
    pub fn for_resource_id(resource_id: &ResourceId, slug: impl Into<String>) -> Self {
        let slug = slug.into();
        Self {
            id: entitlement_id(resource_id, &slug),
            resource: resource_id.clone(),
            display_name: slug.clone(),
            slug,
            purpose: EntitlementPurpose::Permission,
            description: String::new(),
            grantable_to: Vec::new(),
            annotations: Annotations::new(),
        }
    }

    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Allow principals of `resource_type` to receive this entitlement.
    #[must_use]
    pub fn with_grantable_to(mut self, resource_type: &ResourceType) -> Self {
        let id = resource_type.id.to_string();
        if !self.grantable_to.contains(&id) {
            self.grantable_to.push(id);
        }
        self
    }

    /// Check whether principals of `resource_type` may receive this entitlement.
    #[must_use]
    pub fn is_grantable_to(&self, resource_type: &ResourceType) -> bool {
        self.grantable_to.iter().any(|t| t == resource_type.id)
    }
}

impl fmt::Display for Entitlement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// Entitlement ID for `slug` on `resource`.
#[must_use]
pub fn entitlement_id(resource: &ResourceId, slug: &str) -> String {
    format!("{}:{}:{}", resource.resource_type, resource.resource, slug)
}
