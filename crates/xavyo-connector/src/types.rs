//! Connector Framework type definitions
//!
//! Resource type descriptors and the traits a resource type can declare.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Trait a resource type exposes to the governance platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceTrait {
    /// Identity that can receive grants.
    User,
    /// Container of members (roles, teams, schedules).
    Group,
}

impl ResourceTrait {
    /// Get all available resource traits.
    #[must_use]
    pub fn all() -> &'static [ResourceTrait] {
        &[ResourceTrait::User, ResourceTrait::Group]
    }

    /// Get the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceTrait::User => "user",
            ResourceTrait::Group => "group",
        }
    }
}

impl fmt::Display for ResourceTrait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ResourceTrait {
    type Err = ParseResourceTraitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(ResourceTrait::User),
            "group" => Ok(ResourceTrait::Group),
            _ => Err(ParseResourceTraitError(s.to_string())),
        }
    }
}

/// Error parsing resource trait from string.
#[derive(Debug, Clone)]
pub struct ParseResourceTraitError(String);

impl fmt::Display for ParseResourceTraitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid resource trait '{}', expected one of: user, group",
            self.0
        )
    }
}

impl std::error::Error for ParseResourceTraitError {}

/// Static descriptor of a kind of resource a connector syncs.
///
/// Connectors declare these as constants; every resource, entitlement and
/// grant refers back to one by `id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ResourceType {
    /// Stable identifier (e.g. `user`, `schedule`).
    pub id: &'static str,
    /// Human readable name.
    pub display_name: &'static str,
    /// Traits resources of this type carry.
    pub traits: &'static [ResourceTrait],
    /// Optional description shown by the platform.
    #[serde(skip_serializing_if = "is_blank")]
    pub description: &'static str,
}

fn is_blank(value: &&'static str) -> bool {
    value.is_empty()
}

impl ResourceType {
    /// Check whether this type declares the given trait.
    #[must_use]
    pub fn has_trait(&self, resource_trait: ResourceTrait) -> bool {
        self.traits.contains(&resource_trait)
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}
