//! Connector Framework ID types
//!
//! Validated references to resources in the target system.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ConnectorError, ConnectorResult};
use crate::types::ResourceType;

/// Reference to one resource: its type ID plus the upstream identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceId {
    /// Resource type ID (e.g. `user`).
    pub resource_type: String,
    /// Identifier of the resource in the target system.
    pub resource: String,
}

impl ResourceId {
    /// Create a reference to a resource of the given type.
    ///
    /// Fails when the identifier is empty, only whitespace, or contains
    /// control characters.
    pub fn new(resource_type: &ResourceType, resource: impl Into<String>) -> ConnectorResult<Self> {
        Self::from_parts(resource_type.id, resource)
    }

    /// Create a reference from raw type and resource identifiers.
    pub fn from_parts(
        resource_type: impl Into<String>,
        resource: impl Into<String>,
    ) -> ConnectorResult<Self> {
        let resource_type = resource_type.into();
        let resource = resource.into();

        validate_part("resource type", &resource_type)?;
        validate_part("resource id", &resource)?;

        Ok(Self {
            resource_type,
            resource,
        })
    }

    /// Check whether this reference points at a resource of `resource_type`.
    #[must_use]
    pub fn is_type(&self, resource_type: &ResourceType) -> bool {
        self.resource_type == resource_type.id
    }
}

fn validate_part(what: &str, value: &str) -> ConnectorResult<()> {
    if value.trim().is_empty() {
        return Err(ConnectorError::invalid_data(format!("{what} must not be empty")));
    }
    if value.chars().any(char::is_control) {
        return Err(ConnectorError::invalid_data(format!(
            "{what} '{}' contains control characters",
            value.escape_debug()
        )));
    }
    Ok(())
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.resource_type, self.resource)
    }
}
