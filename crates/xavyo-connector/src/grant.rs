//! Grants: an entitlement held by a principal.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::annotations::{Annotation, Annotations};
use crate::entitlement::entitlement_id;
use crate::ids::ResourceId;

/// A principal holding an entitlement on a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grant {
    /// `{entitlement_id}:{principal_type}:{principal_id}`
    pub id: String,
    pub entitlement_id: String,
    /// Resource the entitlement belongs to.
    pub resource: ResourceId,
    pub slug: String,
    pub principal: ResourceId,
    #[serde(skip_serializing_if = "Annotations::is_empty", default)]
    pub annotations: Annotations,
}

impl Grant {
    /// Grant entitlement `slug` on `resource` to `principal`.
    pub fn new(resource: &ResourceId, slug: impl Into<String>, principal: ResourceId) -> Self {
        let slug = slug.into();
        let entitlement_id = entitlement_id(resource, &slug);
        Self {
            id: format!(
                "{}:{}:{}",
                entitlement_id, principal.resource_type, principal.resource
            ),
            entitlement_id,
            resource: resource.clone(),
            slug,
            principal,
            annotations: Annotations::new(),
        }
    }

    #[must_use]
    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}

impl fmt::Display for Grant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grant_ids() {
        let schedule = ResourceId::from_parts("schedule", "s1").unwrap();
        let user = ResourceId::from_parts("user", "u1").unwrap();
        let grant = Grant::new(&schedule, "On_Call", user.clone());

        assert_eq!(grant.entitlement_id, "schedule:s1:On_Call");
        assert_eq!(grant.id, "schedule:s1:On_Call:user:u1");
        assert_eq!(grant.principal, user);
        assert!(grant.annotations.is_empty());
    }

    #[test]
    fn test_grant_with_annotation() {
        let role = ResourceId::from_parts("base_role", "r1").unwrap();
        let user = ResourceId::from_parts("user", "u1").unwrap();
        let grant = Grant::new(&role, "assigned", user).with_annotation(Annotation::V1Identifier {
            id: "base-role-grant:r1:u1".to_string(),
        });

        assert_eq!(grant.annotations.v1_identifier(), Some("base-role-grant:r1:u1"));
        assert_eq!(grant.to_string(), "base_role:r1:assigned:user:u1");
    }
}
