//! Resources synced from the target system.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::annotations::Annotations;
use crate::error::{ConnectorError, ConnectorResult};
use crate::ids::ResourceId;
use crate::types::{ResourceTrait, ResourceType};

/// Account status carried on a user trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    #[default]
    Enabled,
    Disabled,
}

/// Email address of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEmail {
    pub address: String,
    pub is_primary: bool,
}

/// Identity data for resources with the `user` trait.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserTrait {
    pub profile: Map<String, Value>,
    pub emails: Vec<UserEmail>,
    pub status: UserStatus,
}

impl UserTrait {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a profile attribute.
    #[must_use]
    pub fn with_profile(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.profile.insert(key.into(), value.into());
        self
    }

    /// Add an email address. Empty addresses are ignored.
    #[must_use]
    pub fn with_email(mut self, address: impl Into<String>, is_primary: bool) -> Self {
        let address = address.into();
        if !address.is_empty() {
            self.emails.push(UserEmail {
                address,
                is_primary,
            });
        }
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: UserStatus) -> Self {
        self.status = status;
        self
    }

    /// Primary email, if one was recorded.
    #[must_use]
    pub fn primary_email(&self) -> Option<&str> {
        self.emails
            .iter()
            .find(|e| e.is_primary)
            .map(|e| e.address.as_str())
    }
}

/// Data for resources with the `group` trait.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupTrait {
    pub profile: Map<String, Value>,
}

impl GroupTrait {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a profile attribute.
    #[must_use]
    pub fn with_profile(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.profile.insert(key.into(), value.into());
        self
    }
}

/// Trait data attached to a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "trait", rename_all = "lowercase")]
pub enum TraitData {
    User(UserTrait),
    Group(GroupTrait),
}

impl TraitData {
    /// The trait this data belongs to.
    #[must_use]
    pub fn kind(&self) -> ResourceTrait {
        match self {
            TraitData::User(_) => ResourceTrait::User,
            TraitData::Group(_) => ResourceTrait::Group,
        }
    }
}

/// One object in the target system, as seen by the governance platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_resource_id: Option<ResourceId>,
    pub display_name: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub description: String,
    pub traits: Vec<TraitData>,
    #[serde(skip_serializing_if = "Annotations::is_empty", default)]
    pub annotations: Annotations,
}

impl Resource {
    /// Start building a resource of `resource_type`.
    pub fn builder(
        resource_type: &ResourceType,
        id: impl Into<String>,
        display_name: impl Into<String>,
    ) -> ResourceBuilder {
        ResourceBuilder {
            resource_type: *resource_type,
            id: id.into(),
            display_name: display_name.into(),
            parent: None,
            description: String::new(),
            traits: Vec::new(),
            annotations: Annotations::new(),
        }
    }

    /// User trait data, if present.
    #[must_use]
    pub fn user_trait(&self) -> Option<&UserTrait> {
        self.traits.iter().find_map(|t| match t {
            TraitData::User(user) => Some(user),
            TraitData::Group(_) => None,
        })
    }

    /// Group trait data, if present.
    #[must_use]
    pub fn group_trait(&self) -> Option<&GroupTrait> {
        self.traits.iter().find_map(|t| match t {
            TraitData::Group(group) => Some(group),
            TraitData::User(_) => None,
        })
    }
}

/// Builder returned by [`Resource::builder`].
#[derive(Debug, Clone)]
pub struct ResourceBuilder {
    resource_type: ResourceType,
    id: String,
    display_name: String,
    parent: Option<ResourceId>,
    description: String,
    traits: Vec<TraitData>,
    annotations: Annotations,
}

impl ResourceBuilder {
    /// Parent the resource under `parent`, when given.
    #[must_use]
    pub fn with_parent(mut self, parent: Option<&ResourceId>) -> Self {
        self.parent = parent.cloned();
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_user_trait(mut self, user: UserTrait) -> Self {
        self.traits.push(TraitData::User(user));
        self
    }

    #[must_use]
    pub fn with_group_trait(mut self, group: GroupTrait) -> Self {
        self.traits.push(TraitData::Group(group));
        self
    }

    #[must_use]
    pub fn with_annotations(mut self, annotations: Annotations) -> Self {
        self.annotations.extend(annotations);
        self
    }

    /// Validate and build the resource.
    ///
    /// Fails when the ID is malformed or a trait is attached that the
    /// resource type does not declare.
    pub fn build(self) -> ConnectorResult<Resource> {
        let id = ResourceId::new(&self.resource_type, self.id)?;

        for data in &self.traits {
            if !self.resource_type.has_trait(data.kind()) {
                return Err(ConnectorError::invalid_data(format!(
                    "resource type {} does not declare the {} trait",
                    self.resource_type,
                    data.kind()
                )));
            }
        }

        Ok(Resource {
            id,
            parent_resource_id: self.parent,
            display_name: self.display_name,
            description: self.description,
            traits: self.traits,
            annotations: self.annotations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER: ResourceType = ResourceType {
        id: "user",
        display_name: "User",
        traits: &[ResourceTrait::User],
        description: "",
    };

    const TEAM: ResourceType = ResourceType {
        id: "team",
        display_name: "Team",
        traits: &[ResourceTrait::Group],
        description: "",
    };

    #[test]
    fn test_build_user_resource() {
        let parent = ResourceId::from_parts("workspace", "w1").unwrap();
        let resource = Resource::builder(&USER, "u1", "Alice")
            .with_parent(Some(&parent))
            .with_user_trait(
                UserTrait::new()
                    .with_profile("user_id", "u1")
                    .with_profile("email", "a@x.io")
                    .with_email("a@x.io", true),
            )
            .build()
            .unwrap();

        assert_eq!(resource.id.to_string(), "user:u1");
        assert_eq!(resource.parent_resource_id, Some(parent));
        let user = resource.user_trait().unwrap();
        assert_eq!(user.primary_email(), Some("a@x.io"));
        assert_eq!(user.profile["user_id"], "u1");
        assert!(resource.group_trait().is_none());
    }

    #[test]
    fn test_build_rejects_undeclared_trait() {
        let err = Resource::builder(&TEAM, "t1", "Core")
            .with_user_trait(UserTrait::new())
            .build()
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_DATA");
    }

    #[test]
    fn test_build_rejects_malformed_id() {
        assert!(Resource::builder(&TEAM, "", "Core").build().is_err());
    }

    #[test]
    fn test_empty_email_is_ignored() {
        let user = UserTrait::new().with_email("", true);
        assert!(user.emails.is_empty());
        assert_eq!(user.primary_email(), None);
    }

    #[test]
    fn test_resource_serialization_skips_empty_fields() {
        let resource = Resource::builder(&TEAM, "t1", "Core")
            .with_group_trait(GroupTrait::new())
            .build()
            .unwrap();
        let json = serde_json::to_value(&resource).unwrap();
        assert!(json.get("description").is_none());
        assert!(json.get("parent_resource_id").is_none());
        assert_eq!(json["traits"][0]["trait"], "group");
    }
}
