//! Base and custom roles.
//!
//! Roles are not listed by the API; they are discovered embedded in users.
//! Each list call sees one page of users and emits every distinct role ID in
//! it once, in the order first seen. The first user carrying an ID supplies
//! the role's name, description and slug.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, instrument};
use xavyo_connector::annotations::Annotation;
use xavyo_connector::entitlement::Entitlement;
use xavyo_connector::error::{ConnectorError, ConnectorResult};
use xavyo_connector::grant::Grant;
use xavyo_connector::ids::ResourceId;
use xavyo_connector::pagination::{PageBag, PageToken};
use xavyo_connector::resource::{GroupTrait, Resource};
use xavyo_connector::traits::{Page, ResourceSyncer};
use xavyo_connector::types::ResourceType;

use crate::client::{IncidentClient, PageOptions};
use crate::models::{Role, User};
use crate::resource_types::{BASE_ROLE, CUSTOM_ROLE, USER};

/// Entitlement slug for holding a role.
pub const ASSIGNED: &str = "assigned";

/// Distinct base roles across `users`.
#[must_use]
pub fn collect_base_roles(users: &[User]) -> Vec<Role> {
    dedup(users.iter().filter_map(|u| u.base_role.as_ref()))
}

/// Distinct custom roles across `users`.
#[must_use]
pub fn collect_custom_roles(users: &[User]) -> Vec<Role> {
    dedup(users.iter().flat_map(|u| u.custom_roles.iter()))
}

fn dedup<'a>(roles: impl Iterator<Item = &'a Role>) -> Vec<Role> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for role in roles {
        if role.id.is_empty() {
            continue;
        }
        if seen.insert(role.id.as_str()) {
            out.push(role.clone());
        }
    }
    out
}

/// Which of a user's role slots a syncer handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleKind {
    Base,
    Custom,
}

impl RoleKind {
    #[must_use]
    pub fn resource_type(self) -> &'static ResourceType {
        match self {
            RoleKind::Base => &BASE_ROLE,
            RoleKind::Custom => &CUSTOM_ROLE,
        }
    }

    /// Distinct roles of this kind across `users`.
    #[must_use]
    pub fn collect(self, users: &[User]) -> Vec<Role> {
        match self {
            RoleKind::Base => collect_base_roles(users),
            RoleKind::Custom => collect_custom_roles(users),
        }
    }

    fn label(self) -> &'static str {
        match self {
            RoleKind::Base => "Base role",
            RoleKind::Custom => "Custom role",
        }
    }

    fn noun(self) -> &'static str {
        match self {
            RoleKind::Base => "base roles",
            RoleKind::Custom => "custom roles",
        }
    }

    /// Stable identifier of the grant of role `role_id` to user `user_id`.
    #[must_use]
    pub fn grant_identifier(self, role_id: &str, user_id: &str) -> String {
        match self {
            RoleKind::Base => format!("base-role-grant:{role_id}:{user_id}"),
            RoleKind::Custom => format!("custom-role-grant:{role_id}:{user_id}"),
        }
    }

    /// `assigned` grant of role `role_id` to `user`.
    pub fn grant(self, role_id: &str, user: &ResourceId) -> ConnectorResult<Grant> {
        let role = ResourceId::new(self.resource_type(), role_id)?;
        Ok(
            Grant::new(&role, ASSIGNED, user.clone()).with_annotation(Annotation::V1Identifier {
                id: self.grant_identifier(role_id, &user.resource),
            }),
        )
    }
}

/// Lists base or custom roles out of a page of users.
pub struct RoleSyncer {
    kind: RoleKind,
    client: Arc<IncidentClient>,
}

impl RoleSyncer {
    pub fn new(kind: RoleKind, client: Arc<IncidentClient>) -> Self {
        Self { kind, client }
    }

    pub fn base(client: Arc<IncidentClient>) -> Self {
        Self::new(RoleKind::Base, client)
    }

    pub fn custom(client: Arc<IncidentClient>) -> Self {
        Self::new(RoleKind::Custom, client)
    }

    fn role_resource(&self, role: &Role, parent: Option<&ResourceId>) -> ConnectorResult<Resource> {
        Resource::builder(self.kind.resource_type(), role.id.as_str(), role.name.as_str())
            .with_parent(parent)
            .with_description(role.description.as_str())
            .with_group_trait(GroupTrait::new())
            .build()
    }
}

#[async_trait]
impl ResourceSyncer for RoleSyncer {
    fn resource_type(&self) -> &ResourceType {
        self.kind.resource_type()
    }

    #[instrument(skip(self, parent, token), fields(resource_type = self.kind.resource_type().id))]
    async fn list(
        &self,
        parent: Option<&ResourceId>,
        token: &PageToken,
    ) -> ConnectorResult<Page<Resource>> {
        let mut bag = PageBag::resume(&token.token, self.kind.resource_type().id)?;

        let page = self
            .client
            .list_users(&PageOptions::new(token.size, bag.page_token()))
            .await
            .map_err(|e| {
                error!(error = %e, "Error fetching users for {}", self.kind.noun());
                ConnectorError::operation_failed_with_source(
                    format!("error fetching users for {}", self.kind.noun()),
                    e,
                )
            })?;

        let resources = self
            .kind
            .collect(&page.items)
            .iter()
            .map(|role| {
                self.role_resource(role, parent).map_err(|e| {
                    ConnectorError::operation_failed_with_source(
                        format!("error creating {} resource", self.kind.label().to_lowercase()),
                        e,
                    )
                })
            })
            .collect::<ConnectorResult<Vec<_>>>()?;

        let next = bag.next_token(&page.after)?;
        Ok(Page::with_next(resources, next).with_annotations(page.annotations))
    }

    async fn entitlements(
        &self,
        resource: &Resource,
        _token: &PageToken,
    ) -> ConnectorResult<Page<Entitlement>> {
        let entitlement = Entitlement::permission(resource, ASSIGNED)
            .with_grantable_to(&USER)
            .with_description(format!("{}: {}", self.kind.label(), resource.display_name))
            .with_display_name(format!("Role: {}", resource.display_name));
        Ok(Page::complete(vec![entitlement]))
    }

    /// Role grants are emitted from the user side.
    async fn grants(
        &self,
        _resource: &Resource,
        _token: &PageToken,
    ) -> ConnectorResult<Page<Grant>> {
        Ok(Page::empty())
    }
}
