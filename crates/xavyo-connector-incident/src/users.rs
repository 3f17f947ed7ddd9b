//! User syncer.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, instrument};
use xavyo_connector::entitlement::Entitlement;
use xavyo_connector::error::{ConnectorError, ConnectorResult};
use xavyo_connector::grant::Grant;
use xavyo_connector::ids::ResourceId;
use xavyo_connector::pagination::{PageBag, PageToken};
use xavyo_connector::resource::{Resource, UserTrait};
use xavyo_connector::traits::{Page, ResourceSyncer};
use xavyo_connector::types::ResourceType;

use crate::client::{IncidentClient, PageOptions};
use crate::models::User;
use crate::resource_types::USER;
use crate::roles::RoleKind;

/// Lists users and resolves the roles each one holds.
pub struct UserSyncer {
    client: Arc<IncidentClient>,
}

impl UserSyncer {
    pub fn new(client: Arc<IncidentClient>) -> Self {
        Self { client }
    }
}

/// Build the user resource for `user`.
pub fn user_resource(user: &User, parent: Option<&ResourceId>) -> ConnectorResult<Resource> {
    let traits = UserTrait::new()
        .with_profile("user_id", user.id.as_str())
        .with_profile("email", user.email.as_str())
        .with_email(user.email.as_str(), true);

    Resource::builder(&USER, user.id.as_str(), user.name.as_str())
        .with_parent(parent)
        .with_user_trait(traits)
        .build()
}

/// `assigned` grants for every role `user` holds.
///
/// Roles with an empty ID are ignored. A role whose grant cannot be built is
/// logged and skipped; the user's other grants are kept.
pub fn user_role_grants(user: &User, principal: &ResourceId) -> Vec<Grant> {
    let base = user
        .base_role
        .iter()
        .map(|role| (RoleKind::Base, role));
    let custom = user
        .custom_roles
        .iter()
        .map(|role| (RoleKind::Custom, role));

    base.chain(custom)
        .filter(|(_, role)| !role.id.is_empty())
        .filter_map(|(kind, role)| match kind.grant(&role.id, principal) {
            Ok(grant) => Some(grant),
            Err(e) => {
                error!(
                    user_id = %user.id,
                    role_id = %role.id,
                    error = %e,
                    "Skipping role grant with malformed ID"
                );
                None
            }
        })
        .collect()
}

#[async_trait]
impl ResourceSyncer for UserSyncer {
    fn resource_type(&self) -> &ResourceType {
        &USER
    }

    #[instrument(skip(self, parent, token), fields(resource_type = USER.id))]
    async fn list(
        &self,
        parent: Option<&ResourceId>,
        token: &PageToken,
    ) -> ConnectorResult<Page<Resource>> {
        let mut bag = PageBag::resume(&token.token, USER.id)?;

        let page = self
            .client
            .list_users(&PageOptions::new(token.size, bag.page_token()))
            .await
            .map_err(|e| {
                error!(error = %e, "Error fetching users");
                ConnectorError::operation_failed_with_source("error fetching users", e)
            })?;

        let resources = page
            .items
            .iter()
            .map(|user| {
                user_resource(user, parent).map_err(|e| {
                    ConnectorError::operation_failed_with_source("error creating user resource", e)
                })
            })
            .collect::<ConnectorResult<Vec<_>>>()?;

        let next = bag.next_token(&page.after)?;
        Ok(Page::with_next(resources, next).with_annotations(page.annotations))
    }

    /// Users offer no entitlements.
    async fn entitlements(
        &self,
        _resource: &Resource,
        _token: &PageToken,
    ) -> ConnectorResult<Page<Entitlement>> {
        Ok(Page::empty())
    }

    #[instrument(skip(self, resource, _token), fields(user_id = %resource.id.resource))]
    async fn grants(&self, resource: &Resource, _token: &PageToken) -> ConnectorResult<Page<Grant>> {
        let user_id = resource.id.resource.as_str();

        let (user, annotations) = self.client.get_user(user_id).await.map_err(|e| {
            error!(user_id = %user_id, error = %e, "failed to fetch user for grant resolution");
            e
        })?;

        let grants = user_role_grants(&user, &resource.id);
        debug!(count = grants.len(), "Resolved role grants");

        Ok(Page::complete(grants).with_annotations(annotations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn role(id: &str) -> Role {
        Role {
            id: id.to_string(),
            name: id.to_uppercase(),
            description: String::new(),
            slug: id.to_string(),
        }
    }

    fn alice() -> User {
        User {
            id: "u1".to_string(),
            name: "Alice".to_string(),
            email: "a@x.io".to_string(),
            base_role: Some(role("r1")),
            custom_roles: vec![role("c1"), role(""), role("c2")],
        }
    }

    #[test]
    fn test_user_resource() {
        let parent = ResourceId::from_parts("org", "acme").unwrap();
        let resource = user_resource(&alice(), Some(&parent)).unwrap();

        assert_eq!(resource.id.to_string(), "user:u1");
        assert_eq!(resource.display_name, "Alice");
        assert_eq!(resource.parent_resource_id, Some(parent));

        let traits = resource.user_trait().unwrap();
        assert_eq!(traits.profile["user_id"], "u1");
        assert_eq!(traits.profile["email"], "a@x.io");
        assert_eq!(traits.primary_email(), Some("a@x.io"));
    }

    #[test]
    fn test_user_resource_rejects_empty_id() {
        let mut user = alice();
        user.id.clear();
        assert!(user_resource(&user, None).is_err());
    }

    #[test]
    fn test_user_role_grants() {
        let principal = ResourceId::new(&USER, "u1").unwrap();
        let grants = user_role_grants(&alice(), &principal);
        let identifiers: Vec<&str> = grants
            .iter()
            .filter_map(|g| g.annotations.v1_identifier())
            .collect();
        assert_eq!(
            identifiers,
            vec![
                "base-role-grant:r1:u1",
                "custom-role-grant:c1:u1",
                "custom-role-grant:c2:u1",
            ]
        );
        assert!(grants.iter().all(|g| g.slug == "assigned"));
    }

    #[test]
    fn test_malformed_role_skips_only_its_grant() {
        let mut user = alice();
        user.base_role = Some(role(" "));
        let principal = ResourceId::new(&USER, "u1").unwrap();

        let grants = user_role_grants(&user, &principal);
        let ids: Vec<&str> = grants.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "custom_role:c1:assigned:user:u1",
                "custom_role:c2:assigned:user:u1",
            ]
        );
    }

    #[test]
    fn test_user_without_roles_has_no_grants() {
        let mut user = alice();
        user.base_role = Some(role(""));
        user.custom_roles.clear();
        let principal = ResourceId::new(&USER, "u1").unwrap();
        assert!(user_role_grants(&user, &principal).is_empty());
    }
}
