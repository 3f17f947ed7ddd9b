//! Full sync driver.
//!
//! Walks every syncer of a connector the way a host would: page through the
//! resources, then page through each resource's entitlements and grants.
//! Resources, entitlements and grants are upserted by ID.

use serde::Serialize;
use std::collections::HashSet;
use std::future::Future;
use tracing::{debug, info, instrument};

use crate::entitlement::Entitlement;
use crate::error::{ConnectorError, ConnectorResult};
use crate::grant::Grant;
use crate::pagination::PageToken;
use crate::resource::Resource;
use crate::traits::{Connector, Page, ResourceSyncer};
use crate::types::ResourceType;

/// Default cap on pages fetched for a single listing.
pub const DEFAULT_MAX_PAGES: usize = 10_000;

/// Everything collected by a full sync.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncOutput {
    pub resource_types: Vec<ResourceType>,
    pub resources: Vec<Resource>,
    pub entitlements: Vec<Entitlement>,
    pub grants: Vec<Grant>,
}

impl SyncOutput {
    /// Grants held by the principal `principal_id` (e.g. `user:u1`).
    pub fn grants_for_principal<'a>(
        &'a self,
        principal_id: &'a str,
    ) -> impl Iterator<Item = &'a Grant> + 'a {
        self.grants
            .iter()
            .filter(move |g| g.principal.to_string() == principal_id)
    }
}

/// Drives a full sync of a connector.
#[derive(Debug, Clone)]
pub struct SyncRunner {
    page_size: u32,
    max_pages: usize,
}

impl SyncRunner {
    /// Create a runner requesting `page_size` items per page.
    #[must_use]
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    /// Set the per-listing page cap.
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Run a full sync.
    #[instrument(skip(self, connector), fields(connector = %connector.metadata().display_name))]
    pub async fn run(&self, connector: &dyn Connector) -> ConnectorResult<SyncOutput> {
        let mut output = SyncOutput::default();
        let mut resource_ids = HashSet::new();
        let mut entitlement_ids = HashSet::new();
        let mut grant_ids = HashSet::new();

        for syncer in connector.resource_syncers() {
            let syncer: &dyn ResourceSyncer = syncer.as_ref();
            let resource_type = *syncer.resource_type();
            output.resource_types.push(resource_type);

            let resources = self
                .collect(resource_type.id, "list", move |token| async move {
                    syncer.list(None, &token).await
                })
                .await?;
            debug!(
                resource_type = resource_type.id,
                count = resources.len(),
                "Listed resources"
            );

            // Listings may repeat a resource across pages; keep the first.
            let resources: Vec<Resource> = resources
                .into_iter()
                .filter(|r| resource_ids.insert(r.id.to_string()))
                .collect();

            for resource in &resources {
                let entitlements = self
                    .collect(resource_type.id, "entitlements", move |token| async move {
                        syncer.entitlements(resource, &token).await
                    })
                    .await?;
                for ent in entitlements {
                    if entitlement_ids.insert(ent.id.clone()) {
                        output.entitlements.push(ent);
                    }
                }

                let grants = self
                    .collect(resource_type.id, "grants", move |token| async move {
                        syncer.grants(resource, &token).await
                    })
                    .await?;
                for grant in grants {
                    if grant_ids.insert(grant.id.clone()) {
                        output.grants.push(grant);
                    }
                }
            }

            output.resources.extend(resources);
        }

        info!(
            resources = output.resources.len(),
            entitlements = output.entitlements.len(),
            grants = output.grants.len(),
            "Sync complete"
        );

        Ok(output)
    }

    /// Page through one listing until its token runs out.
    async fn collect<T, F, Fut>(
        &self,
        resource_type: &str,
        operation: &str,
        mut fetch: F,
    ) -> ConnectorResult<Vec<T>>
    where
        F: FnMut(PageToken) -> Fut,
        Fut: Future<Output = ConnectorResult<Page<T>>>,
    {
        let mut items = Vec::new();
        let mut token = PageToken::first(self.page_size);

        for _ in 0..self.max_pages {
            let page = fetch(token.clone()).await?;
            let more = page.has_more();
            let next_page_token = page.next_page_token;
            items.extend(page.items);

            if !more {
                return Ok(items);
            }
            if next_page_token == token.token {
                return Err(ConnectorError::internal(format!(
                    "{resource_type} {operation} returned the same page token twice"
                )));
            }
            token = PageToken::next(self.page_size, next_page_token);
        }

        Err(ConnectorError::internal(format!(
            "{resource_type} {operation} exceeded {} pages",
            self.max_pages
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ResourceId;
    use crate::resource::{GroupTrait, UserTrait};
    use crate::traits::ConnectorMetadata;
    use crate::types::ResourceTrait;
    use async_trait::async_trait;

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

    struct Users;

    #[async_trait]
    impl ResourceSyncer for Users {
        fn resource_type(&self) -> &ResourceType {
            &USER
        }

        async fn list(
            &self,
            parent: Option<&ResourceId>,
            token: &PageToken,
        ) -> ConnectorResult<Page<Resource>> {
            let (id, next) = if token.is_first() { ("u1", "p2") } else { ("u2", "") };
            let user = Resource::builder(&USER, id, id)
                .with_parent(parent)
                .with_user_trait(UserTrait::new())
                .build()?;
            Ok(Page::with_next(vec![user], next))
        }

        async fn entitlements(
            &self,
            _resource: &Resource,
            _token: &PageToken,
        ) -> ConnectorResult<Page<Entitlement>> {
            Ok(Page::empty())
        }

        async fn grants(
            &self,
            _resource: &Resource,
            _token: &PageToken,
        ) -> ConnectorResult<Page<Grant>> {
            Ok(Page::empty())
        }
    }

    /// Emits the same grants for every team, like a page-wide grant listing.
    struct Teams;

    #[async_trait]
    impl ResourceSyncer for Teams {
        fn resource_type(&self) -> &ResourceType {
            &TEAM
        }

        async fn list(
            &self,
            _parent: Option<&ResourceId>,
            _token: &PageToken,
        ) -> ConnectorResult<Page<Resource>> {
            let teams = ["t1", "t2"]
                .iter()
                .map(|id| {
                    Resource::builder(&TEAM, *id, *id)
                        .with_group_trait(GroupTrait::new())
                        .build()
                })
                .collect::<ConnectorResult<Vec<_>>>()?;
            Ok(Page::complete(teams))
        }

        async fn entitlements(
            &self,
            resource: &Resource,
            _token: &PageToken,
        ) -> ConnectorResult<Page<Entitlement>> {
            Ok(Page::complete(vec![Entitlement::permission(resource, "member")]))
        }

        async fn grants(
            &self,
            _resource: &Resource,
            _token: &PageToken,
        ) -> ConnectorResult<Page<Grant>> {
            let team = ResourceId::from_parts("team", "t1")?;
            let user = ResourceId::from_parts("user", "u1")?;
            Ok(Page::complete(vec![Grant::new(&team, "member", user)]))
        }
    }

    /// Never finishes: always returns the same token.
    struct Stuck;

    #[async_trait]
    impl ResourceSyncer for Stuck {
        fn resource_type(&self) -> &ResourceType {
            &TEAM
        }

        async fn list(
            &self,
            _parent: Option<&ResourceId>,
            _token: &PageToken,
        ) -> ConnectorResult<Page<Resource>> {
            Ok(Page::with_next(Vec::new(), "again"))
        }

        async fn entitlements(
            &self,
            _resource: &Resource,
            _token: &PageToken,
        ) -> ConnectorResult<Page<Entitlement>> {
            Ok(Page::empty())
        }

        async fn grants(
            &self,
            _resource: &Resource,
            _token: &PageToken,
        ) -> ConnectorResult<Page<Grant>> {
            Ok(Page::empty())
        }
    }

    /// Reports the same team on both of its pages.
    struct RepeatingTeams;

    #[async_trait]
    impl ResourceSyncer for RepeatingTeams {
        fn resource_type(&self) -> &ResourceType {
            &TEAM
        }

        async fn list(
            &self,
            _parent: Option<&ResourceId>,
            token: &PageToken,
        ) -> ConnectorResult<Page<Resource>> {
            let next = if token.is_first() { "p2" } else { "" };
            let team = Resource::builder(&TEAM, "t1", "Team 1")
                .with_group_trait(GroupTrait::new())
                .build()?;
            Ok(Page::with_next(vec![team], next))
        }

        async fn entitlements(
            &self,
            resource: &Resource,
            _token: &PageToken,
        ) -> ConnectorResult<Page<Entitlement>> {
            Ok(Page::complete(vec![Entitlement::permission(resource, "member")]))
        }

        async fn grants(
            &self,
            _resource: &Resource,
            _token: &PageToken,
        ) -> ConnectorResult<Page<Grant>> {
            Ok(Page::empty())
        }
    }

    struct RepeatingConnector;

    #[async_trait]
    impl Connector for RepeatingConnector {
        fn metadata(&self) -> ConnectorMetadata {
            ConnectorMetadata {
                display_name: "repeating".to_string(),
                description: String::new(),
            }
        }

        async fn validate(&self) -> ConnectorResult<()> {
            Ok(())
        }

        fn resource_syncers(&self) -> Vec<Box<dyn ResourceSyncer>> {
            vec![Box::new(RepeatingTeams)]
        }
    }

    struct TestConnector {
        stuck: bool,
    }

    #[async_trait]
    impl Connector for TestConnector {
        fn metadata(&self) -> ConnectorMetadata {
            ConnectorMetadata {
                display_name: "test".to_string(),
                description: String::new(),
            }
        }

        async fn validate(&self) -> ConnectorResult<()> {
            Ok(())
        }

        fn resource_syncers(&self) -> Vec<Box<dyn ResourceSyncer>> {
            if self.stuck {
                vec![Box::new(Stuck)]
            } else {
                vec![Box::new(Users), Box::new(Teams)]
            }
        }
    }

    #[tokio::test]
    async fn test_full_sync_pages_and_upserts() {
        let output = SyncRunner::new(10)
            .run(&TestConnector { stuck: false })
            .await
            .unwrap();

        assert_eq!(output.resource_types.len(), 2);
        let ids: Vec<String> = output.resources.iter().map(|r| r.id.to_string()).collect();
        assert_eq!(ids, vec!["user:u1", "user:u2", "team:t1", "team:t2"]);
        assert_eq!(output.entitlements.len(), 2);
        // both teams reported the same grant
        assert_eq!(output.grants.len(), 1);
        assert_eq!(output.grants_for_principal("user:u1").count(), 1);
    }

    #[tokio::test]
    async fn test_resources_upserted_across_pages() {
        let output = SyncRunner::new(1).run(&RepeatingConnector).await.unwrap();

        let ids: Vec<String> = output.resources.iter().map(|r| r.id.to_string()).collect();
        assert_eq!(ids, vec!["team:t1"]);
        assert_eq!(output.entitlements.len(), 1);
    }

    #[tokio::test]
    async fn test_repeated_token_is_an_error() {
        let err = SyncRunner::new(10)
            .run(&TestConnector { stuck: true })
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "INTERNAL_ERROR");
        assert!(err.to_string().contains("same page token"));
    }

    #[tokio::test]
    async fn test_page_cap() {
        let err = SyncRunner::new(10)
            .with_max_pages(1)
            .run(&TestConnector { stuck: false })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("exceeded 1 pages"));
    }
}
