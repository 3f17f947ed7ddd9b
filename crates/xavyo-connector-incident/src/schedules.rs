//! Schedule syncer.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, instrument};
use xavyo_connector::entitlement::Entitlement;
use xavyo_connector::error::{ConnectorError, ConnectorResult};
use xavyo_connector::grant::Grant;
use xavyo_connector::ids::ResourceId;
use xavyo_connector::pagination::{PageBag, PageToken};
use xavyo_connector::resource::{GroupTrait, Resource};
use xavyo_connector::traits::{Page, ResourceSyncer};
use xavyo_connector::types::ResourceType;

use crate::assignments::{schedule_grants, ScheduleRelation};
use crate::client::{IncidentClient, PageOptions};
use crate::models::Schedule;
use crate::resource_types::{SCHEDULE, USER};

/// Lists schedules and derives on-call and member grants.
pub struct ScheduleSyncer {
    client: Arc<IncidentClient>,
}

impl ScheduleSyncer {
    pub fn new(client: Arc<IncidentClient>) -> Self {
        Self { client }
    }
}

/// Build the group resource for `schedule`.
pub fn schedule_resource(
    schedule: &Schedule,
    parent: Option<&ResourceId>,
) -> ConnectorResult<Resource> {
    Resource::builder(&SCHEDULE, schedule.id.as_str(), schedule.name.as_str())
        .with_parent(parent)
        .with_group_trait(GroupTrait::new())
        .build()
}

#[async_trait]
impl ResourceSyncer for ScheduleSyncer {
    fn resource_type(&self) -> &ResourceType {
        &SCHEDULE
    }

    #[instrument(skip(self, parent, token), fields(resource_type = SCHEDULE.id))]
    async fn list(
        &self,
        parent: Option<&ResourceId>,
        token: &PageToken,
    ) -> ConnectorResult<Page<Resource>> {
        let mut bag = PageBag::resume(&token.token, SCHEDULE.id)?;

        let page = self
            .client
            .list_schedules(&PageOptions::new(token.size, bag.page_token()))
            .await
            .map_err(|e| {
                error!(error = %e, "Error fetching schedules");
                ConnectorError::operation_failed_with_source("error fetching schedules", e)
            })?;

        let resources = page
            .items
            .iter()
            .map(|schedule| {
                schedule_resource(schedule, parent).map_err(|e| {
                    ConnectorError::operation_failed_with_source(
                        "error creating schedule resource",
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
        let entitlements = ScheduleRelation::ALL
            .iter()
            .map(|relation| {
                Entitlement::permission(resource, relation.slug())
                    .with_grantable_to(&USER)
                    .with_display_name(format!("Role: {relation}"))
            })
            .collect();
        Ok(Page::complete(entitlements))
    }

    /// Grants for every schedule in the fetched page, not only `resource`.
    ///
    /// Pages through schedules with its own cursor; the host upserts the
    /// grants by ID.
    #[instrument(skip(self, resource, token), fields(schedule_id = %resource.id.resource))]
    async fn grants(&self, resource: &Resource, token: &PageToken) -> ConnectorResult<Page<Grant>> {
        let mut bag = PageBag::resume(&token.token, SCHEDULE.id)?;

        let page = self
            .client
            .list_schedules(&PageOptions::new(token.size, bag.page_token()))
            .await
            .map_err(|e| {
                error!(error = %e, "Error fetching schedules");
                ConnectorError::operation_failed_with_source("error fetching schedules", e)
            })?;

        let grants: Vec<Grant> = page.items.iter().flat_map(schedule_grants).collect();
        debug!(
            schedules = page.items.len(),
            grants = grants.len(),
            "Derived schedule grants"
        );

        let next = bag.next_token(&page.after)?;
        Ok(Page::with_next(grants, next).with_annotations(page.annotations))
    }
}
