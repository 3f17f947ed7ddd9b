//! incident.io connector entry point.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use xavyo_connector::error::ConnectorResult;
use xavyo_connector::traits::{Connector, ConnectorMetadata, ResourceSyncer};

use crate::client::{IncidentClient, PageOptions};
use crate::config::IncidentConfig;
use crate::roles::RoleSyncer;
use crate::schedules::ScheduleSyncer;
use crate::users::UserSyncer;

/// Syncs users, schedules and roles from incident.io.
#[derive(Debug, Clone)]
pub struct IncidentConnector {
    client: Arc<IncidentClient>,
}

impl IncidentConnector {
    /// Create a connector from configuration.
    pub fn new(config: &IncidentConfig) -> ConnectorResult<Self> {
        Ok(Self::with_client(Arc::new(IncidentClient::new(config)?)))
    }

    /// Create a connector around an existing client.
    pub fn with_client(client: Arc<IncidentClient>) -> Self {
        Self { client }
    }

    /// The underlying API client.
    #[must_use]
    pub fn client(&self) -> &Arc<IncidentClient> {
        &self.client
    }
}

#[async_trait]
impl Connector for IncidentConnector {
    fn metadata(&self) -> ConnectorMetadata {
        ConnectorMetadata {
            display_name: "incident.io".to_string(),
            description: "Syncs incident.io users, on-call schedules, base roles and custom roles"
                .to_string(),
        }
    }

    /// List a single user to prove the API key works.
    #[instrument(skip(self), fields(base_url = %self.client.base_url()))]
    async fn validate(&self) -> ConnectorResult<()> {
        match self.client.list_users(&PageOptions::new(1, "")).await {
            Ok(_) => {
                info!("incident.io credentials validated");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, error_code = e.error_code(), "incident.io validation failed");
                Err(e)
            }
        }
    }

    fn resource_syncers(&self) -> Vec<Box<dyn ResourceSyncer>> {
        vec![
            Box::new(UserSyncer::new(Arc::clone(&self.client))),
            Box::new(ScheduleSyncer::new(Arc::clone(&self.client))),
            Box::new(RoleSyncer::base(Arc::clone(&self.client))),
            Box::new(RoleSyncer::custom(Arc::clone(&self.client))),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syncer_order() {
        let connector = IncidentConnector::new(&IncidentConfig::new("inc_test")).unwrap();
        let ids: Vec<&str> = connector
            .resource_syncers()
            .iter()
            .map(|s| s.resource_type().id)
            .collect();
        assert_eq!(ids, vec!["user", "schedule", "base_role", "custom_role"]);
        assert_eq!(connector.metadata().display_name, "incident.io");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = IncidentConnector::new(&IncidentConfig::new("")).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }
}
