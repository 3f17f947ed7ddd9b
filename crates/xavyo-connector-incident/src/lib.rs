//! incident.io Connector for xavyo
//!
//! Maps incident.io users, on-call schedules, base roles and custom roles
//! into the xavyo resource / entitlement / grant model.
//!
//! # Features
//!
//! - Users with profile and primary email
//! - Schedules with `On_Call` and `Member` entitlements derived from current
//!   shifts and rotations
//! - Base and custom roles discovered from user records, each with an
//!   `assigned` entitlement resolved per user
//! - Cursor pagination carried in opaque page tokens
//!
//! # Example
//!
//! ```no_run
//! use xavyo_connector::prelude::*;
//! use xavyo_connector_incident::{IncidentConfig, IncidentConnector};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = IncidentConfig::from_env()?;
//! let connector = IncidentConnector::new(&config)?;
//! connector.validate().await?;
//!
//! let output = SyncRunner::new(100).run(&connector).await?;
//! println!("{} grants", output.grants.len());
//! # Ok(())
//! # }
//! ```

mod assignments;
mod client;
mod config;
mod connector;
mod models;
mod roles;
mod schedules;
mod users;

pub mod resource_types;

// Re-exports
pub use assignments::{
    schedule_assignments, schedule_grants, Assignment, ScheduleAssignments, ScheduleRelation,
    MEMBER, ON_CALL,
};
pub use client::{ApiPage, IncidentClient, PageOptions, DEFAULT_BASE_URL, DEFAULT_PAGE_SIZE};
pub use config::{ConfigError, IncidentConfig};
pub use connector::IncidentConnector;
pub use models::{
    PaginationMeta, Role, Rotation, Schedule, ScheduleConfig, Shift, ShiftUser, User,
    NOBODY_USER_ID,
};
pub use roles::{collect_base_roles, collect_custom_roles, RoleKind, RoleSyncer, ASSIGNED};
pub use schedules::{schedule_resource, ScheduleSyncer};
pub use users::{user_resource, user_role_grants, UserSyncer};
