//! Resource types exposed by the connector.

use xavyo_connector::types::{ResourceTrait, ResourceType};

pub const USER: ResourceType = ResourceType {
    id: "user",
    display_name: "User",
    traits: &[ResourceTrait::User],
    description: "incident.io user",
};

pub const SCHEDULE: ResourceType = ResourceType {
    id: "schedule",
    display_name: "Schedule",
    traits: &[ResourceTrait::Group],
    description: "On-call schedule; users are on call now or members of a rotation",
};

pub const BASE_ROLE: ResourceType = ResourceType {
    id: "base_role",
    display_name: "Base Role",
    traits: &[ResourceTrait::Group],
    description: "",
};

pub const CUSTOM_ROLE: ResourceType = ResourceType {
    id: "custom_role",
    display_name: "Custom Role",
    traits: &[ResourceTrait::Group],
    description: "",
};
