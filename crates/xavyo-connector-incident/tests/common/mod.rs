//! Common test utilities for xavyo-connector-incident integration tests.

#![allow(dead_code)]

use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::MockServer;
use xavyo_connector::rate_limit::RetryConfig;
use xavyo_connector_incident::{IncidentClient, IncidentConfig, IncidentConnector};

pub const TEST_TOKEN: &str = "inc_test_token";

/// Test data factory for an embedded role.
pub fn create_role(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": format!("{name} role"),
        "slug": name.to_lowercase()
    })
}

/// Test data factory for a user with a base role and optional custom roles.
pub fn create_user(id: &str, name: &str, base_role: Option<Value>, custom_roles: Vec<Value>) -> Value {
    json!({
        "id": id,
        "name": name,
        "email": format!("{}@example.com", name.to_lowercase()),
        "role": "responder",
        "slack_user_id": format!("S{id}"),
        "base_role": base_role,
        "custom_roles": custom_roles
    })
}

/// Test data factory for a shift or rotation user stub.
pub fn create_shift_user(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "email": format!("{}@example.com", name.to_lowercase()),
        "role": "responder"
    })
}

/// Placeholder user the API reports for unfilled shifts.
pub fn nobody() -> Value {
    json!({ "id": "NOBODY", "name": "Nobody", "email": "" })
}

/// Test data factory for a schedule.
pub fn create_schedule(id: &str, name: &str, on_call: Vec<Value>, rotations: Vec<Vec<Value>>) -> Value {
    let shifts: Vec<Value> = on_call
        .into_iter()
        .map(|user| {
            json!({
                "rotation_id": "rot-0",
                "user": user,
                "start_at": "2024-03-01T09:00:00Z",
                "end_at": "2024-03-08T09:00:00Z"
            })
        })
        .collect();
    let rotations: Vec<Value> = rotations
        .into_iter()
        .enumerate()
        .map(|(i, users)| {
            json!({
                "id": format!("rot-{i}"),
                "name": format!("Rotation {i}"),
                "layers": [{"id": "layer-1", "name": "Layer 1"}],
                "users": users
            })
        })
        .collect();
    json!({
        "id": id,
        "name": name,
        "timezone": "Europe/London",
        "current_shifts": shifts,
        "config": { "rotations": rotations }
    })
}

/// `GET /users` envelope.
pub fn users_page(users: Vec<Value>, after: Option<&str>) -> Value {
    json!({
        "users": users,
        "pagination_meta": { "page_size": 25, "after": after }
    })
}

/// `GET /schedules` envelope.
pub fn schedules_page(schedules: Vec<Value>, after: Option<&str>) -> Value {
    json!({
        "schedules": schedules,
        "pagination_meta": { "page_size": 25, "after": after }
    })
}

/// Configuration pointing at the mock server, without retry delays.
pub fn test_config(server: &MockServer) -> IncidentConfig {
    IncidentConfig::new(TEST_TOKEN)
        .with_base_url(format!("{}/v2", server.uri()))
        .with_retry(RetryConfig::new(1).with_initial_backoff(1).with_jitter(false))
}

pub fn test_client(server: &MockServer) -> Arc<IncidentClient> {
    Arc::new(IncidentClient::new(&test_config(server)).expect("client should build"))
}

pub fn test_connector(server: &MockServer) -> IncidentConnector {
    IncidentConnector::with_client(test_client(server))
}
