//! incident.io API payloads.
//!
//! Fields missing or `null` in a response decode to their defaults so a
//! sparse payload never fails a whole page.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Sentinel user ID the API reports for unfilled shifts.
pub const NOBODY_USER_ID: &str = "NOBODY";

/// A user, with the roles embedded in it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct User {
    #[serde(default, deserialize_with = "null_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub email: String,
    #[serde(default)]
    pub base_role: Option<Role>,
    #[serde(default, deserialize_with = "null_default")]
    pub custom_roles: Vec<Role>,
}

/// A base or custom role. Only ever seen embedded in a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Role {
    #[serde(default, deserialize_with = "null_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_default")]
    pub slug: String,
}

/// An on-call schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Schedule {
    #[serde(default, deserialize_with = "null_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub current_shifts: Vec<Shift>,
    #[serde(default, deserialize_with = "null_default")]
    pub config: ScheduleConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default, deserialize_with = "null_default")]
    pub rotations: Vec<Rotation>,
}

/// A rotation: the ordered list of users who take turns on a schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Rotation {
    #[serde(default, deserialize_with = "null_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub users: Vec<ShiftUser>,
}

/// A shift currently in progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Shift {
    #[serde(default, deserialize_with = "null_default")]
    pub rotation_id: String,
    #[serde(default)]
    pub user: Option<ShiftUser>,
    #[serde(default)]
    pub start_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_at: Option<DateTime<Utc>>,
}

/// User stub embedded in shifts and rotations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ShiftUser {
    #[serde(default, deserialize_with = "null_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub email: String,
}

impl ShiftUser {
    /// Whether this user can be the principal of a grant.
    ///
    /// Unfilled slots (`NOBODY`), and users without an ID or email, cannot.
    #[must_use]
    pub fn is_grantable(&self) -> bool {
        !self.id.is_empty() && !self.email.is_empty() && self.id != NOBODY_USER_ID
    }
}

/// Cursor block returned with every list response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PaginationMeta {
    #[serde(default)]
    pub page_size: Option<u32>,
    #[serde(default)]
    pub after: Option<String>,
}

impl PaginationMeta {
    /// Continuation cursor, empty when there are no more pages.
    #[must_use]
    pub fn after(&self) -> &str {
        self.after.as_deref().unwrap_or("")
    }
}

/// `GET /users` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UsersResponse {
    #[serde(default, deserialize_with = "null_default")]
    pub users: Vec<User>,
    #[serde(default, deserialize_with = "null_default")]
    pub pagination_meta: PaginationMeta,
}

/// `GET /schedules` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchedulesResponse {
    #[serde(default, deserialize_with = "null_default")]
    pub schedules: Vec<Schedule>,
    #[serde(default, deserialize_with = "null_default")]
    pub pagination_meta: PaginationMeta,
}

/// `GET /users/{id}` response.
#[derive(Debug, Clone, Deserialize)]
pub struct SingleUserResponse {
    pub user: User,
}

/// Decode `null` as the type's default.
fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_decode_user_with_roles() {
        let json = r#"{
            "id": "01JPWQNM50YGKQYFJYW61BBPD7",
            "name": "Alice",
            "email": "alice@example.com",
            "role": "owner",
            "base_role": {"id": "r1", "name": "Owner", "description": "Full access", "slug": "owner"},
            "custom_roles": [{"id": "c1", "name": "Ops", "description": "", "slug": "ops"}]
        }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.name, "Alice");
        assert_eq!(user.base_role.unwrap().slug, "owner");
        assert_eq!(user.custom_roles.len(), 1);
    }

    #[test]
    fn test_decode_sparse_user() {
        let user: User =
            serde_json::from_str(r#"{"id": "u1", "email": null, "custom_roles": null}"#).unwrap();
        assert_eq!(user.email, "");
        assert!(user.base_role.is_none());
        assert!(user.custom_roles.is_empty());
    }

    #[test]
    fn test_null_ids_decode_empty() {
        let page: UsersResponse =
            serde_json::from_str(r#"{"users": [{"id": null, "name": "Ghost"}, {"id": "u2"}]}"#)
                .unwrap();
        assert_eq!(page.users[0].id, "");
        assert_eq!(page.users[1].id, "u2");

        let schedule: Schedule = serde_json::from_str(r#"{"id": null, "name": "Orphan"}"#).unwrap();
        assert_eq!(schedule.id, "");
    }

    #[test]
    fn test_decode_schedule() {
        let json = r#"{
            "id": "s1",
            "name": "Primary",
            "current_shifts": [{
                "rotation_id": "rot1",
                "user": {"id": "u1", "name": "Alice", "email": "a@x.io"},
                "start_at": "2024-03-01T09:00:00Z",
                "end_at": "2024-03-08T09:00:00Z"
            }],
            "config": {"rotations": [{"id": "rot1", "name": "Weekly", "users": [
                {"id": "u1", "name": "Alice", "email": "a@x.io"},
                {"id": "u2", "name": "Bob", "email": "b@x.io"}
            ]}]}
        }"#;
        let schedule: Schedule = serde_json::from_str(json).unwrap();
        assert_eq!(schedule.current_shifts.len(), 1);
        assert_eq!(
            schedule.current_shifts[0].start_at,
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap())
        );
        assert_eq!(schedule.config.rotations[0].users.len(), 2);
    }

    #[test]
    fn test_decode_schedule_without_config() {
        let schedule: Schedule =
            serde_json::from_str(r#"{"id": "s1", "name": "Empty", "config": null}"#).unwrap();
        assert!(schedule.config.rotations.is_empty());
        assert!(schedule.current_shifts.is_empty());
    }

    #[test]
    fn test_shift_user_is_grantable() {
        let user = |id: &str, email: &str| ShiftUser {
            id: id.to_string(),
            name: String::new(),
            email: email.to_string(),
        };
        assert!(user("u1", "a@x.io").is_grantable());
        assert!(!user("NOBODY", "a@x.io").is_grantable());
        assert!(!user("", "a@x.io").is_grantable());
        assert!(!user("u1", "").is_grantable());
    }

    #[test]
    fn test_pagination_meta_after() {
        let page: UsersResponse =
            serde_json::from_str(r#"{"users": [], "pagination_meta": {"page_size": 25, "after": null}}"#)
                .unwrap();
        assert_eq!(page.pagination_meta.after(), "");
        assert_eq!(page.pagination_meta.page_size, Some(25));

        let page: UsersResponse =
            serde_json::from_str(r#"{"users": [], "pagination_meta": {"after": "u9"}}"#).unwrap();
        assert_eq!(page.pagination_meta.after(), "u9");
    }
}
