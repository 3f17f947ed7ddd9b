//! Schedule grant derivation.
//!
//! A user currently on call for a schedule holds `On_Call`. Every other user
//! appearing in one of the schedule's rotations holds `Member`, once, however
//! many rotations list them.

use std::collections::HashSet;
use std::fmt;
use tracing::{error, warn};
use xavyo_connector::grant::Grant;
use xavyo_connector::ids::ResourceId;

use crate::models::Schedule;
use crate::resource_types::{SCHEDULE, USER};

/// Entitlement slug for users on call right now.
pub const ON_CALL: &str = "On_Call";

/// Entitlement slug for rotation members not on call.
pub const MEMBER: &str = "Member";

/// How a user relates to a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScheduleRelation {
    OnCall,
    Member,
}

impl ScheduleRelation {
    /// Every relation, in the order entitlements are declared.
    pub const ALL: [ScheduleRelation; 2] = [ScheduleRelation::OnCall, ScheduleRelation::Member];

    /// Entitlement slug for this relation.
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            ScheduleRelation::OnCall => ON_CALL,
            ScheduleRelation::Member => MEMBER,
        }
    }
}

impl fmt::Display for ScheduleRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// One user's relation to a schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub user_id: String,
    pub relation: ScheduleRelation,
}

/// Result of [`schedule_assignments`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleAssignments {
    /// On-call assignments in shift order, then members in rotation order.
    pub assignments: Vec<Assignment>,
    /// Rotation entries suppressed because the user was already a member.
    pub duplicates: usize,
}

/// Work out who is on call and who is a member of `schedule`.
///
/// Users that are not grantable (`NOBODY`, missing ID or email) are skipped.
/// A user listed in several rotations is a member once; a user who is on call
/// is never also a member.
pub fn schedule_assignments(schedule: &Schedule) -> ScheduleAssignments {
    let mut result = ScheduleAssignments::default();
    let mut on_call: HashSet<&str> = HashSet::new();

    for shift in &schedule.current_shifts {
        let Some(user) = shift.user.as_ref().filter(|u| u.is_grantable()) else {
            continue;
        };
        on_call.insert(user.id.as_str());
        result.assignments.push(Assignment {
            user_id: user.id.clone(),
            relation: ScheduleRelation::OnCall,
        });
    }

    let mut members: HashSet<&str> = HashSet::new();
    let rotation_users = schedule
        .config
        .rotations
        .iter()
        .flat_map(|rotation| rotation.users.iter())
        .filter(|user| user.is_grantable());

    for user in rotation_users {
        if on_call.contains(user.id.as_str()) {
            continue;
        }
        if !members.insert(user.id.as_str()) {
            warn!(
                schedule_id = %schedule.id,
                user_id = %user.id,
                "Duplicate user detected in schedule rotations"
            );
            result.duplicates += 1;
            continue;
        }
        result.assignments.push(Assignment {
            user_id: user.id.clone(),
            relation: ScheduleRelation::Member,
        });
    }

    result
}

/// Grants on the schedule resource for every assignment of `schedule`.
///
/// A principal whose ID cannot be built drops only its own grant.
pub fn schedule_grants(schedule: &Schedule) -> Vec<Grant> {
    let subject = match ResourceId::new(&SCHEDULE, schedule.id.as_str()) {
        Ok(id) => id,
        Err(err) => {
            error!(schedule_id = %schedule.id, error = %err, "Skipping schedule with malformed ID");
            return Vec::new();
        }
    };

    schedule_assignments(schedule)
        .assignments
        .into_iter()
        .filter_map(|assignment| match ResourceId::new(&USER, assignment.user_id.as_str()) {
            Ok(principal) => Some(Grant::new(&subject, assignment.relation.slug(), principal)),
            Err(err) => {
                error!(
                    schedule_id = %schedule.id,
                    user_id = %assignment.user_id,
                    error = %err,
                    "Error creating grant"
                );
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Rotation, ScheduleConfig, Shift, ShiftUser};

    fn stub(id: &str) -> ShiftUser {
        ShiftUser {
            id: id.to_string(),
            name: id.to_uppercase(),
            email: format!("{id}@x.io"),
        }
    }

    fn shift(user: ShiftUser) -> Shift {
        Shift {
            rotation_id: "rot1".to_string(),
            user: Some(user),
            start_at: None,
            end_at: None,
        }
    }

    fn schedule(on_call: Vec<ShiftUser>, rotations: Vec<Vec<ShiftUser>>) -> Schedule {
        Schedule {
            id: "S".to_string(),
            name: "Primary".to_string(),
            current_shifts: on_call.into_iter().map(shift).collect(),
            config: ScheduleConfig {
                rotations: rotations
                    .into_iter()
                    .enumerate()
                    .map(|(i, users)| Rotation {
                        id: format!("rot{i}"),
                        name: format!("Rotation {i}"),
                        users,
                    })
                    .collect(),
            },
        }
    }

    fn pairs(result: &ScheduleAssignments) -> Vec<(&str, ScheduleRelation)> {
        result
            .assignments
            .iter()
            .map(|a| (a.user_id.as_str(), a.relation))
            .collect()
    }

    #[test]
    fn test_on_call_and_members() {
        let s = schedule(
            vec![stub("u1")],
            vec![vec![stub("u1"), stub("u2")], vec![stub("u2"), stub("u3")]],
        );
        let result = schedule_assignments(&s);
        assert_eq!(
            pairs(&result),
            vec![
                ("u1", ScheduleRelation::OnCall),
                ("u2", ScheduleRelation::Member),
                ("u3", ScheduleRelation::Member),
            ]
        );
        assert_eq!(result.duplicates, 1);
    }

    #[test]
    fn test_nobody_and_missing_fields_filtered() {
        let mut no_email = stub("u4");
        no_email.email.clear();
        let s = schedule(
            vec![stub("NOBODY"), stub("")],
            vec![vec![stub("NOBODY"), no_email, stub("u5")]],
        );
        let result = schedule_assignments(&s);
        assert_eq!(pairs(&result), vec![("u5", ScheduleRelation::Member)]);
        assert_eq!(result.duplicates, 0);
    }

    #[test]
    fn test_shift_without_user_skipped() {
        let mut s = schedule(vec![], vec![]);
        s.current_shifts.push(Shift::default());
        assert!(schedule_assignments(&s).assignments.is_empty());
    }

    #[test]
    fn test_on_call_user_never_member() {
        let s = schedule(vec![stub("u1")], vec![vec![stub("u1")], vec![stub("u1")]]);
        let result = schedule_assignments(&s);
        assert_eq!(pairs(&result), vec![("u1", ScheduleRelation::OnCall)]);
        assert_eq!(result.duplicates, 0);
    }

    #[test]
    fn test_schedule_grants() {
        let s = schedule(vec![stub("u1")], vec![vec![stub("u1"), stub("u2")]]);
        let grants = schedule_grants(&s);
        let ids: Vec<&str> = grants.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["schedule:S:On_Call:user:u1", "schedule:S:Member:user:u2"]
        );
        assert!(grants.iter().all(|g| g.annotations.is_empty()));
    }

    #[test]
    fn test_malformed_principal_drops_only_its_grant() {
        let bad = ShiftUser {
            id: "bad\u{7}id".to_string(),
            name: String::new(),
            email: "bad@x.io".to_string(),
        };
        let s = schedule(vec![], vec![vec![bad, stub("u2")]]);
        let grants = schedule_grants(&s);
        assert_eq!(grants.len(), 1);
        assert_eq!(grants[0].principal.resource, "u2");
    }

    #[test]
    fn test_relation_slugs() {
        assert_eq!(ScheduleRelation::OnCall.to_string(), "On_Call");
        assert_eq!(ScheduleRelation::Member.slug(), "Member");
    }
}
