/// Project model
///
/// A project has one team leader and a list of team members, all referenced
/// by username. Its status is free text; [`status`](super::status) lists the
/// values clients conventionally use.

use super::status;
use crate::store::Document;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stored project document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique project ID
    pub id: Uuid,

    pub name: String,
    pub description: Option<String>,
    pub deadline: Option<NaiveDate>,
    pub deliverables: Vec<String>,

    /// Username of the team leader
    pub team_leader: String,

    /// Usernames of the team members
    pub team_members: Vec<String>,

    /// Free-text status, never empty
    pub status: String,

    pub created_at: DateTime<Utc>,
}

impl Project {
    pub const TEAM_LEADER_FIELD: &'static str = "teamLeader";
    pub const TEAM_MEMBERS_FIELD: &'static str = "teamMembers";

    /// Whether `username` leads this project
    pub fn is_led_by(&self, username: &str) -> bool {
        self.team_leader == username
    }

    /// Whether `username` is on the team
    pub fn has_member(&self, username: &str) -> bool {
        self.team_members.iter().any(|member| member == username)
    }
}

impl Document for Project {
    const COLLECTION: &'static str = "projects";

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Input for creating a project
#[derive(Debug, Clone, Default)]
pub struct CreateProject {
    pub name: String,
    pub description: Option<String>,
    pub deadline: Option<NaiveDate>,
    pub deliverables: Vec<String>,
    pub team_leader: String,
    pub team_members: Vec<String>,

    /// Initial status; empty or absent means "Not Started"
    pub status: Option<String>,
}

impl CreateProject {
    /// Builds the stored document with a fresh id
    pub fn into_project(self, created_at: DateTime<Utc>) -> Project {
        let status = self
            .status
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| status::NOT_STARTED.to_string());

        Project {
            id: Uuid::new_v4(),
            name: self.name,
            description: self.description,
            deadline: self.deadline,
            deliverables: self.deliverables,
            team_leader: self.team_leader,
            team_members: self.team_members,
            status,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(status: Option<&str>) -> CreateProject {
        CreateProject {
            name: "Apollo".to_string(),
            team_leader: "alice".to_string(),
            team_members: vec!["alice".to_string(), "bob".to_string()],
            status: status.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_absent_or_empty_status_defaults() {
        assert_eq!(input(None).into_project(Utc::now()).status, "Not Started");
        assert_eq!(input(Some("")).into_project(Utc::now()).status, "Not Started");
    }

    #[test]
    fn test_explicit_status_is_kept() {
        assert_eq!(
            input(Some("In Progress")).into_project(Utc::now()).status,
            "In Progress"
        );
    }

    #[test]
    fn test_membership_helpers() {
        let project = input(None).into_project(Utc::now());
        assert!(project.is_led_by("alice"));
        assert!(!project.is_led_by("bob"));
        assert!(project.has_member("bob"));
        assert!(!project.has_member("carol"));
    }

    #[test]
    fn test_camel_case_fields() {
        let json = serde_json::to_value(input(None).into_project(Utc::now())).unwrap();
        assert_eq!(json[Project::TEAM_LEADER_FIELD], "alice");
        assert!(json[Project::TEAM_MEMBERS_FIELD].is_array());
    }
}
