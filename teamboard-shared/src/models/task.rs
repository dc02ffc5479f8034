/// Task model
///
/// Tasks belong to exactly one project and are assigned to one or more of
/// that project's team members. Only the team leader creates them and only
/// an assigned member changes their status (see
/// [`crate::workflow::tasks::TaskWorkflow`]).

use crate::store::Document;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stored task document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Owning project
    pub project_id: Uuid,

    pub name: String,
    pub description: Option<String>,

    /// Usernames allowed to change the status
    pub assigned_members: Vec<String>,

    /// Free-text status, "Not Started" at creation
    pub status: String,

    /// Server-assigned creation time
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub const PROJECT_ID_FIELD: &'static str = "projectId";

    /// Whether `username` is assigned to this task
    pub fn is_assigned_to(&self, username: &str) -> bool {
        self.assigned_members.iter().any(|member| member == username)
    }
}

impl Document for Task {
    const COLLECTION: &'static str = "tasks";

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Input for creating a task
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub project_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub assigned_members: Vec<String>,
}
