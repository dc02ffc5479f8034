/// Authorization predicates
///
/// Every workflow check is one of a handful of relationships between the
/// verified caller and a project or task:
///
/// ```text
/// create task          caller == project.teamLeader
/// update task status   caller ∈ task.assignedMembers
/// create notification  caller.role == admin || caller == project.teamLeader
/// ```
///
/// The predicates are pure functions over already-loaded documents, so the
/// workflow decides the order in which lookups and checks happen.
///
/// # Example
///
/// ```
/// use teamboard_shared::auth::authorization::{require_caller, AuthzError};
///
/// assert!(matches!(require_caller(None), Err(AuthzError::Unauthenticated)));
/// ```

use uuid::Uuid;

use super::middleware::AuthContext;
use crate::models::{project::Project, task::Task, user::Role};

/// Error type for authorization checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// No caller identity was presented
    #[error("Authentication required")]
    Unauthenticated,

    /// Caller does not lead the project
    #[error("User '{username}' is not the team leader of project {project_id}")]
    NotTeamLeader { username: String, project_id: Uuid },

    /// Caller is not assigned to the task
    #[error("User '{username}' is not assigned to task {task_id}")]
    NotAssigned { username: String, task_id: Uuid },

    /// Caller is neither an admin nor the project's team leader
    #[error("User '{username}' may not notify project {project_id}")]
    NotAdminOrLeader { username: String, project_id: Uuid },
}

/// Requires a verified caller
pub fn require_caller(auth: Option<&AuthContext>) -> Result<&AuthContext, AuthzError> {
    auth.ok_or(AuthzError::Unauthenticated)
}

/// Requires `username` to be the project's team leader
pub fn require_team_leader(username: &str, project: &Project) -> Result<(), AuthzError> {
    if project.is_led_by(username) {
        return Ok(());
    }

    Err(AuthzError::NotTeamLeader {
        username: username.to_string(),
        project_id: project.id,
    })
}

/// Requires `username` to be one of the task's assigned members
pub fn require_assigned_member(username: &str, task: &Task) -> Result<(), AuthzError> {
    if task.is_assigned_to(username) {
        return Ok(());
    }

    Err(AuthzError::NotAssigned {
        username: username.to_string(),
        task_id: task.id,
    })
}

/// Requires an admin role or leadership of the project
pub fn require_admin_or_leader(
    username: &str,
    role: Role,
    project: &Project,
) -> Result<(), AuthzError> {
    if role.is_admin() || project.is_led_by(username) {
        return Ok(());
    }

    Err(AuthzError::NotAdminOrLeader {
        username: username.to_string(),
        project_id: project.id,
    })
}
