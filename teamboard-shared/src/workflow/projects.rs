/// Project registry
///
/// Owns the `projects` collection and the project status field. Creation
/// is open to any caller. Removal is only reachable through
/// [`CascadeOrchestrator`](super::cascade::CascadeOrchestrator) so a project
/// never disappears while tasks or notifications still point at it.

use crate::clock::SharedClock;
use crate::error::{WorkflowError, WorkflowResult};
use crate::models::project::{CreateProject, Project};
use crate::store::{Filter, SharedStore};
use uuid::Uuid;

#[derive(Clone)]
pub struct ProjectRegistry {
    projects: SharedStore<Project>,
    clock: SharedClock,
}

impl ProjectRegistry {
    pub fn new(projects: SharedStore<Project>, clock: SharedClock) -> Self {
        Self { projects, clock }
    }

    /// Creates a project, defaulting an empty status to "Not Started"
    pub async fn create(&self, input: CreateProject) -> WorkflowResult<Project> {
        let project = input.into_project(self.clock.now());
        self.projects.save(&project).await?;

        tracing::info!(
            project_id = %project.id,
            team_leader = %project.team_leader,
            status = %project.status,
            "Project created"
        );

        Ok(project)
    }

    /// Looks up a project without failing when it is absent
    pub async fn find(&self, id: Uuid) -> WorkflowResult<Option<Project>> {
        Ok(self.projects.find_by_id(id).await?)
    }

    /// # Errors
    ///
    /// Returns `WorkflowError::NotFound` if the project does not exist
    pub async fn get(&self, id: Uuid) -> WorkflowResult<Project> {
        self.find(id).await?.ok_or_else(|| not_found(id))
    }

    pub async fn list_all(&self) -> WorkflowResult<Vec<Project>> {
        Ok(newest_first(self.projects.find_all().await?))
    }

    pub async fn list_by_team_leader(&self, username: &str) -> WorkflowResult<Vec<Project>> {
        let projects = self
            .projects
            .find_by(&Filter::eq(Project::TEAM_LEADER_FIELD, username))
            .await?;
        Ok(newest_first(projects))
    }

    pub async fn list_by_team_member(&self, username: &str) -> WorkflowResult<Vec<Project>> {
        let projects = self
            .projects
            .find_by(&Filter::contains(Project::TEAM_MEMBERS_FIELD, username))
            .await?;
        Ok(newest_first(projects))
    }

    /// Replaces the project's status
    ///
    /// Any non-empty value is accepted. Concurrent updates are last writer
    /// wins.
    ///
    /// # Errors
    ///
    /// - `WorkflowError::Validation` if `new_status` is empty
    /// - `WorkflowError::NotFound` if the project does not exist
    pub async fn update_status(&self, id: Uuid, new_status: &str) -> WorkflowResult<Project> {
        if new_status.is_empty() {
            return Err(WorkflowError::Validation("Status must not be empty".to_string()));
        }

        let mut project = self.get(id).await?;
        project.status = new_status.to_string();
        self.projects.save(&project).await?;

        tracing::info!(project_id = %id, status = %project.status, "Project status updated");

        Ok(project)
    }

    /// Deletes the project document, returning whether it existed
    pub(crate) async fn remove(&self, id: Uuid) -> WorkflowResult<bool> {
        Ok(self.projects.delete_by_id(id).await?)
    }
}

pub(crate) fn not_found(id: Uuid) -> WorkflowError {
    WorkflowError::NotFound(format!("Project {} not found", id))
}

fn newest_first(mut projects: Vec<Project>) -> Vec<Project> {
    projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    projects
}
