/// Task workflow engine
///
/// Owns the `tasks` collection and enforces who may create a task and who
/// may move it between statuses.
///
/// # Creation checks
///
/// Evaluated in this order, failing on the first violation:
///
/// 1. the target project exists (validation error otherwise)
/// 2. the caller is the project's team leader (authorization error)
/// 3. at least one member is assigned (validation error)
/// 4. every assigned member is on the project team, reporting the first
///    offender (validation error)
///
/// Membership is only checked at creation. Later changes to the project
/// team do not touch existing tasks.
///
/// # Status updates
///
/// An empty status is rejected before the task is loaded. Only assigned
/// members may change the status, and any non-empty value is accepted.

use super::projects::ProjectRegistry;
use crate::auth::authorization::{require_assigned_member, require_caller, require_team_leader};
use crate::auth::middleware::AuthContext;
use crate::clock::SharedClock;
use crate::error::{WorkflowError, WorkflowResult};
use crate::models::status;
use crate::models::task::{CreateTask, Task};
use crate::store::{Filter, SharedStore};
use uuid::Uuid;

#[derive(Clone)]
pub struct TaskWorkflow {
    tasks: SharedStore<Task>,
    projects: ProjectRegistry,
    clock: SharedClock,
}

impl TaskWorkflow {
    pub fn new(tasks: SharedStore<Task>, projects: ProjectRegistry, clock: SharedClock) -> Self {
        Self {
            tasks,
            projects,
            clock,
        }
    }

    /// Creates a task under a project led by the caller
    pub async fn create(&self, input: CreateTask, caller: Option<&AuthContext>) -> WorkflowResult<Task> {
        let project = self.projects.find(input.project_id).await?.ok_or_else(|| {
            WorkflowError::Validation(format!("Project {} not found", input.project_id))
        })?;

        let caller = require_caller(caller).inspect_err(|_| {
            tracing::warn!(project_id = %project.id, "Anonymous task creation rejected");
        })?;
        require_team_leader(&caller.username, &project).inspect_err(|_| {
            tracing::warn!(
                project_id = %project.id,
                username = %caller.username,
                "Task creation by non-leader rejected"
            );
        })?;

        if input.assigned_members.is_empty() {
            return Err(WorkflowError::Validation(
                "A task needs at least one assigned member".to_string(),
            ));
        }

        if let Some(outsider) = input
            .assigned_members
            .iter()
            .find(|member| !project.has_member(member))
        {
            return Err(WorkflowError::Validation(format!(
                "Assigned member '{}' is not on the team of project {}",
                outsider, project.id
            )));
        }

        let task = Task {
            id: Uuid::new_v4(),
            project_id: project.id,
            name: input.name,
            description: input.description,
            assigned_members: input.assigned_members,
            status: status::NOT_STARTED.to_string(),
            created_at: self.clock.now(),
        };

        self.tasks.save(&task).await?;

        tracing::info!(
            task_id = %task.id,
            project_id = %task.project_id,
            assigned = task.assigned_members.len(),
            "Task created"
        );

        Ok(task)
    }

    /// Tasks of a project, most recent first
    pub async fn list_by_project(&self, project_id: Uuid) -> WorkflowResult<Vec<Task>> {
        let mut tasks = self
            .tasks
            .find_by(&Filter::eq(Task::PROJECT_ID_FIELD, project_id.to_string()))
            .await?;

        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    /// Changes the status of a task assigned to the caller
    ///
    /// # Errors
    ///
    /// - `WorkflowError::Validation` if `new_status` is empty
    /// - `WorkflowError::NotFound` if the task does not exist
    /// - `WorkflowError::Authorization` if the caller is absent or not assigned
    pub async fn update_status(
        &self,
        task_id: Uuid,
        new_status: &str,
        caller: Option<&AuthContext>,
    ) -> WorkflowResult<Task> {
        if new_status.is_empty() {
            return Err(WorkflowError::Validation("Status must not be empty".to_string()));
        }

        let mut task = self
            .tasks
            .find_by_id(task_id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound(format!("Task {} not found", task_id)))?;

        let caller = require_caller(caller)?;
        require_assigned_member(&caller.username, &task).inspect_err(|_| {
            tracing::warn!(
                task_id = %task_id,
                username = %caller.username,
                "Status change by unassigned user rejected"
            );
        })?;

        task.status = new_status.to_string();
        self.tasks.save(&task).await?;

        tracing::info!(task_id = %task_id, status = %task.status, username = %caller.username, "Task status updated");

        Ok(task)
    }

    /// Removes every task of a project, returning how many were deleted
    pub(crate) async fn delete_by_project(&self, project_id: Uuid) -> WorkflowResult<u64> {
        Ok(self
            .tasks
            .delete_by(&Filter::eq(Task::PROJECT_ID_FIELD, project_id.to_string()))
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SteppingClock;
    use crate::error::ErrorKind;
    use crate::models::project::{CreateProject, Project};
    use crate::models::user::Role;
    use crate::store::memory::InMemoryStore;
    use std::sync::Arc;

    struct Fixture {
        workflow: TaskWorkflow,
        project: Project,
    }

    async fn fixture() -> Fixture {
        let clock: SharedClock = Arc::new(SteppingClock::starting_now());
        let projects = ProjectRegistry::new(Arc::new(InMemoryStore::<Project>::new()), clock.clone());
        let project = projects
            .create(CreateProject {
                name: "P1".to_string(),
                team_leader: "alice".to_string(),
                team_members: vec!["alice".to_string(), "bob".to_string()],
                ..Default::default()
            })
            .await
            .unwrap();

        Fixture {
            workflow: TaskWorkflow::new(Arc::new(InMemoryStore::<Task>::new()), projects, clock),
            project,
        }
    }

    fn create_input(project_id: Uuid, members: &[&str]) -> CreateTask {
        CreateTask {
            project_id,
            name: "Draft release notes".to_string(),
            description: None,
            assigned_members: members.iter().map(|m| m.to_string()).collect(),
        }
    }

    fn caller(username: &str) -> AuthContext {
        AuthContext::new(username, Role::TeamMember)
    }

    #[tokio::test]
    async fn test_leader_creates_task() {
        let Fixture { workflow, project } = fixture().await;

        let task = workflow
            .create(create_input(project.id, &["bob"]), Some(&caller("alice")))
            .await
            .unwrap();

        assert_eq!(task.status, "Not Started");
        assert_eq!(task.project_id, project.id);
        assert_eq!(task.assigned_members, vec!["bob"]);
    }

    #[tokio::test]
    async fn test_non_leader_is_rejected() {
        let Fixture { workflow, project } = fixture().await;

        let err = workflow
            .create(create_input(project.id, &["bob"]), Some(&caller("bob")))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);

        let err = workflow
            .create(create_input(project.id, &["bob"]), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);
    }

    #[tokio::test]
    async fn test_creation_check_order() {
        let Fixture { workflow, project } = fixture().await;

        // Unknown project wins over a missing caller
        let err = workflow
            .create(create_input(Uuid::new_v4(), &[]), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("not found"));

        // Authorization wins over empty members
        let err = workflow
            .create(create_input(project.id, &[]), Some(&caller("bob")))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);

        let err = workflow
            .create(create_input(project.id, &[]), Some(&caller("alice")))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_first_outsider_is_named() {
        let Fixture { workflow, project } = fixture().await;

        let err = workflow
            .create(
                create_input(project.id, &["bob", "carol", "dave"]),
                Some(&caller("alice")),
            )
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("'carol'"));
        assert!(!err.to_string().contains("dave"));
    }

    #[tokio::test]
    async fn test_list_by_project_newest_first() {
        let Fixture { workflow, project } = fixture().await;
        let leader = caller("alice");

        let mut created = Vec::new();
        for _ in 0..3 {
            let task = workflow
                .create(create_input(project.id, &["bob"]), Some(&leader))
                .await
                .unwrap();
            created.push(task.id);
        }
        created.reverse();

        let listed: Vec<Uuid> = workflow
            .list_by_project(project.id)
            .await
            .unwrap()
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(listed, created);
        assert!(workflow.list_by_project(Uuid::new_v4()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_status() {
        let Fixture { workflow, project } = fixture().await;
        let task = workflow
            .create(create_input(project.id, &["bob"]), Some(&caller("alice")))
            .await
            .unwrap();

        let updated = workflow
            .update_status(task.id, "In Progress", Some(&caller("bob")))
            .await
            .unwrap();
        assert_eq!(updated.status, "In Progress");

        // Any non-empty status is accepted, including going backwards
        let updated = workflow
            .update_status(task.id, "Not Started", Some(&caller("bob")))
            .await
            .unwrap();
        assert_eq!(updated.status, "Not Started");
    }

    #[tokio::test]
    async fn test_update_status_failures() {
        let Fixture { workflow, project } = fixture().await;
        let task = workflow
            .create(create_input(project.id, &["bob"]), Some(&caller("alice")))
            .await
            .unwrap();

        let err = workflow
            .update_status(task.id, "", Some(&caller("bob")))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = workflow
            .update_status(Uuid::new_v4(), "Completed", Some(&caller("bob")))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        // The team leader is not assigned, so cannot change the status
        let err = workflow
            .update_status(task.id, "Completed", Some(&caller("alice")))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);

        let err = workflow
            .update_status(task.id, "Completed", None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);
    }

    #[tokio::test]
    async fn test_delete_by_project_is_idempotent() {
        let Fixture { workflow, project } = fixture().await;
        for _ in 0..2 {
            workflow
                .create(create_input(project.id, &["bob"]), Some(&caller("alice")))
                .await
                .unwrap();
        }

        assert_eq!(workflow.delete_by_project(project.id).await.unwrap(), 2);
        assert_eq!(workflow.delete_by_project(project.id).await.unwrap(), 0);
        assert!(workflow.list_by_project(project.id).await.unwrap().is_empty());
    }
}
