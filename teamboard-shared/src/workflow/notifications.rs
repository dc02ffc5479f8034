/// Notification service
///
/// Owns the `notifications` collection. Admins may notify any project; team
/// leaders may notify the projects they lead. The sender is always the
/// verified caller.

use super::identity::IdentityDirectory;
use super::projects::{self, ProjectRegistry};
use crate::auth::authorization::{require_admin_or_leader, require_caller};
use crate::auth::middleware::AuthContext;
use crate::clock::SharedClock;
use crate::error::{WorkflowError, WorkflowResult};
use crate::models::notification::{CreateNotification, Notification};
use crate::store::{Filter, SharedStore};
use uuid::Uuid;

#[derive(Clone)]
pub struct NotificationService {
    notifications: SharedStore<Notification>,
    identity: IdentityDirectory,
    projects: ProjectRegistry,
    clock: SharedClock,
}

impl NotificationService {
    pub fn new(
        notifications: SharedStore<Notification>,
        identity: IdentityDirectory,
        projects: ProjectRegistry,
        clock: SharedClock,
    ) -> Self {
        Self {
            notifications,
            identity,
            projects,
            clock,
        }
    }

    /// Posts a notification to a project
    ///
    /// # Errors
    ///
    /// - `WorkflowError::Authorization` if the caller is absent, unknown to
    ///   the directory, or neither an admin nor the project's team leader
    /// - `WorkflowError::NotFound` if the project does not exist
    pub async fn create(
        &self,
        input: CreateNotification,
        caller: Option<&AuthContext>,
    ) -> WorkflowResult<Notification> {
        let sender = require_caller(caller)?.username.clone();

        // The stored role is authoritative over the one in the token
        let role = match self.identity.resolve_role(&sender).await {
            Ok(role) => role,
            Err(WorkflowError::NotFound(_)) => {
                tracing::warn!(sender = %sender, "Notification from unknown user rejected");
                return Err(WorkflowError::Authorization(format!(
                    "User '{}' is not registered",
                    sender
                )));
            }
            Err(err) => return Err(err),
        };

        let project = self
            .projects
            .find(input.project_id)
            .await?
            .ok_or_else(|| projects::not_found(input.project_id))?;

        require_admin_or_leader(&sender, role, &project).inspect_err(|_| {
            tracing::warn!(
                sender = %sender,
                role = %role,
                project_id = %project.id,
                "Notification rejected"
            );
        })?;

        let notification = Notification {
            id: Uuid::new_v4(),
            sender,
            project_id: project.id,
            title: input.title,
            message: input.message,
            created_at: self.clock.now(),
        };

        self.notifications.save(&notification).await?;

        tracing::info!(
            notification_id = %notification.id,
            project_id = %notification.project_id,
            sender = %notification.sender,
            "Notification created"
        );

        Ok(notification)
    }

    /// Notifications of a project, most recent first
    pub async fn list_by_project(&self, project_id: Uuid) -> WorkflowResult<Vec<Notification>> {
        let mut notifications = self
            .notifications
            .find_by(&Filter::eq(
                Notification::PROJECT_ID_FIELD,
                project_id.to_string(),
            ))
            .await?;

        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notifications)
    }

    /// Removes every notification of a project, returning how many were deleted
    pub(crate) async fn delete_by_project(&self, project_id: Uuid) -> WorkflowResult<u64> {
        Ok(self
            .notifications
            .delete_by(&Filter::eq(
                Notification::PROJECT_ID_FIELD,
                project_id.to_string(),
            ))
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::HashParams;
    use crate::clock::SteppingClock;
    use crate::error::ErrorKind;
    use crate::models::project::{CreateProject, Project};
    use crate::models::user::{NewUser, Role, User};
    use crate::store::memory::InMemoryStore;
    use std::sync::Arc;

    struct Fixture {
        service: NotificationService,
        project: Project,
    }

    async fn fixture() -> Fixture {
        let clock: SharedClock = Arc::new(SteppingClock::starting_now());
        let identity = IdentityDirectory::new(
            Arc::new(InMemoryStore::<User>::new()),
            clock.clone(),
            HashParams::low_cost(),
        );
        for (username, role) in [
            ("root", Role::Admin),
            ("alice", Role::TeamLeader),
            ("carol", Role::TeamLeader),
            ("bob", Role::TeamMember),
        ] {
            identity
                .register(NewUser {
                    username: username.to_string(),
                    password: "orbit2024".to_string(),
                    first_name: None,
                    last_name: None,
                    gender: None,
                    email: None,
                    phone: None,
                    department: None,
                    role,
                })
                .await
                .unwrap();
        }

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
            service: NotificationService::new(
                Arc::new(InMemoryStore::<Notification>::new()),
                identity,
                projects,
                clock,
            ),
            project,
        }
    }

    fn input(project_id: Uuid, title: &str) -> CreateNotification {
        CreateNotification {
            project_id,
            title: title.to_string(),
            message: "Stand-up moved to 10:00".to_string(),
        }
    }

    fn caller(username: &str, role: Role) -> AuthContext {
        AuthContext::new(username, role)
    }

    #[tokio::test]
    async fn test_admin_and_leader_may_notify() {
        let Fixture { service, project } = fixture().await;

        let from_admin = service
            .create(input(project.id, "Admin"), Some(&caller("root", Role::Admin)))
            .await
            .unwrap();
        assert_eq!(from_admin.sender, "root");

        let from_leader = service
            .create(input(project.id, "Leader"), Some(&caller("alice", Role::TeamLeader)))
            .await
            .unwrap();
        assert_eq!(from_leader.sender, "alice");
        assert_eq!(from_leader.project_id, project.id);
    }

    #[tokio::test]
    async fn test_others_are_rejected() {
        let Fixture { service, project } = fixture().await;

        for who in [
            Some(caller("bob", Role::TeamMember)),
            Some(caller("carol", Role::TeamLeader)),
            // Token role is ignored in favour of the stored role
            Some(caller("bob", Role::Admin)),
            Some(caller("mallory", Role::Admin)),
            None,
        ] {
            let err = service
                .create(input(project.id, "Nope"), who.as_ref())
                .await
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Authorization);
        }

        assert!(service.list_by_project(project.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_project() {
        let Fixture { service, .. } = fixture().await;

        let err = service
            .create(input(Uuid::new_v4(), "Lost"), Some(&caller("root", Role::Admin)))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_list_newest_first_and_delete() {
        let Fixture { service, project } = fixture().await;
        let admin = caller("root", Role::Admin);

        for title in ["first", "second", "third"] {
            service.create(input(project.id, title), Some(&admin)).await.unwrap();
        }

        let titles: Vec<String> = service
            .list_by_project(project.id)
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.title)
            .collect();
        assert_eq!(titles, vec!["third", "second", "first"]);

        assert_eq!(service.delete_by_project(project.id).await.unwrap(), 3);
        assert_eq!(service.delete_by_project(project.id).await.unwrap(), 0);
    }
}
