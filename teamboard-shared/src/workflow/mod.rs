/// Collaboration workflow
///
/// Components, leaf to root:
///
/// - [`identity::IdentityDirectory`]: users, roles, credentials
/// - [`projects::ProjectRegistry`]: projects and their status
/// - [`tasks::TaskWorkflow`]: task creation and status changes
/// - [`notifications::NotificationService`]: project announcements
/// - [`cascade::CascadeOrchestrator`]: project deletion with dependents
///
/// [`Workflow`] wires them together over a set of [`Stores`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use teamboard_shared::auth::password::HashParams;
/// use teamboard_shared::clock::SystemClock;
/// use teamboard_shared::models::project::CreateProject;
/// use teamboard_shared::workflow::{cascade::CascadeConfig, Stores, Workflow};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let workflow = Workflow::new(
///     Stores::in_memory(),
///     Arc::new(SystemClock),
///     HashParams::default(),
///     CascadeConfig::default(),
/// );
///
/// let project = workflow
///     .projects
///     .create(CreateProject {
///         name: "Apollo".to_string(),
///         team_leader: "alice".to_string(),
///         team_members: vec!["alice".to_string(), "bob".to_string()],
///         ..Default::default()
///     })
///     .await?;
/// assert_eq!(project.status, "Not Started");
/// # Ok(())
/// # }
/// ```

pub mod cascade;
pub mod identity;
pub mod notifications;
pub mod projects;
pub mod tasks;

use crate::auth::password::HashParams;
use crate::clock::SharedClock;
use crate::models::{notification::Notification, project::Project, task::Task, user::User};
use crate::store::{memory::InMemoryStore, postgres::PgDocumentStore, SharedStore, StoreResult};
use cascade::{CascadeConfig, CascadeOrchestrator};
use identity::IdentityDirectory;
use notifications::NotificationService;
use projects::ProjectRegistry;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tasks::TaskWorkflow;

/// One store per entity kind
#[derive(Clone)]
pub struct Stores {
    pub users: SharedStore<User>,
    pub projects: SharedStore<Project>,
    pub tasks: SharedStore<Task>,
    pub notifications: SharedStore<Notification>,
}

impl Stores {
    /// Process-local stores
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryStore::<User>::new()),
            projects: Arc::new(InMemoryStore::<Project>::new()),
            tasks: Arc::new(InMemoryStore::<Task>::new()),
            notifications: Arc::new(InMemoryStore::<Notification>::new()),
        }
    }

    /// PostgreSQL-backed stores sharing one pool
    pub fn postgres(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            users: Arc::new(PgDocumentStore::<User>::new(pool.clone(), query_timeout)),
            projects: Arc::new(PgDocumentStore::<Project>::new(pool.clone(), query_timeout)),
            tasks: Arc::new(PgDocumentStore::<Task>::new(pool.clone(), query_timeout)),
            notifications: Arc::new(PgDocumentStore::<Notification>::new(pool, query_timeout)),
        }
    }
}

/// All workflow components over a shared set of stores
#[derive(Clone)]
pub struct Workflow {
    pub identity: IdentityDirectory,
    pub projects: ProjectRegistry,
    pub tasks: TaskWorkflow,
    pub notifications: NotificationService,
    pub cascade: CascadeOrchestrator,
    stores: Stores,
}

impl Workflow {
    pub fn new(
        stores: Stores,
        clock: SharedClock,
        hash_params: HashParams,
        cascade_config: CascadeConfig,
    ) -> Self {
        let identity = IdentityDirectory::new(stores.users.clone(), clock.clone(), hash_params);
        let projects = ProjectRegistry::new(stores.projects.clone(), clock.clone());
        let tasks = TaskWorkflow::new(stores.tasks.clone(), projects.clone(), clock.clone());
        let notifications = NotificationService::new(
            stores.notifications.clone(),
            identity.clone(),
            projects.clone(),
            clock,
        );
        let cascade = CascadeOrchestrator::new(
            projects.clone(),
            tasks.clone(),
            notifications.clone(),
            cascade_config,
        );

        Self {
            identity,
            projects,
            tasks,
            notifications,
            cascade,
            stores,
        }
    }

    /// Checks that the persistence backend is reachable
    pub async fn ping(&self) -> StoreResult<()> {
        self.stores.projects.ping().await
    }
}
