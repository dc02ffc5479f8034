/// Cascade delete of a project
///
/// The store offers no cross-collection transactions, so removal runs as
/// three idempotent steps:
///
/// ```text
/// 1. delete notifications where projectId = id
/// 2. delete tasks         where projectId = id
/// 3. delete project       id
/// ```
///
/// Dependents go first, so a crash part-way leaves at worst a project with
/// fewer children, never a child without its project. Each step is retried
/// on transient store failures with exponential backoff. Because every step
/// is idempotent, calling [`CascadeOrchestrator::delete_project`] again after
/// a failure finishes the job.

use super::notifications::NotificationService;
use super::projects::{self, ProjectRegistry};
use super::tasks::TaskWorkflow;
use crate::error::WorkflowResult;
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use uuid::Uuid;

/// Retry behavior for cascade steps
#[derive(Debug, Clone)]
pub struct CascadeConfig {
    /// Maximum number of retry attempts per step
    pub max_retries: u32,

    /// Base delay between retries in milliseconds
    pub base_retry_delay_ms: u64,

    /// Maximum delay between retries in milliseconds
    pub max_retry_delay_ms: u64,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_retry_delay_ms: 50,
            max_retry_delay_ms: 1000,
        }
    }
}

impl CascadeConfig {
    /// Backoff before retry number `attempt` (1-based)
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
        let delay_ms = std::cmp::min(
            self.base_retry_delay_ms.saturating_mul(factor),
            self.max_retry_delay_ms,
        );
        Duration::from_millis(delay_ms)
    }
}

/// Outcome of a completed cascade delete
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeReport {
    pub project_id: Uuid,
    pub notifications_removed: u64,
    pub tasks_removed: u64,
}

#[derive(Clone)]
pub struct CascadeOrchestrator {
    projects: ProjectRegistry,
    tasks: TaskWorkflow,
    notifications: NotificationService,
    config: CascadeConfig,
}

impl CascadeOrchestrator {
    pub fn new(
        projects: ProjectRegistry,
        tasks: TaskWorkflow,
        notifications: NotificationService,
        config: CascadeConfig,
    ) -> Self {
        Self {
            projects,
            tasks,
            notifications,
            config,
        }
    }

    /// Deletes a project together with its tasks and notifications
    ///
    /// # Errors
    ///
    /// - `WorkflowError::NotFound` if the project does not exist, checked
    ///   before anything is deleted
    /// - `WorkflowError::Store` if a step still fails after all retries
    pub async fn delete_project(&self, project_id: Uuid) -> WorkflowResult<CascadeReport> {
        let exists = self
            .with_retry("lookup", project_id, || self.projects.find(project_id))
            .await?
            .is_some();
        if !exists {
            return Err(projects::not_found(project_id));
        }

        let notifications_removed = self
            .with_retry("notifications", project_id, || {
                self.notifications.delete_by_project(project_id)
            })
            .await?;

        let tasks_removed = self
            .with_retry("tasks", project_id, || self.tasks.delete_by_project(project_id))
            .await?;

        self.with_retry("project", project_id, || self.projects.remove(project_id))
            .await?;

        tracing::info!(
            project_id = %project_id,
            notifications_removed,
            tasks_removed,
            "Project deleted"
        );

        Ok(CascadeReport {
            project_id,
            notifications_removed,
            tasks_removed,
        })
    }

    async fn with_retry<T, F, Fut>(&self, step: &'static str, project_id: Uuid, mut op: F) -> WorkflowResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = WorkflowResult<T>>,
    {
        let mut attempt = 0;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < self.config.max_retries => {
                    attempt += 1;
                    let delay = self.config.retry_delay(attempt);

                    tracing::warn!(
                        project_id = %project_id,
                        step = step,
                        attempt = attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Cascade step failed, retrying..."
                    );

                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    tracing::error!(
                        project_id = %project_id,
                        step = step,
                        attempts = attempt + 1,
                        error = %err,
                        "Cascade step failed"
                    );
                    return Err(err);
                }
            }
        }
    }
}
