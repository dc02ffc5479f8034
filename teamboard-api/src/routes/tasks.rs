/// Task endpoints
///
/// The caller comes from the bearer token. Creation requires the caller to
/// lead the target project; status changes require the caller to be
/// assigned to the task.
///
/// # Endpoints
///
/// - `POST /tasks` - Create task (201)
/// - `GET /tasks/project/:project_id` - Tasks of a project, newest first
/// - `PUT /tasks/:task_id/status` - Update task status

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::projects::StatusRequest,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use teamboard_shared::{
    auth::middleware::AuthContext,
    models::task::{CreateTask, Task},
};
use uuid::Uuid;

/// Create task request
///
/// The project id is taken as text so an unparsable id is reported like
/// an unknown project.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub project_id: String,

    #[serde(default)]
    pub name: String,

    pub description: Option<String>,

    #[serde(default)]
    pub assigned_members: Vec<String>,
}

impl TryFrom<CreateTaskRequest> for CreateTask {
    type Error = ApiError;

    fn try_from(req: CreateTaskRequest) -> Result<Self, Self::Error> {
        let project_id = Uuid::parse_str(req.project_id.trim())
            .map_err(|_| ApiError::BadRequest(format!("Project {} not found", req.project_id)))?;

        Ok(CreateTask {
            project_id,
            name: req.name,
            description: req.description,
            assigned_members: req.assigned_members,
        })
    }
}

/// Create a task
///
/// ```text
/// POST /tasks
/// Authorization: Bearer <token of the team leader>
/// Content-Type: application/json
///
/// {
///   "projectId": "uuid",
///   "name": "Draft release notes",
///   "assignedMembers": ["bob"]
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Unknown or malformed project, no members, or a member
///   outside the team
/// - `403 Forbidden`: Caller is absent or not the team leader
pub async fn create_task(
    State(state): State<AppState>,
    auth: Option<Extension<AuthContext>>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let caller = auth.map(|Extension(ctx)| ctx);
    let task = state
        .workflow
        .tasks
        .create(CreateTask::try_from(req)?, caller.as_ref())
        .await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// `GET /tasks/project/:project_id`
///
/// A malformed id names no project and yields an empty list.
pub async fn list_project_tasks(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> ApiResult<Json<Vec<Task>>> {
    let Ok(project_id) = Uuid::parse_str(&project_id) else {
        return Ok(Json(Vec::new()));
    };

    Ok(Json(state.workflow.tasks.list_by_project(project_id).await?))
}

/// Update task status
///
/// ```text
/// PUT /tasks/:task_id/status
/// Authorization: Bearer <token of an assigned member>
/// Content-Type: application/json
///
/// { "status": "In Progress" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Empty status
/// - `403 Forbidden`: Caller is absent or not assigned
/// - `404 Not Found`: Unknown task
pub async fn update_task_status(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
    auth: Option<Extension<AuthContext>>,
    Json(req): Json<StatusRequest>,
) -> ApiResult<Json<Task>> {
    let caller = auth.map(|Extension(ctx)| ctx);
    let task = state
        .workflow
        .tasks
        .update_status(task_id, &req.status, caller.as_ref())
        .await?;

    Ok(Json(task))
}
