/// Project endpoints
///
/// # Endpoints
///
/// - `POST /projects` - Create project
/// - `GET /projects/admin` - List all projects
/// - `GET /projects/:id` - Get project
/// - `GET /projects/team-leader/:username` - Projects led by a user
/// - `GET /projects/team-member/:username` - Projects with a team member
/// - `PUT /projects/:id/status` - Update project status
/// - `DELETE /projects/:id` - Delete project with its tasks and notifications

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use teamboard_shared::{
    models::project::{CreateProject, Project},
    workflow::cascade::CascadeReport,
};
use uuid::Uuid;
use validator::Validate;

/// Create project request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,

    pub description: Option<String>,

    pub deadline: Option<NaiveDate>,

    #[serde(default)]
    pub deliverables: Vec<String>,

    #[validate(length(min = 1, message = "Team leader is required"))]
    pub team_leader: String,

    #[serde(default)]
    pub team_members: Vec<String>,

    /// Initial status, "Not Started" when empty or absent
    pub status: Option<String>,
}

impl From<CreateProjectRequest> for CreateProject {
    fn from(req: CreateProjectRequest) -> Self {
        CreateProject {
            name: req.name,
            description: req.description,
            deadline: req.deadline,
            deliverables: req.deliverables,
            team_leader: req.team_leader,
            team_members: req.team_members,
            status: req.status,
        }
    }
}

/// Status change request
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    /// New status; empty is rejected by the workflow
    #[serde(default)]
    pub status: String,
}

/// Create a project
///
/// ```text
/// POST /projects
/// Content-Type: application/json
///
/// {
///   "name": "Apollo",
///   "teamLeader": "alice",
///   "teamMembers": ["alice", "bob"],
///   "deadline": "2026-12-01"
/// }
/// ```
pub async fn create_project(
    State(state): State<AppState>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<Json<Project>> {
    req.validate()?;

    Ok(Json(state.workflow.projects.create(req.into()).await?))
}

/// `GET /projects/admin`
pub async fn list_projects(State(state): State<AppState>) -> ApiResult<Json<Vec<Project>>> {
    Ok(Json(state.workflow.projects.list_all().await?))
}

/// `GET /projects/:id`
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Project>> {
    Ok(Json(state.workflow.projects.get(id).await?))
}

/// `GET /projects/team-leader/:username`
pub async fn list_projects_by_team_leader(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Json<Vec<Project>>> {
    Ok(Json(
        state.workflow.projects.list_by_team_leader(&username).await?,
    ))
}

/// `GET /projects/team-member/:username`
pub async fn list_projects_by_team_member(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Json<Vec<Project>>> {
    Ok(Json(
        state.workflow.projects.list_by_team_member(&username).await?,
    ))
}

/// Update project status
///
/// ```text
/// PUT /projects/:id/status
/// Content-Type: application/json
///
/// { "status": "In Progress" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Empty status
/// - `404 Not Found`: Unknown project
pub async fn update_project_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusRequest>,
) -> ApiResult<Json<Project>> {
    Ok(Json(
        state.workflow.projects.update_status(id, &req.status).await?,
    ))
}

/// Delete a project together with its tasks and notifications
///
/// # Response
///
/// ```json
/// { "projectId": "uuid", "notificationsRemoved": 1, "tasksRemoved": 2 }
/// ```
///
/// # Errors
///
/// - `404 Not Found`: Unknown project
pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<CascadeReport>> {
    Ok(Json(state.workflow.cascade.delete_project(id).await?))
}
