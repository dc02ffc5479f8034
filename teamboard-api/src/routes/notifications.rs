/// Notification endpoints
///
/// - `POST /notifications` - Post to a project (admin or team leader)
/// - `GET /notifications/project/:project_id` - Newest first

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use teamboard_shared::{
    auth::middleware::AuthContext,
    models::notification::{CreateNotification, Notification},
};
use uuid::Uuid;

/// Post a notification as the authenticated caller
///
/// ```text
/// POST /notifications
/// Authorization: Bearer <token>
/// Content-Type: application/json
///
/// { "projectId": "uuid", "title": "Kickoff", "message": "Monday 9:00" }
/// ```
///
/// # Errors
///
/// - `403 Forbidden`: Caller is absent, unknown, or neither admin nor team leader
/// - `404 Not Found`: Unknown project
pub async fn create_notification(
    State(state): State<AppState>,
    auth: Option<Extension<AuthContext>>,
    Json(req): Json<CreateNotification>,
) -> ApiResult<Json<Notification>> {
    let caller = auth.map(|Extension(ctx)| ctx);
    let notification = state
        .workflow
        .notifications
        .create(req, caller.as_ref())
        .await?;

    Ok(Json(notification))
}

/// `GET /notifications/project/:project_id`
///
/// A malformed id names no project and yields an empty list.
pub async fn list_project_notifications(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> ApiResult<Json<Vec<Notification>>> {
    let Ok(project_id) = Uuid::parse_str(&project_id) else {
        return Ok(Json(Vec::new()));
    };

    Ok(Json(
        state.workflow.notifications.list_by_project(project_id).await?,
    ))
}
