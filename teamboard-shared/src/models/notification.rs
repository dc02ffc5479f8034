/// Notification model
///
/// Announcements posted to a project by an admin or by the project's team
/// leader. The sender is always the authenticated caller, never a value
/// taken from the request body.

use crate::store::Document;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stored notification document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,

    /// Username of the sender
    pub sender: String,

    /// Target project
    pub project_id: Uuid,

    pub title: String,
    pub message: String,

    /// Server-assigned creation time
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub const PROJECT_ID_FIELD: &'static str = "projectId";
}

impl Document for Notification {
    const COLLECTION: &'static str = "notifications";

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Input for posting a notification
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotification {
    pub project_id: Uuid,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
}
