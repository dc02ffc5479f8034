/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login, token refresh and user directory
/// - `projects`: Projects, status changes and cascade delete
/// - `tasks`: Task creation and status changes
/// - `notifications`: Project notifications

pub mod auth;
pub mod health;
pub mod notifications;
pub mod projects;
pub mod tasks;
