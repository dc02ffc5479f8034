/// Document models for Teamboard
///
/// - `user`: accounts, roles and public profiles
/// - `project`: projects with a team leader and members
/// - `task`: tasks assigned to project members
/// - `notification`: project announcements
/// - `status`: conventional status values
///
/// Every model implements [`crate::store::Document`] and serializes with
/// camelCase field names.

pub mod notification;
pub mod project;
pub mod task;
pub mod user;

/// Conventional status values
///
/// Statuses are free text; any non-empty string is accepted for projects
/// and tasks. These are the values the web client offers.
pub mod status {
    pub const NOT_STARTED: &str = "Not Started";
    pub const IN_PROGRESS: &str = "In Progress";
    pub const UNDER_REVIEW: &str = "Under Review";
    pub const COMPLETED: &str = "Completed";

    /// All conventional values in workflow order
    pub const KNOWN: [&str; 4] = [NOT_STARTED, IN_PROGRESS, UNDER_REVIEW, COMPLETED];
}
