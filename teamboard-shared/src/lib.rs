//! # Teamboard Shared Library
//!
//! Domain types, persistence and the collaboration workflow used by the
//! Teamboard API server.
//!
//! ## Module Organization
//!
//! - `models`: User, Project, Task and Notification documents
//! - `store`: persistence gateway with in-memory and PostgreSQL adapters
//! - `db`: PostgreSQL pool and migrations
//! - `auth`: password hashing, JWT, middleware and authorization checks
//! - `workflow`: identity, projects, tasks, notifications, cascade delete
//! - `clock`: injectable time source
//! - `error`: workflow error taxonomy

pub mod auth;
pub mod clock;
pub mod db;
pub mod error;
pub mod models;
pub mod store;
pub mod workflow;

/// Current version of the Teamboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
