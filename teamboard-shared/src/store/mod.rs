/// Persistence gateway for Teamboard documents
///
/// Every entity kind (users, projects, tasks, notifications) is stored as a
/// JSON document in its own collection. Components never talk to a database
/// directly; they hold a [`DocumentStore`] for each collection they own.
///
/// # Adapters
///
/// - [`memory::InMemoryStore`]: process-local store used by tests and the
///   `memory` backend
/// - [`postgres::PgDocumentStore`]: JSONB documents in PostgreSQL
///
/// # Filters
///
/// Lookups by field go through [`Filter`], which both adapters evaluate
/// against the document's serialized (camelCase) JSON form:
///
/// ```
/// use teamboard_shared::store::Filter;
/// use serde_json::json;
///
/// let by_leader = Filter::eq("teamLeader", "alice");
/// assert!(by_leader.matches(&json!({ "teamLeader": "alice" })));
///
/// let with_member = Filter::contains("teamMembers", "bob");
/// assert!(with_member.matches(&json!({ "teamMembers": ["alice", "bob"] })));
/// ```

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use uuid::Uuid;

/// Result type for gateway operations
pub type StoreResult<T> = Result<T, StoreError>;

/// A value that can be persisted in a document collection
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection name (e.g. "projects")
    const COLLECTION: &'static str;

    /// Document identifier
    fn id(&self) -> Uuid;

    /// Field that must be unique across the collection, with this document's value
    ///
    /// Adapters reject a save that would give two ids the same key with
    /// [`StoreError::Conflict`].
    fn unique_key(&self) -> Option<(&'static str, String)> {
        None
    }
}

/// Field predicate understood by every adapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// String field equals the value
    Eq {
        field: &'static str,
        value: String,
    },

    /// Array-of-strings field contains the value
    Contains {
        field: &'static str,
        value: String,
    },
}

impl Filter {
    /// Matches documents whose `field` equals `value`
    pub fn eq(field: &'static str, value: impl Into<String>) -> Self {
        Filter::Eq {
            field,
            value: value.into(),
        }
    }

    /// Matches documents whose array `field` contains `value`
    pub fn contains(field: &'static str, value: impl Into<String>) -> Self {
        Filter::Contains {
            field,
            value: value.into(),
        }
    }

    /// Field this filter inspects
    pub fn field(&self) -> &'static str {
        match self {
            Filter::Eq { field, .. } | Filter::Contains { field, .. } => *field,
        }
    }

    /// Evaluates the filter against a document's JSON form
    pub fn matches(&self, document: &JsonValue) -> bool {
        match self {
            Filter::Eq { field, value } => document
                .get(field)
                .and_then(JsonValue::as_str)
                .is_some_and(|actual| actual == value.as_str()),
            Filter::Contains { field, value } => document
                .get(field)
                .and_then(JsonValue::as_array)
                .is_some_and(|items| items.iter().any(|item| item.as_str() == Some(value.as_str()))),
        }
    }
}

/// Error type for gateway operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write
    #[error("Conflicting document: {0}")]
    Conflict(String),

    /// Document could not be encoded or decoded
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// The call did not complete within the configured timeout
    #[error("Store operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Connection-level failure (I/O, pool exhausted or closed)
    #[error("Store backend error: {0}")]
    Backend(String),

    /// The backend rejected the operation itself (bad SQL, missing table,
    /// permissions); repeating it fails the same way
    #[error("Store query failed: {0}")]
    Query(String),
}

impl StoreError {
    /// Whether retrying the same call may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Timeout(_) | StoreError::Backend(_))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Generic per-collection document store
///
/// All operations are keyed by document id or by a [`Filter`]. Bulk deletes
/// are idempotent: deleting from an empty match set succeeds with `0`.
#[async_trait]
pub trait DocumentStore<D: Document>: Send + Sync {
    /// Inserts or replaces the document with the same id
    async fn save(&self, document: &D) -> StoreResult<()>;

    /// Finds a document by id
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<D>>;

    /// Returns every document in the collection
    async fn find_all(&self) -> StoreResult<Vec<D>>;

    /// Returns documents matching the filter
    async fn find_by(&self, filter: &Filter) -> StoreResult<Vec<D>>;

    /// Deletes a document by id, returning whether it existed
    async fn delete_by_id(&self, id: Uuid) -> StoreResult<bool>;

    /// Deletes all documents matching the filter, returning how many were removed
    async fn delete_by(&self, filter: &Filter) -> StoreResult<u64>;

    /// Verifies the backend is reachable
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// Shared handle to a collection's store
pub type SharedStore<D> = Arc<dyn DocumentStore<D>>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_eq_filter() {
        let filter = Filter::eq("role", "admin");
        assert!(filter.matches(&json!({ "role": "admin" })));
        assert!(!filter.matches(&json!({ "role": "teammember" })));
        assert!(!filter.matches(&json!({ "username": "admin" })));
    }

    #[test]
    fn test_contains_filter() {
        let filter = Filter::contains("teamMembers", "bob");
        assert!(filter.matches(&json!({ "teamMembers": ["alice", "bob"] })));
        assert!(!filter.matches(&json!({ "teamMembers": ["alice"] })));
        assert!(!filter.matches(&json!({ "teamMembers": "bob" })));
    }

    #[test]
    fn test_filter_field() {
        assert_eq!(Filter::eq("projectId", "x").field(), "projectId");
        assert_eq!(Filter::contains("assignedMembers", "x").field(), "assignedMembers");
    }

    #[test]
    fn test_transient_errors() {
        assert!(StoreError::Backend("connection reset".into()).is_transient());
        assert!(StoreError::Timeout(std::time::Duration::from_secs(1)).is_transient());
        assert!(!StoreError::Conflict("username".into()).is_transient());
        assert!(!StoreError::Serialization("bad".into()).is_transient());
        assert!(!StoreError::Query("permission denied".into()).is_transient());
    }
}
