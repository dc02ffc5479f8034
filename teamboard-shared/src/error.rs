/// Workflow error taxonomy
///
/// Every workflow operation returns [`WorkflowResult`]. Errors are raised
/// where they are detected and never retried, except for transient store
/// failures inside the cascade delete.
///
/// ```
/// use teamboard_shared::error::{ErrorKind, WorkflowError};
///
/// let err = WorkflowError::NotFound("Project not found".to_string());
/// assert_eq!(err.kind(), ErrorKind::NotFound);
/// assert_eq!(err.kind().as_str(), "not_found");
/// ```

use crate::auth::{authorization::AuthzError, jwt::JwtError, password::PasswordError};
use crate::store::StoreError;

/// Result type for workflow operations
pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Error raised by the identity, project, task and notification workflows
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// Malformed or missing input
    #[error("{0}")]
    Validation(String),

    /// Credentials did not match
    #[error("{0}")]
    Authentication(String),

    /// Caller lacks the required role or relationship
    #[error("{0}")]
    Authorization(String),

    /// Referenced entity does not exist
    #[error("{0}")]
    NotFound(String),

    /// Uniqueness violation detected by the workflow
    #[error("{0}")]
    Conflict(String),

    /// Persistence gateway failure
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Jwt(#[from] JwtError),
}

/// Machine-checkable error category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Authentication,
    Authorization,
    NotFound,
    Conflict,
    Store,
    Credential,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Authentication => "authentication",
            ErrorKind::Authorization => "authorization",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Store => "store",
            ErrorKind::Credential => "credential",
        }
    }
}

impl WorkflowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WorkflowError::Validation(_) => ErrorKind::Validation,
            WorkflowError::Authentication(_) => ErrorKind::Authentication,
            WorkflowError::Authorization(_) => ErrorKind::Authorization,
            WorkflowError::NotFound(_) => ErrorKind::NotFound,
            WorkflowError::Conflict(_) | WorkflowError::Store(StoreError::Conflict(_)) => {
                ErrorKind::Conflict
            }
            WorkflowError::Store(_) => ErrorKind::Store,
            WorkflowError::Password(_) | WorkflowError::Jwt(_) => ErrorKind::Credential,
        }
    }

    /// Whether the underlying store failure may succeed on retry
    pub fn is_transient(&self) -> bool {
        matches!(self, WorkflowError::Store(err) if err.is_transient())
    }
}

impl From<AuthzError> for WorkflowError {
    fn from(err: AuthzError) -> Self {
        WorkflowError::Authorization(err.to_string())
    }
}
