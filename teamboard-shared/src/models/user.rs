/// User model
///
/// Users are stored in the `users` collection and identified by a unique
/// username. The stored document carries an Argon2id password hash; clients
/// only ever see a [`UserProfile`], which has no credential field.
///
/// # Roles
///
/// ```text
/// admin       may notify any project
/// teamleader  leads projects, creates tasks
/// teammember  works on assigned tasks
/// ```

use crate::store::Document;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Administrator
    Admin,

    /// Leads one or more projects
    TeamLeader,

    /// Member of project teams
    TeamMember,
}

impl Role {
    /// All roles, in display order
    pub const ALL: [Role; 3] = [Role::Admin, Role::TeamLeader, Role::TeamMember];

    /// Wire name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::TeamLeader => "teamleader",
            Role::TeamMember => "teammember",
        }
    }

    /// Whether the role carries administrator privileges
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// Stored user document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID
    pub id: Uuid,

    /// Unique login name
    pub username: String,

    /// Argon2id PHC string
    pub password_hash: String,

    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,

    /// Role used by authorization checks
    pub role: Role,

    /// When the user registered
    pub created_at: DateTime<Utc>,
}

impl User {
    pub const USERNAME_FIELD: &'static str = "username";
    pub const ROLE_FIELD: &'static str = "role";
    pub const DEPARTMENT_FIELD: &'static str = "department";

    /// Public view of the user without the password hash
    pub fn profile(&self) -> UserProfile {
        UserProfile::from(self)
    }
}

impl Document for User {
    const COLLECTION: &'static str = "users";

    fn id(&self) -> Uuid {
        self.id
    }

    fn unique_key(&self) -> Option<(&'static str, String)> {
        Some((Self::USERNAME_FIELD, self.username.clone()))
    }
}

/// Registration input
///
/// The password is plaintext here and is hashed by the identity directory
/// before anything is persisted.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    pub role: Role,
}

/// User as returned to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub role: Role,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            gender: user.gender.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            department: user.department.clone(),
            role: user.role,
        }
    }
}
