/// Identity directory
///
/// Owns the `users` collection. Resolves usernames to roles for every
/// authorization check and handles registration and credential checks.
/// Lookups go straight to the store, so a user is resolvable as soon as
/// registration returns.

use crate::auth::password::{self, HashParams};
use crate::clock::SharedClock;
use crate::error::{WorkflowError, WorkflowResult};
use crate::models::user::{NewUser, Role, User, UserProfile};
use crate::store::{Filter, SharedStore, StoreError};
use uuid::Uuid;

/// Message returned for every failed login, whatever the cause
const INVALID_CREDENTIALS: &str = "Invalid username or password";

#[derive(Clone)]
pub struct IdentityDirectory {
    users: SharedStore<User>,
    clock: SharedClock,
    hash_params: HashParams,
}

impl IdentityDirectory {
    pub fn new(users: SharedStore<User>, clock: SharedClock, hash_params: HashParams) -> Self {
        Self {
            users,
            clock,
            hash_params,
        }
    }

    /// Finds a user by username
    pub async fn find(&self, username: &str) -> WorkflowResult<Option<User>> {
        let mut matches = self
            .users
            .find_by(&Filter::eq(User::USERNAME_FIELD, username))
            .await?;

        Ok(matches.pop())
    }

    /// Resolves a username to its role
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::NotFound` for an unknown username
    pub async fn resolve_role(&self, username: &str) -> WorkflowResult<Role> {
        self.find(username)
            .await?
            .map(|user| user.role)
            .ok_or_else(|| WorkflowError::NotFound(format!("User '{}' not found", username)))
    }

    /// Registers a new user
    ///
    /// # Errors
    ///
    /// - `WorkflowError::Validation` for a blank username or weak password
    /// - `WorkflowError::Conflict` if the username is taken
    pub async fn register(&self, new_user: NewUser) -> WorkflowResult<User> {
        let username = new_user.username.trim().to_string();
        if username.is_empty() {
            return Err(WorkflowError::Validation("Username must not be empty".to_string()));
        }

        password::validate_password_strength(&new_user.password).map_err(WorkflowError::Validation)?;

        if self.find(&username).await?.is_some() {
            tracing::warn!(username = %username, "Registration rejected: username taken");
            return Err(taken(&username));
        }

        let password_hash = password::hash_password_with(&new_user.password, &self.hash_params)?;

        let user = User {
            id: Uuid::new_v4(),
            username,
            password_hash,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            gender: new_user.gender,
            email: new_user.email,
            phone: new_user.phone,
            department: new_user.department,
            role: new_user.role,
            created_at: self.clock.now(),
        };

        // Concurrent registrations can both pass the lookup; the store
        // settles it on save
        self.users.save(&user).await.map_err(|err| match err {
            StoreError::Conflict(_) => {
                tracing::warn!(username = %user.username, "Registration lost race for username");
                taken(&user.username)
            }
            other => WorkflowError::Store(other),
        })?;

        tracing::info!(user_id = %user.id, username = %user.username, role = %user.role, "User registered");

        Ok(user)
    }

    /// Checks a username/password pair
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::Authentication` for an unknown user or a wrong
    /// password, with the same message in both cases. The username is
    /// trimmed as at registration.
    pub async fn authenticate(&self, username: &str, password: &str) -> WorkflowResult<User> {
        let username = username.trim();
        let Some(user) = self.find(username).await? else {
            tracing::warn!(username = %username, "Login failed: unknown user");
            return Err(WorkflowError::Authentication(INVALID_CREDENTIALS.to_string()));
        };

        if !password::verify_password(password, &user.password_hash)? {
            tracing::warn!(username = %username, "Login failed: wrong password");
            return Err(WorkflowError::Authentication(INVALID_CREDENTIALS.to_string()));
        }

        tracing::info!(username = %username, "User logged in");

        Ok(user)
    }

    pub async fn list_users(&self) -> WorkflowResult<Vec<UserProfile>> {
        let users = self.users.find_all().await?;
        Ok(profiles(users))
    }

    pub async fn list_by_role(&self, role: Role) -> WorkflowResult<Vec<UserProfile>> {
        let users = self
            .users
            .find_by(&Filter::eq(User::ROLE_FIELD, role.as_str()))
            .await?;
        Ok(profiles(users))
    }

    pub async fn list_by_department(&self, department: &str) -> WorkflowResult<Vec<UserProfile>> {
        let users = self
            .users
            .find_by(&Filter::eq(User::DEPARTMENT_FIELD, department))
            .await?;
        Ok(profiles(users))
    }
}

fn taken(username: &str) -> WorkflowError {
    WorkflowError::Conflict(format!("Username '{}' is already taken", username))
}

/// Public profiles sorted by username
fn profiles(mut users: Vec<User>) -> Vec<UserProfile> {
    users.sort_by(|a, b| a.username.cmp(&b.username));
    users.iter().map(UserProfile::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use crate::error::ErrorKind;
    use crate::store::memory::InMemoryStore;
    use std::sync::Arc;

    fn directory() -> IdentityDirectory {
        IdentityDirectory::new(
            Arc::new(InMemoryStore::<User>::new()),
            Arc::new(SystemClock),
            HashParams::low_cost(),
        )
    }

    fn new_user(username: &str, role: Role, department: Option<&str>) -> NewUser {
        NewUser {
            username: username.to_string(),
            password: "orbit2024".to_string(),
            first_name: None,
            last_name: None,
            gender: None,
            email: None,
            phone: None,
            department: department.map(str::to_string),
            role,
        }
    }

    #[tokio::test]
    async fn test_register_and_resolve_role() {
        let directory = directory();
        let user = directory
            .register(new_user("alice", Role::TeamLeader, None))
            .await
            .unwrap();

        assert_ne!(user.password_hash, "orbit2024");
        assert!(user.password_hash.starts_with("$argon2id$"));
        assert_eq!(directory.resolve_role("alice").await.unwrap(), Role::TeamLeader);

        let err = directory.resolve_role("nobody").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let directory = directory();
        directory
            .register(new_user("alice", Role::TeamLeader, None))
            .await
            .unwrap();

        let err = directory
            .register(new_user("alice", Role::Admin, None))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_register_validation() {
        let directory = directory();

        let err = directory
            .register(new_user("   ", Role::TeamMember, None))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let mut weak = new_user("bob", Role::TeamMember, None);
        weak.password = "short".to_string();
        let err = directory.register(weak).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_authenticate() {
        let directory = directory();
        directory
            .register(new_user("bob", Role::TeamMember, None))
            .await
            .unwrap();

        assert_eq!(
            directory.authenticate("bob", "orbit2024").await.unwrap().username,
            "bob"
        );

        let wrong = directory.authenticate("bob", "wrong-pass1").await.unwrap_err();
        let unknown = directory.authenticate("eve", "orbit2024").await.unwrap_err();
        assert_eq!(wrong.kind(), ErrorKind::Authentication);
        assert_eq!(unknown.kind(), ErrorKind::Authentication);
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn test_listings() {
        let directory = directory();
        directory
            .register(new_user("carol", Role::TeamMember, Some("Design")))
            .await
            .unwrap();
        directory
            .register(new_user("alice", Role::TeamLeader, Some("Engineering")))
            .await
            .unwrap();
        directory
            .register(new_user("bob", Role::TeamMember, Some("Engineering")))
            .await
            .unwrap();

        let all: Vec<String> = directory
            .list_users()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.username)
            .collect();
        assert_eq!(all, vec!["alice", "bob", "carol"]);

        let members = directory.list_by_role(Role::TeamMember).await.unwrap();
        assert_eq!(members.len(), 2);
        assert!(members.iter().all(|p| p.role == Role::TeamMember));

        let engineering = directory.list_by_department("Engineering").await.unwrap();
        assert_eq!(engineering.len(), 2);
        assert!(directory.list_by_department("Sales").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_authenticate_trims_username() {
        let directory = directory();
        directory
            .register(new_user(" alice ", Role::TeamLeader, None))
            .await
            .unwrap();

        assert_eq!(
            directory.authenticate(" alice ", "orbit2024").await.unwrap().username,
            "alice"
        );
        assert!(directory.authenticate("alice", "orbit2024").await.is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_registrations_keep_username_unique() {
        let directory = directory();

        let attempts: Vec<_> = (0..8)
            .map(|i| {
                let directory = directory.clone();
                let role = if i % 2 == 0 { Role::Admin } else { Role::TeamMember };
                tokio::spawn(async move { directory.register(new_user("alice", role, None)).await })
            })
            .collect();

        let mut registered = 0;
        for attempt in attempts {
            match attempt.await.unwrap() {
                Ok(_) => registered += 1,
                Err(err) => assert_eq!(err.kind(), ErrorKind::Conflict),
            }
        }

        assert_eq!(registered, 1);
        assert_eq!(directory.list_users().await.unwrap().len(), 1);
    }
}
