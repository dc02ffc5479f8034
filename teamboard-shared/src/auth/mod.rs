/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and strength rules
/// - [`jwt`]: JWT access/refresh token generation and validation
/// - [`middleware`]: bearer token authentication and caller context
/// - [`authorization`]: caller/project/task relationship checks
///
/// # Example
///
/// ```
/// use teamboard_shared::auth::password::{hash_password_with, verify_password, HashParams};
/// use teamboard_shared::auth::jwt::{create_token, validate_token, Claims, TokenType};
/// use teamboard_shared::models::user::Role;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password_with("user_password1", &HashParams::low_cost())?;
/// assert!(verify_password("user_password1", &hash)?);
///
/// let claims = Claims::new("alice", Role::TeamMember, TokenType::Access);
/// let token = create_token(&claims, "secret-key")?;
/// assert_eq!(validate_token(&token, "secret-key")?.sub, "alice");
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
