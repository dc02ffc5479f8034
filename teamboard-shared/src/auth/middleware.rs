/// Bearer token authentication
///
/// Extracts the bearer token from the `Authorization` header, validates it
/// and yields the caller's [`AuthContext`]. The API server's middleware
/// layer stores that context in the request extensions.
///
/// Identity is optional on this API: a request without an `Authorization`
/// header has no caller, and the workflow decides whether the operation
/// needs one. A header that is present but malformed or carries an invalid
/// token is an error.
///
/// # Example
///
/// ```
/// use axum::http::{header, HeaderMap, HeaderValue};
/// use teamboard_shared::auth::jwt::{create_token, Claims, TokenType};
/// use teamboard_shared::auth::middleware::authenticate;
/// use teamboard_shared::models::user::Role;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "test-secret-key-at-least-32-bytes-long";
/// let token = create_token(&Claims::new("alice", Role::TeamLeader, TokenType::Access), secret)?;
///
/// let mut headers = HeaderMap::new();
/// headers.insert(header::AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", token))?);
///
/// let caller = authenticate(&headers, secret).map_err(|e| format!("{:?}", e))?;
/// assert_eq!(caller.map(|c| c.username).as_deref(), Some("alice"));
/// # Ok(())
/// # }
/// ```

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};

use super::jwt::{validate_access_token, Claims, JwtError};
use crate::models::user::Role;

/// Verified caller identity
///
/// Present once a bearer token validates. Handlers read it with
/// `Option<Extension<AuthContext>>` and pass it to the workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated username
    pub username: String,

    /// Role claimed by the token
    pub role: Role,
}

impl AuthContext {
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            role,
        }
    }

    /// Creates auth context from validated JWT claims
    pub fn from_claims(claims: Claims) -> Self {
        Self {
            username: claims.sub,
            role: claims.role,
        }
    }
}

/// Error type for bearer token authentication
#[derive(Debug)]
pub enum AuthError {
    /// Authorization header is not a bearer credential
    InvalidFormat(String),

    /// Token validation failed
    InvalidToken(String),
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
            JwtError::InvalidIssuer => AuthError::InvalidToken("Invalid issuer".to_string()),
            _ => AuthError::InvalidToken(format!("Invalid token: {}", err)),
        }
    }
}

/// Resolves the caller from request headers
///
/// Returns `Ok(None)` when no `Authorization` header is present.
///
/// # Errors
///
/// Returns `AuthError::InvalidFormat` for a non-bearer header and
/// `AuthError::InvalidToken` when the token does not validate
pub fn authenticate(headers: &HeaderMap, secret: &str) -> Result<Option<AuthContext>, AuthError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_header = value
        .to_str()
        .map_err(|_| AuthError::InvalidFormat("Authorization header is not valid text".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    let claims = validate_access_token(token.trim(), secret)?;

    Ok(Some(AuthContext::from_claims(claims)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{create_token, TokenType};
    use axum::http::HeaderValue;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_auth_context_from_claims() {
        let claims = Claims::new("alice", Role::TeamLeader, TokenType::Access);
        let context = AuthContext::from_claims(claims);

        assert_eq!(context, AuthContext::new("alice", Role::TeamLeader));
    }

    #[test]
    fn test_missing_header_is_anonymous() {
        assert_eq!(authenticate(&HeaderMap::new(), SECRET).unwrap(), None);
    }

    #[test]
    fn test_valid_bearer_token() {
        let token = create_token(&Claims::new("bob", Role::TeamMember, TokenType::Access), SECRET)
            .unwrap();

        let context = authenticate(&headers_with(&format!("Bearer {}", token)), SECRET)
            .unwrap()
            .unwrap();
        assert_eq!(context.username, "bob");
        assert_eq!(context.role, Role::TeamMember);
    }

    #[test]
    fn test_refresh_token_is_rejected() {
        let token = create_token(&Claims::new("bob", Role::TeamMember, TokenType::Refresh), SECRET)
            .unwrap();

        assert!(matches!(
            authenticate(&headers_with(&format!("Bearer {}", token)), SECRET),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_malformed_header() {
        assert!(matches!(
            authenticate(&headers_with("Basic dXNlcjpwYXNz"), SECRET),
            Err(AuthError::InvalidFormat(_))
        ));
        assert!(matches!(
            authenticate(&headers_with("Bearer not-a-jwt"), SECRET),
            Err(AuthError::InvalidToken(_))
        ));
    }
}
