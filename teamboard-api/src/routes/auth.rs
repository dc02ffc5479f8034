/// Authentication and user directory endpoints
///
/// # Endpoints
///
/// - `POST /auth/register` - Register new user
/// - `POST /auth/login` - Login and get tokens
/// - `POST /auth/refresh` - Refresh access token
/// - `GET /auth/users` - List all users
/// - `GET /auth/users/role/:role` - List users with a role
/// - `GET /auth/users/department/:department` - List users in a department
///
/// Responses never include password hashes; users are returned as
/// profiles.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use teamboard_shared::{
    auth::{jwt, password},
    models::user::{NewUser, Role, User, UserProfile},
};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 64, message = "Username must be 1-64 characters"))]
    pub username: String,

    /// Password (will be validated for strength)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(length(max = 100, message = "First name must be at most 100 characters"))]
    pub first_name: Option<String>,

    #[validate(length(max = 100, message = "Last name must be at most 100 characters"))]
    pub last_name: Option<String>,

    pub gender: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    pub phone: Option<String>,

    #[validate(length(max = 100, message = "Department must be at most 100 characters"))]
    pub department: Option<String>,

    pub role: Role,
}

impl From<RegisterRequest> for NewUser {
    fn from(req: RegisterRequest) -> Self {
        NewUser {
            username: req.username,
            password: req.password,
            first_name: req.first_name,
            last_name: req.last_name,
            gender: req.gender,
            email: req.email,
            phone: req.phone,
            department: req.department,
            role: req.role,
        }
    }
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Register and login response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: UserProfile,

    /// Access token (24h)
    pub access_token: String,

    /// Refresh token (30d)
    pub refresh_token: String,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    /// Refresh token
    pub refresh_token: String,
}

/// Refresh token response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    /// New access token (24h)
    pub access_token: String,
}

fn issue_tokens(state: &AppState, user: &User) -> ApiResult<AuthResponse> {
    let (access_token, refresh_token) =
        jwt::issue_token_pair(&user.username, user.role, state.jwt_secret())?;

    Ok(AuthResponse {
        user: user.profile(),
        access_token,
        refresh_token,
    })
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /auth/register
/// Content-Type: application/json
///
/// {
///   "username": "alice",
///   "password": "orbit2024",
///   "firstName": "Alice",
///   "department": "Engineering",
///   "role": "teamleader"
/// }
/// ```
///
/// # Errors
///
/// - `409 Conflict`: Username already taken
/// - `422 Unprocessable Entity`: Validation failed
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate()?;

    password::validate_password_strength(&req.password).map_err(|e| {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "password".to_string(),
            message: e,
        }])
    })?;

    let user = state.workflow.identity.register(req.into()).await?;

    Ok(Json(issue_tokens(&state, &user)?))
}

/// Login endpoint
///
/// # Endpoint
///
/// ```text
/// POST /auth/login
/// Content-Type: application/json
///
/// { "username": "alice", "password": "orbit2024" }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid credentials
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let user = state
        .workflow
        .identity
        .authenticate(&req.username, &req.password)
        .await?;

    Ok(Json(issue_tokens(&state, &user)?))
}

/// Token refresh endpoint
///
/// # Endpoint
///
/// ```text
/// POST /auth/refresh
/// Content-Type: application/json
///
/// { "refreshToken": "eyJ..." }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid, expired, or non-refresh token
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let access_token = jwt::refresh_access_token(&req.refresh_token, state.jwt_secret())?;

    Ok(Json(RefreshResponse { access_token }))
}

/// `GET /auth/users`
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<UserProfile>>> {
    Ok(Json(state.workflow.identity.list_users().await?))
}

/// `GET /auth/users/role/:role`
///
/// # Errors
///
/// - `400 Bad Request`: Unknown role
pub async fn list_users_by_role(
    State(state): State<AppState>,
    Path(role): Path<String>,
) -> ApiResult<Json<Vec<UserProfile>>> {
    let role = role
        .parse::<Role>()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    Ok(Json(state.workflow.identity.list_by_role(role).await?))
}

/// `GET /auth/users/department/:department`
pub async fn list_users_by_department(
    State(state): State<AppState>,
    Path(department): Path<String>,
) -> ApiResult<Json<Vec<UserProfile>>> {
    Ok(Json(
        state.workflow.identity.list_by_department(&department).await?,
    ))
}
