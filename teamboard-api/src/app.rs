/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use teamboard_api::{app::{build_router, AppState}, config::Config};
/// use teamboard_shared::workflow::Stores;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(Stores::in_memory(), config);
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use teamboard_shared::{
    auth::{middleware::authenticate, password::HashParams},
    clock::{SharedClock, SystemClock},
    workflow::{cascade::CascadeConfig, Stores, Workflow},
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Workflow components over the configured stores
    pub workflow: Workflow,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates application state with the wall clock and default hashing cost
    pub fn new(stores: Stores, config: Config) -> Self {
        Self::with_parts(stores, config, Arc::new(SystemClock), HashParams::default())
    }

    /// Creates application state with an explicit clock and hashing cost
    pub fn with_parts(
        stores: Stores,
        config: Config,
        clock: SharedClock,
        hash_params: HashParams,
    ) -> Self {
        let cascade = CascadeConfig::from(&config.cascade);

        Self {
            workflow: Workflow::new(stores, clock, hash_params, cascade),
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET  /health
/// ├── /auth/
/// │   ├── POST /register
/// │   ├── POST /login
/// │   ├── POST /refresh
/// │   ├── GET  /users
/// │   ├── GET  /users/role/:role
/// │   └── GET  /users/department/:department
/// ├── /projects/
/// │   ├── POST   /
/// │   ├── GET    /admin
/// │   ├── GET    /team-leader/:username
/// │   ├── GET    /team-member/:username
/// │   ├── GET    /:id
/// │   ├── DELETE /:id                 # cascades to tasks and notifications
/// │   └── PUT    /:id/status
/// ├── /tasks/
/// │   ├── POST /                      # caller must lead the project
/// │   ├── GET  /project/:project_id
/// │   └── PUT  /:task_id/status       # caller must be assigned
/// └── /notifications/
///     ├── POST /                      # caller must be admin or leader
///     └── GET  /project/:project_id
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Optional bearer authentication (caller context when a token is sent)
pub fn build_router(state: AppState) -> Router {
    // Import route handlers
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh))
        .route("/users", get(routes::auth::list_users))
        .route("/users/role/:role", get(routes::auth::list_users_by_role))
        .route(
            "/users/department/:department",
            get(routes::auth::list_users_by_department),
        );

    let project_routes = Router::new()
        .route("/", post(routes::projects::create_project))
        .route("/admin", get(routes::projects::list_projects))
        .route(
            "/team-leader/:username",
            get(routes::projects::list_projects_by_team_leader),
        )
        .route(
            "/team-member/:username",
            get(routes::projects::list_projects_by_team_member),
        )
        .route(
            "/:id",
            get(routes::projects::get_project).delete(routes::projects::delete_project),
        )
        .route("/:id/status", put(routes::projects::update_project_status));

    let task_routes = Router::new()
        .route("/", post(routes::tasks::create_task))
        .route("/project/:project_id", get(routes::tasks::list_project_tasks))
        .route("/:task_id/status", put(routes::tasks::update_task_status));

    let notification_routes = Router::new()
        .route("/", post(routes::notifications::create_notification))
        .route(
            "/project/:project_id",
            get(routes::notifications::list_project_notifications),
        );

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.iter().any(|origin| origin == "*") {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        // Production mode: configure allowed origins
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    // Combine all routes with middleware stack
    Router::new()
        .merge(health_routes)
        .nest("/auth", auth_routes)
        .nest("/projects", project_routes)
        .nest("/tasks", task_routes)
        .nest("/notifications", notification_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Optional JWT authentication middleware layer
///
/// Validates a bearer token when one is sent and injects the caller's
/// `AuthContext` into request extensions. Requests without an
/// `Authorization` header pass through anonymously.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    if let Some(auth_context) = authenticate(req.headers(), state.jwt_secret())? {
        tracing::debug!(
            username = %auth_context.username,
            role = %auth_context.role,
            "Authenticated request"
        );
        req.extensions_mut().insert(auth_context);
    }

    Ok(next.run(req).await)
}
