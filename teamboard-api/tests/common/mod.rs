/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - In-memory stores behind the real router
/// - A stepping clock so creation order is observable
/// - User registration and token helpers
/// - Request and response helpers

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use teamboard_api::app::{build_router, AppState};
use teamboard_api::config::Config;
use teamboard_shared::auth::password::HashParams;
use teamboard_shared::clock::SteppingClock;
use teamboard_shared::workflow::Stores;
use tower::Service as _;

pub const TEST_JWT_SECRET: &str = "integration-test-secret-at-least-32-chars";

/// Password accepted by the strength rule
pub const TEST_PASSWORD: &str = "orbit2024";

/// Test context containing the router and its configuration
pub struct TestContext {
    pub app: axum::Router,
    pub config: Config,
}

impl TestContext {
    /// Creates a new test context over empty in-memory stores
    pub fn new() -> anyhow::Result<Self> {
        let config = Config::from_lookup(|key| match key {
            "JWT_SECRET" => Some(TEST_JWT_SECRET.to_string()),
            "CORS_ORIGINS" => Some("*".to_string()),
            _ => None,
        })?;

        let state = AppState::with_parts(
            Stores::in_memory(),
            config.clone(),
            Arc::new(SteppingClock::starting_now()),
            HashParams::low_cost(),
        );
        let app = build_router(state);

        Ok(TestContext { app, config })
    }

    /// Sends a request and returns the status with the parsed JSON body
    ///
    /// Empty bodies come back as `Value::Null`.
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send_request(request).await
    }

    /// Sends a prebuilt request
    pub async fn send_request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or_else(|_| {
                panic!(
                    "Expected JSON body for {}, got: {}",
                    status,
                    String::from_utf8_lossy(&body)
                )
            })
        };

        (status, json)
    }

    /// Registers a user and returns their access token
    pub async fn register(&self, username: &str, role: &str, department: &str) -> String {
        let (status, body) = self
            .send(
                "POST",
                "/auth/register",
                None,
                Some(json!({
                    "username": username,
                    "password": TEST_PASSWORD,
                    "department": department,
                    "role": role,
                })),
            )
            .await;

        assert_eq!(status, StatusCode::OK, "register {} failed: {}", username, body);
        body["accessToken"].as_str().unwrap().to_string()
    }

    /// Creates a project and returns its id
    pub async fn create_project(&self, name: &str, leader: &str, members: &[&str]) -> String {
        let (status, body) = self
            .send(
                "POST",
                "/projects",
                None,
                Some(json!({
                    "name": name,
                    "teamLeader": leader,
                    "teamMembers": members,
                })),
            )
            .await;

        assert_eq!(status, StatusCode::OK, "create project failed: {}", body);
        body["id"].as_str().unwrap().to_string()
    }
}

/// Standard fixture: admin carol, leader alice, member bob
/// and one project "Apollo" led by alice with bob on the team
pub struct Team {
    pub ctx: TestContext,
    pub carol: String,
    pub alice: String,
    pub bob: String,
    pub project_id: String,
}

impl Team {
    pub async fn new() -> Self {
        let ctx = TestContext::new().unwrap();

        let carol = ctx.register("carol", "admin", "Operations").await;
        let alice = ctx.register("alice", "teamleader", "Engineering").await;
        let bob = ctx.register("bob", "teammember", "Engineering").await;
        let project_id = ctx.create_project("Apollo", "alice", &["alice", "bob"]).await;

        Team {
            ctx,
            carol,
            alice,
            bob,
            project_id,
        }
    }

    /// Alice creates a task assigned to bob and returns its id
    pub async fn create_task(&self, name: &str) -> String {
        let (status, body) = self
            .ctx
            .send(
                "POST",
                "/tasks",
                Some(&self.alice),
                Some(json!({
                    "projectId": self.project_id,
                    "name": name,
                    "assignedMembers": ["bob"],
                })),
            )
            .await;

        assert_eq!(status, StatusCode::CREATED, "create task failed: {}", body);
        body["id"].as_str().unwrap().to_string()
    }
}
