//! Test utilities for integration testing (available with `test-utils` feature).

use axum_test::TestServer;
use serde_json::json;
use sqlx::PgPool;

use crate::api::models::auth::AuthResponse;
use crate::api::models::projects::ProjectResponse;
use crate::api::models::tasks::TaskResponse;
use crate::api::models::users::UserLookup;
use crate::auth::token;
use crate::cache::ProjectLookupCache;
use crate::db::handlers::{Repository, Users};
use crate::db::models::users::{UserCreateDBRequest, UserDBResponse};
use crate::notifications::TaskEvents;
use crate::types::{ProjectId, UserId};
use crate::{AppState, Config, build_router};

pub const TEST_PASSWORD: &str = "a-long-enough-password";

pub fn create_test_config() -> Config {
    let mut config = Config::default();
    config.auth.token.secret = Some("test-secret-key-for-jwt".to_string());
    config
}

pub fn build_test_state(pool: PgPool) -> AppState {
    let config = create_test_config();
    AppState::builder()
        .db(pool)
        .project_lookup(ProjectLookupCache::new(config.cache.project_lookup_ttl))
        .task_events(TaskEvents::new())
        .config(config)
        .build()
}

/// Test server over the full router, backed by the given pool.
pub fn build_test_app(pool: PgPool) -> TestServer {
    let state = build_test_state(pool);
    let router = build_router(&state).expect("Failed to build router");
    TestServer::new(router).expect("Failed to create test server")
}

/// Like [`build_test_app`], but over a real HTTP transport so WebSocket
/// upgrades work.
pub fn build_test_app_http(pool: PgPool) -> TestServer {
    let state = build_test_state(pool);
    let router = build_router(&state).expect("Failed to build router");
    TestServer::builder()
        .http_transport()
        .build(router)
        .expect("Failed to create test server")
}

/// Insert a user directly through the repository, bypassing the HTTP layer.
pub async fn create_test_user(pool: &PgPool, username: &str) -> UserDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut repo = Users::new(&mut conn);
    repo.create(
        &UserCreateDBRequest {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            full_name: username.to_string(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$fakesalt$fakehash".to_string(),
        },
        None,
    )
    .await
    .expect("Failed to create test user")
}

/// Issue a valid access token for a user.
pub fn test_token(user: &UserDBResponse, config: &Config) -> String {
    token::issue_access_token(user.id, &user.email, &user.full_name, config).expect("Failed to issue test token")
}

/// Register a user through the API and return their token and id.
pub async fn register_user(server: &TestServer, username: &str) -> (String, UserId) {
    let response = server
        .post("/authentication/register")
        .json(&json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "full_name": username,
            "password": TEST_PASSWORD,
        }))
        .await;
    response.assert_status_ok();
    let body: AuthResponse = response.json();
    assert!(body.success, "registration failed: {:?}", body.message);
    let token = body.token.expect("registration should return a token");

    let response = server.get("/api/v1/users/lookup").authorization_bearer(&token).await;
    response.assert_status_ok();
    let lookups: Vec<UserLookup> = response.json();
    let user_id = lookups
        .iter()
        .find(|u| u.full_name == username)
        .expect("registered user should appear in lookup")
        .id;

    (token, user_id)
}

/// Create a project through the API.
pub async fn create_project(server: &TestServer, token: &str, owner_id: UserId, name: &str) -> ProjectResponse {
    let response = server
        .post("/api/v1/projects")
        .authorization_bearer(token)
        .json(&json!({
            "name": name,
            "description": "created in a test",
            "owner_id": owner_id,
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json()
}

/// Create a task through the API.
pub async fn create_task(server: &TestServer, token: &str, project_id: ProjectId, title: &str) -> TaskResponse {
    let response = server
        .post("/api/v1/tasks")
        .authorization_bearer(token)
        .json(&json!({
            "title": title,
            "project_id": project_id,
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json()
}
