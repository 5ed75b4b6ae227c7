//! Registration and login endpoints.
//!
//! Both endpoints answer 200 with an [`AuthResponse`] whether or not the
//! attempt succeeded; rejections set `success: false` with a message instead
//! of an HTTP error status.

use crate::api::models::auth::{AuthResponse, LoginRequest, RegisterRequest};
use crate::auth::{password, token};
use crate::db::handlers::{Repository, Users};
use crate::db::models::users::UserCreateDBRequest;
use crate::errors::{Error, Result};
use crate::AppState;
use axum::{extract::State, Json};
use sqlx::Acquire;

#[utoipa::path(
    post,
    path = "/authentication/register",
    tag = "authentication",
    summary = "Register a new account",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Registration outcome", body = AuthResponse),
        (status = 400, description = "Invalid request"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all, fields(username = %request.username))]
pub async fn register(State(state): State<AppState>, Json(request): Json<RegisterRequest>) -> Result<Json<AuthResponse>> {
    if !state.config.auth.allow_registration {
        return Ok(Json(AuthResponse::denied("Registration is disabled")));
    }

    let password_config = &state.config.auth.password;
    // Length bounds are in characters, not bytes
    let password_length = request.password.chars().count();
    if password_length < password_config.min_length {
        return Ok(Json(AuthResponse::denied(format!(
            "Password must be at least {} characters",
            password_config.min_length
        ))));
    }
    if password_length > password_config.max_length {
        return Ok(Json(AuthResponse::denied(format!(
            "Password must be no more than {} characters",
            password_config.max_length
        ))));
    }
    if request.username.trim().is_empty() || request.email.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "Username and email are required".to_string(),
        });
    }

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let mut user_repo = Users::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);

    if user_repo.username_or_email_taken(&request.username, &request.email).await? {
        return Ok(Json(AuthResponse::denied("Username or email is already taken")));
    }

    // Hash the password on a blocking thread to avoid blocking the runtime
    let password = request.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || password::hash_string(&password))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password hashing task: {e}"),
        })??;

    let create_request = UserCreateDBRequest {
        username: request.username,
        email: request.email,
        full_name: request.full_name,
        password_hash,
    };
    let user = user_repo.create(&create_request, None).await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    let token = token::issue_access_token(user.id, &user.email, &user.full_name, &state.config)?;
    Ok(Json(AuthResponse::granted(token)))
}

#[utoipa::path(
    post,
    path = "/authentication/login",
    tag = "authentication",
    summary = "Log in with username or email",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login outcome", body = AuthResponse),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> Result<Json<AuthResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut user_repo = Users::new(&mut conn);

    // Identifiers containing '@' are email addresses, anything else is a
    // username; both lookups are case-insensitive.
    let user = if request.identifier.contains('@') {
        user_repo.get_by_email(&request.identifier).await?
    } else {
        user_repo.get_by_username(&request.identifier).await?
    };

    let Some(user) = user else {
        return Ok(Json(AuthResponse::denied("Invalid username or password")));
    };

    // Verify the password on a blocking thread to avoid blocking the runtime
    let password = request.password.clone();
    let hash = user.password_hash.clone();
    let is_valid = tokio::task::spawn_blocking(move || password::verify_string(&password, &hash))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password verification task: {e}"),
        })??;

    if !is_valid {
        return Ok(Json(AuthResponse::denied("Invalid username or password")));
    }

    let token = token::issue_access_token(user.id, &user.email, &user.full_name, &state.config)?;
    Ok(Json(AuthResponse::granted(token)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{build_test_app, register_user};
    use serde_json::json;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_register_then_login(pool: PgPool) {
        let server = build_test_app(pool);

        let response = server
            .post("/authentication/register")
            .json(&json!({
                "username": "alice",
                "email": "alice@example.com",
                "full_name": "Alice Example",
                "password": "correct-horse-battery"
            }))
            .await;
        response.assert_status_ok();
        let body: AuthResponse = response.json();
        assert!(body.success);
        assert!(body.token.is_some());

        // Login by username
        let response = server
            .post("/authentication/login")
            .json(&json!({"identifier": "alice", "password": "correct-horse-battery"}))
            .await;
        response.assert_status_ok();
        let body: AuthResponse = response.json();
        assert!(body.success);

        // Login by email, case-insensitive
        let response = server
            .post("/authentication/login")
            .json(&json!({"identifier": "ALICE@example.com", "password": "correct-horse-battery"}))
            .await;
        let body: AuthResponse = response.json();
        assert!(body.success);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_register_duplicate_is_denied_not_an_error(pool: PgPool) {
        let server = build_test_app(pool);
        register_user(&server, "bob").await;

        let response = server
            .post("/authentication/register")
            .json(&json!({
                "username": "BOB",
                "email": "other@example.com",
                "full_name": "Bob Again",
                "password": "a-long-enough-password"
            }))
            .await;
        response.assert_status_ok();
        let body: AuthResponse = response.json();
        assert!(!body.success);
        assert!(body.token.is_none());
        assert!(body.message.is_some());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_register_short_password_is_denied(pool: PgPool) {
        let server = build_test_app(pool);

        let response = server
            .post("/authentication/register")
            .json(&json!({
                "username": "carol",
                "email": "carol@example.com",
                "full_name": "Carol",
                "password": "short"
            }))
            .await;
        response.assert_status_ok();
        let body: AuthResponse = response.json();
        assert!(!body.success);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_register_password_length_counts_characters_not_bytes(pool: PgPool) {
        let server = build_test_app(pool);

        // Four characters but eight bytes; must fall below the 8-character minimum
        let response = server
            .post("/authentication/register")
            .json(&json!({
                "username": "erin",
                "email": "erin@example.com",
                "full_name": "Erin",
                "password": "éééé"
            }))
            .await;
        response.assert_status_ok();
        let body: AuthResponse = response.json();
        assert!(!body.success);
        assert!(body.token.is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_login_wrong_password_is_denied(pool: PgPool) {
        let server = build_test_app(pool);
        register_user(&server, "dave").await;

        let response = server
            .post("/authentication/login")
            .json(&json!({"identifier": "dave", "password": "not-the-password"}))
            .await;
        response.assert_status_ok();
        let body: AuthResponse = response.json();
        assert!(!body.success);
        assert!(body.token.is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_login_unknown_user_is_denied(pool: PgPool) {
        let server = build_test_app(pool);

        let response = server
            .post("/authentication/login")
            .json(&json!({"identifier": "nobody", "password": "whatever-password"}))
            .await;
        response.assert_status_ok();
        let body: AuthResponse = response.json();
        assert!(!body.success);
    }
}
