//! User read endpoints.

use crate::api::models::users::{UserLookup, UserResponse};
use crate::auth::AuthenticatedUser;
use crate::db::handlers::{users::UserFilter, Repository, Users};
use crate::errors::{Error, Result};
use crate::types::UserId;
use crate::AppState;
use axum::{
    extract::{Path, State},
    Json,
};

#[utoipa::path(
    get,
    path = "/users/lookup",
    tag = "users",
    summary = "List (id, full name) pairs for assignee pickers",
    responses(
        (status = 200, description = "User lookup list", body = Vec<UserLookup>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Invalid token"),
        (status = 500, description = "Internal server error")
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn lookup_users(State(state): State<AppState>, _user: AuthenticatedUser) -> Result<Json<Vec<UserLookup>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut conn);

    let users = repo.list(&UserFilter::default()).await?;
    Ok(Json(users.into_iter().map(UserLookup::from).collect()))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    summary = "Get a user by id",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User detail", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Invalid token"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = id))]
pub async fn get_user(State(state): State<AppState>, _user: AuthenticatedUser, Path(id): Path<UserId>) -> Result<Json<UserResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut conn);

    let user = repo.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "User".to_string(),
        id: id.to_string(),
    })?;

    Ok(Json(UserResponse::from(user)))
}

#[cfg(test)]
mod tests {
    use crate::api::models::users::{UserLookup, UserResponse};
    use crate::test_utils::{build_test_app, register_user};
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_users_require_authentication(pool: PgPool) {
        let server = build_test_app(pool);

        let response = server.get("/api/v1/users/lookup").await;
        response.assert_status_unauthorized();

        let response = server
            .get("/api/v1/users/lookup")
            .authorization_bearer("not.a.real.token")
            .await;
        response.assert_status_forbidden();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_lookup_and_get_user(pool: PgPool) {
        let server = build_test_app(pool);
        let (token, _) = register_user(&server, "alice").await;
        register_user(&server, "bob").await;

        let response = server.get("/api/v1/users/lookup").authorization_bearer(&token).await;
        response.assert_status_ok();
        let lookups: Vec<UserLookup> = response.json();
        assert_eq!(lookups.len(), 2);

        let alice = lookups.iter().find(|u| u.full_name.contains("alice")).unwrap();
        let response = server
            .get(&format!("/api/v1/users/{}", alice.id))
            .authorization_bearer(&token)
            .await;
        response.assert_status_ok();
        let user: UserResponse = response.json();
        assert_eq!(user.id, alice.id);
        assert_eq!(user.username, "alice");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_get_missing_user_is_404(pool: PgPool) {
        let server = build_test_app(pool);
        let (token, _) = register_user(&server, "alice").await;

        let response = server.get("/api/v1/users/99999").authorization_bearer(&token).await;
        response.assert_status_not_found();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_user_detail_never_contains_password_hash(pool: PgPool) {
        let server = build_test_app(pool);
        let (token, user_id) = register_user(&server, "alice").await;

        let response = server
            .get(&format!("/api/v1/users/{user_id}"))
            .authorization_bearer(&token)
            .await;
        let body = response.text();
        assert!(!body.contains("password"));
        assert!(!body.contains("argon2"));
    }
}
