//! Project endpoints.
//!
//! Reads are public; writes require a bearer token and update/delete are
//! owner-only. Every write invalidates the lookup cache before responding.

use crate::api::models::projects::{
    ListProjectsQuery, ProjectCreate, ProjectDetailResponse, ProjectLookup, ProjectResponse, ProjectStatistics, ProjectUpdate,
};
use crate::api::models::tasks::TaskResponse;
use crate::api::models::users::UserLookup;
use crate::auth::AuthenticatedUser;
use crate::db::handlers::{projects::ProjectFilter, tasks::TaskFilter, Projects, Repository, Tasks, Users};
use crate::db::models::projects::{ProjectCreateDBRequest, ProjectDBResponse, ProjectUpdateDBRequest};
use crate::errors::{Error, Result};
use crate::types::{Operation, ProjectId};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use sqlx::Acquire;

#[utoipa::path(
    get,
    path = "/projects",
    tag = "projects",
    summary = "List projects",
    params(ListProjectsQuery),
    responses(
        (status = 200, description = "List of projects", body = Vec<ProjectResponse>),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_projects(State(state): State<AppState>, Query(query): Query<ListProjectsQuery>) -> Result<Json<Vec<ProjectResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Projects::new(&mut conn);

    let filter = ProjectFilter {
        owner_id: query.owner_id,
        skip: query.skip.unwrap_or(0),
        limit: query.limit.unwrap_or(100).min(1000),
    };
    let projects = repo.list(&filter).await?;

    Ok(Json(projects.into_iter().map(ProjectResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/projects/lookup",
    tag = "projects",
    summary = "List (id, name) pairs for project pickers",
    responses(
        (status = 200, description = "Project lookup list", body = Vec<ProjectLookup>),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn lookup_projects(State(state): State<AppState>) -> Result<Json<Vec<ProjectLookup>>> {
    if let Some(cached) = state.project_lookup.get().await {
        return Ok(Json(cached.as_ref().clone()));
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Projects::new(&mut conn);
    let lookups: Vec<ProjectLookup> = repo.lookup().await?.into_iter().map(ProjectLookup::from).collect();

    let cached = state.project_lookup.insert(lookups).await;
    Ok(Json(cached.as_ref().clone()))
}

#[utoipa::path(
    get,
    path = "/projects/{id}",
    tag = "projects",
    summary = "Get a project with its owner and tasks",
    params(("id" = i64, Path, description = "Project id")),
    responses(
        (status = 200, description = "Project detail", body = ProjectDetailResponse),
        (status = 404, description = "Project not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all, fields(project_id = id))]
pub async fn get_project(State(state): State<AppState>, Path(id): Path<ProjectId>) -> Result<Json<ProjectDetailResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let project = load_project(&mut conn, id).await?;

    let owner = {
        let mut users = Users::new(&mut conn);
        users.get_by_id(project.owner_id).await?.ok_or_else(|| Error::NotFound {
            resource: "User".to_string(),
            id: project.owner_id.to_string(),
        })?
    };

    let tasks = {
        let mut tasks = Tasks::new(&mut conn);
        tasks
            .list(&TaskFilter {
                project_id: Some(id),
                ..Default::default()
            })
            .await?
    };

    Ok(Json(ProjectDetailResponse {
        project: ProjectResponse::from(project),
        owner: UserLookup::from(owner),
        tasks: tasks.into_iter().map(TaskResponse::from).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/projects/{id}/statistics",
    tag = "projects",
    summary = "Task statistics for one project",
    params(("id" = i64, Path, description = "Project id")),
    responses(
        (status = 200, description = "Project statistics", body = ProjectStatistics),
        (status = 404, description = "Project not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all, fields(project_id = id))]
pub async fn project_statistics(State(state): State<AppState>, Path(id): Path<ProjectId>) -> Result<Json<ProjectStatistics>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let project = load_project(&mut conn, id).await?;

    let mut tasks = Tasks::new(&mut conn);
    let stats = tasks.statistics(Some(id)).await?;

    Ok(Json(ProjectStatistics::new(&project, stats)))
}

#[utoipa::path(
    post,
    path = "/projects",
    tag = "projects",
    summary = "Create a project",
    request_body = ProjectCreate,
    responses(
        (status = 201, description = "Project created", body = ProjectResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Invalid token"),
        (status = 500, description = "Internal server error")
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_project(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<ProjectCreate>,
) -> Result<(StatusCode, Json<ProjectResponse>)> {
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let project;
    {
        let mut repo = Projects::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);
        let create_request = ProjectCreateDBRequest {
            name: request.name,
            description: request.description,
            owner_id: request.owner_id,
            start_date: request.start_date,
            end_date: request.end_date,
        };
        project = repo.create(&create_request, user.user_id).await?;
    }

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;
    state.project_lookup.invalidate().await;

    Ok((StatusCode::CREATED, Json(ProjectResponse::from(project))))
}

#[utoipa::path(
    put,
    path = "/projects/{id}",
    tag = "projects",
    summary = "Update a project (owner only)",
    params(("id" = i64, Path, description = "Project id")),
    request_body = ProjectUpdate,
    responses(
        (status = 200, description = "Project updated", body = ProjectResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Project not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all, fields(project_id = id))]
pub async fn update_project(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<ProjectId>,
    Json(request): Json<ProjectUpdate>,
) -> Result<Json<ProjectResponse>> {
    let actor = user.require_user_id()?;
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let project;
    {
        let mut repo = Projects::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);
        let current = repo.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
            resource: "Project".to_string(),
            id: id.to_string(),
        })?;

        if current.owner_id != actor {
            return Err(Error::Forbidden {
                action: Operation::Update,
                resource: "project".to_string(),
            });
        }

        // Merge the provided fields over the stored row, then write the full
        // row back. Two concurrent updaters race and the last write wins.
        let update_request = ProjectUpdateDBRequest {
            name: request.name.unwrap_or(current.name),
            description: request.description.unwrap_or(current.description),
            owner_id: current.owner_id,
            start_date: request.start_date.or(current.start_date),
            end_date: request.end_date.or(current.end_date),
        };
        project = repo.update(id, &update_request, Some(actor)).await?;
    }

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;
    state.project_lookup.invalidate().await;

    Ok(Json(ProjectResponse::from(project)))
}

#[utoipa::path(
    delete,
    path = "/projects/{id}",
    tag = "projects",
    summary = "Delete a project (owner only)",
    params(("id" = i64, Path, description = "Project id")),
    responses(
        (status = 204, description = "Project deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Project not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all, fields(project_id = id))]
pub async fn delete_project(State(state): State<AppState>, user: AuthenticatedUser, Path(id): Path<ProjectId>) -> Result<StatusCode> {
    let actor = user.require_user_id()?;
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    {
        let mut repo = Projects::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);
        let current = repo.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
            resource: "Project".to_string(),
            id: id.to_string(),
        })?;

        if current.owner_id != actor {
            return Err(Error::Forbidden {
                action: Operation::Delete,
                resource: "project".to_string(),
            });
        }

        repo.delete(id).await?;
    }

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;
    state.project_lookup.invalidate().await;

    Ok(StatusCode::NO_CONTENT)
}

async fn load_project(conn: &mut sqlx::PgConnection, id: ProjectId) -> Result<ProjectDBResponse> {
    let mut repo = Projects::new(conn);
    repo.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "Project".to_string(),
        id: id.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use crate::api::models::projects::{ProjectDetailResponse, ProjectLookup, ProjectResponse, ProjectStatistics};
    use crate::test_utils::{build_test_app, create_project, register_user};
    use serde_json::json;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_reads_are_public_writes_are_not(pool: PgPool) {
        let server = build_test_app(pool);

        server.get("/api/v1/projects").await.assert_status_ok();
        server.get("/api/v1/projects/lookup").await.assert_status_ok();

        let response = server
            .post("/api/v1/projects")
            .json(&json!({"name": "No auth", "owner_id": 1}))
            .await;
        response.assert_status_unauthorized();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_and_get_detail(pool: PgPool) {
        let server = build_test_app(pool);
        let (token, user_id) = register_user(&server, "alice").await;

        let project = create_project(&server, &token, user_id, "Alpha").await;
        assert_eq!(project.owner_id, user_id);

        let response = server.get(&format!("/api/v1/projects/{}", project.id)).await;
        response.assert_status_ok();
        let detail: ProjectDetailResponse = response.json();
        assert_eq!(detail.project.name, "Alpha");
        assert_eq!(detail.owner.id, user_id);
        assert!(detail.tasks.is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_get_missing_project_is_404(pool: PgPool) {
        let server = build_test_app(pool);
        server.get("/api/v1/projects/424242").await.assert_status_not_found();
        server.get("/api/v1/projects/424242/statistics").await.assert_status_not_found();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_only_owner_may_update_or_delete(pool: PgPool) {
        let server = build_test_app(pool);
        let (owner_token, owner_id) = register_user(&server, "owner").await;
        let (other_token, _) = register_user(&server, "other").await;

        let project = create_project(&server, &owner_token, owner_id, "Guarded").await;

        let response = server
            .put(&format!("/api/v1/projects/{}", project.id))
            .authorization_bearer(&other_token)
            .json(&json!({"name": "Hijacked"}))
            .await;
        response.assert_status_forbidden();

        let response = server
            .delete(&format!("/api/v1/projects/{}", project.id))
            .authorization_bearer(&other_token)
            .await;
        response.assert_status_forbidden();

        let response = server
            .put(&format!("/api/v1/projects/{}", project.id))
            .authorization_bearer(&owner_token)
            .json(&json!({"name": "Renamed"}))
            .await;
        response.assert_status_ok();
        let updated: ProjectResponse = response.json();
        assert_eq!(updated.name, "Renamed");
        // Fields that were not provided keep their stored values
        assert_eq!(updated.description, project.description);

        let response = server
            .delete(&format!("/api/v1/projects/{}", project.id))
            .authorization_bearer(&owner_token)
            .await;
        response.assert_status(axum::http::StatusCode::NO_CONTENT);

        server
            .get(&format!("/api/v1/projects/{}", project.id))
            .await
            .assert_status_not_found();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_lookup_cache_is_invalidated_by_writes(pool: PgPool) {
        let server = build_test_app(pool);
        let (token, user_id) = register_user(&server, "alice").await;

        create_project(&server, &token, user_id, "First").await;

        // Prime the cache
        let response = server.get("/api/v1/projects/lookup").await;
        let lookups: Vec<ProjectLookup> = response.json();
        assert_eq!(lookups.len(), 1);

        // A second create must be visible immediately
        let second = create_project(&server, &token, user_id, "Second").await;
        let response = server.get("/api/v1/projects/lookup").await;
        let lookups: Vec<ProjectLookup> = response.json();
        assert_eq!(lookups.len(), 2);

        // Re-prime, then rename: the new name must be visible immediately
        server.get("/api/v1/projects/lookup").await.assert_status_ok();
        server
            .put(&format!("/api/v1/projects/{}", second.id))
            .authorization_bearer(&token)
            .json(&json!({"name": "Renamed"}))
            .await
            .assert_status_ok();
        let response = server.get("/api/v1/projects/lookup").await;
        let lookups: Vec<ProjectLookup> = response.json();
        assert!(lookups.iter().any(|p| p.name == "Renamed"));
        assert!(!lookups.iter().any(|p| p.name == "Second"));

        // Re-prime, then delete: the project must disappear immediately
        server.get("/api/v1/projects/lookup").await.assert_status_ok();
        server
            .delete(&format!("/api/v1/projects/{}", second.id))
            .authorization_bearer(&token)
            .await
            .assert_status(axum::http::StatusCode::NO_CONTENT);
        let response = server.get("/api/v1/projects/lookup").await;
        let lookups: Vec<ProjectLookup> = response.json();
        assert_eq!(lookups.len(), 1);
        assert!(!lookups.iter().any(|p| p.id == second.id));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_statistics_include_project_name(pool: PgPool) {
        let server = build_test_app(pool);
        let (token, user_id) = register_user(&server, "alice").await;
        let project = create_project(&server, &token, user_id, "Stats").await;

        let response = server.get(&format!("/api/v1/projects/{}/statistics", project.id)).await;
        response.assert_status_ok();
        let stats: ProjectStatistics = response.json();
        assert_eq!(stats.project_id, project.id);
        assert_eq!(stats.project_name, "Stats");
        assert_eq!(stats.tasks.total_tasks, 0);
    }
}
