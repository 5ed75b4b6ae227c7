//! Task endpoints.
//!
//! Reads are public; writes require a bearer token. Unlike projects, task
//! updates and deletes are open to any authenticated user - tasks move
//! between teammates, so there is no ownership gate. Every mutation
//! broadcasts a change event to the notifications hub.

use crate::api::models::projects::ProjectLookup;
use crate::api::models::tasks::{
    ListTasksQuery, TaskCreate, TaskDetailResponse, TaskResponse, TaskStatistics, TaskStatisticsQuery, TaskUpdate,
};
use crate::api::models::users::UserLookup;
use crate::auth::AuthenticatedUser;
use crate::db::handlers::{tasks::TaskFilter, Projects, Repository, Tasks, Users};
use crate::db::models::tasks::{TaskCreateDBRequest, TaskUpdateDBRequest};
use crate::errors::{Error, Result};
use crate::notifications::TaskEventKind;
use crate::types::TaskId;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use sqlx::Acquire;

#[utoipa::path(
    get,
    path = "/tasks",
    tag = "tasks",
    summary = "List tasks",
    params(ListTasksQuery),
    responses(
        (status = 200, description = "List of tasks", body = Vec<TaskResponse>),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_tasks(State(state): State<AppState>, Query(query): Query<ListTasksQuery>) -> Result<Json<Vec<TaskResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Tasks::new(&mut conn);

    let filter = TaskFilter {
        project_id: query.project_id,
        status: query.status,
        priority: query.priority,
        skip: query.skip.unwrap_or(0),
        limit: query.limit.unwrap_or(100).min(1000),
    };
    let tasks = repo.list(&filter).await?;

    Ok(Json(tasks.into_iter().map(TaskResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/tasks/statistics",
    tag = "tasks",
    summary = "Aggregate task counts",
    params(TaskStatisticsQuery),
    responses(
        (status = 200, description = "Task statistics", body = TaskStatistics),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn task_statistics(State(state): State<AppState>, Query(query): Query<TaskStatisticsQuery>) -> Result<Json<TaskStatistics>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Tasks::new(&mut conn);

    let stats = repo.statistics(query.project_id).await?;
    Ok(Json(TaskStatistics::from(stats)))
}

#[utoipa::path(
    get,
    path = "/tasks/{id}",
    tag = "tasks",
    summary = "Get a task with its project and assignee",
    params(("id" = i64, Path, description = "Task id")),
    responses(
        (status = 200, description = "Task detail", body = TaskDetailResponse),
        (status = 404, description = "Task not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all, fields(task_id = id))]
pub async fn get_task(State(state): State<AppState>, Path(id): Path<TaskId>) -> Result<Json<TaskDetailResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let task = {
        let mut repo = Tasks::new(&mut conn);
        repo.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
            resource: "Task".to_string(),
            id: id.to_string(),
        })?
    };

    let project = {
        let mut projects = Projects::new(&mut conn);
        projects.get_by_id(task.project_id).await?.ok_or_else(|| Error::NotFound {
            resource: "Project".to_string(),
            id: task.project_id.to_string(),
        })?
    };

    let assignee = {
        let mut users = Users::new(&mut conn);
        users.get_by_id(task.assigned_to).await?.ok_or_else(|| Error::NotFound {
            resource: "User".to_string(),
            id: task.assigned_to.to_string(),
        })?
    };

    Ok(Json(TaskDetailResponse {
        task: TaskResponse::from(task),
        project: ProjectLookup {
            id: project.id,
            name: project.name,
        },
        assignee: UserLookup::from(assignee),
    }))
}

#[utoipa::path(
    post,
    path = "/tasks",
    tag = "tasks",
    summary = "Create a task",
    request_body = TaskCreate,
    responses(
        (status = 201, description = "Task created", body = TaskResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Invalid token"),
        (status = 500, description = "Internal server error")
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_task(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<TaskCreate>,
) -> Result<(StatusCode, Json<TaskResponse>)> {
    let actor = user.require_user_id()?;
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let task;
    {
        let mut repo = Tasks::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);
        let create_request = TaskCreateDBRequest {
            title: request.title,
            description: request.description,
            project_id: request.project_id,
            // An unassigned task goes to whoever created it
            assigned_to: request.assigned_to.unwrap_or(actor),
            due_date: request.due_date,
            status: request.status,
            priority: request.priority,
        };
        task = repo.create(&create_request, Some(actor)).await?;
    }

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;
    state.task_events.publish(TaskEventKind::TaskCreated, task.id);

    Ok((StatusCode::CREATED, Json(TaskResponse::from(task))))
}

#[utoipa::path(
    put,
    path = "/tasks/{id}",
    tag = "tasks",
    summary = "Update a task",
    params(("id" = i64, Path, description = "Task id")),
    request_body = TaskUpdate,
    responses(
        (status = 200, description = "Task updated", body = TaskResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Invalid token"),
        (status = 404, description = "Task not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all, fields(task_id = id))]
pub async fn update_task(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<TaskId>,
    Json(request): Json<TaskUpdate>,
) -> Result<Json<TaskResponse>> {
    let actor = user.require_user_id()?;
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let task;
    {
        let mut repo = Tasks::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);
        let current = repo.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
            resource: "Task".to_string(),
            id: id.to_string(),
        })?;

        // Merge the provided fields over the stored row, then write the full
        // row back. Two concurrent updaters race and the last write wins.
        let update_request = TaskUpdateDBRequest {
            title: request.title.unwrap_or(current.title),
            description: request.description.unwrap_or(current.description),
            project_id: request.project_id.unwrap_or(current.project_id),
            assigned_to: request.assigned_to.unwrap_or(current.assigned_to),
            due_date: request.due_date.or(current.due_date),
            completed_at: request.completed_at.or(current.completed_at),
            status: request.status.unwrap_or(current.status),
            priority: request.priority.unwrap_or(current.priority),
        };
        task = repo.update(id, &update_request, Some(actor)).await?;
    }

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;
    state.task_events.publish(TaskEventKind::TaskUpdated, task.id);

    Ok(Json(TaskResponse::from(task)))
}

#[utoipa::path(
    delete,
    path = "/tasks/{id}",
    tag = "tasks",
    summary = "Delete a task",
    params(("id" = i64, Path, description = "Task id")),
    responses(
        (status = 204, description = "Task deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Invalid token"),
        (status = 404, description = "Task not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all, fields(task_id = id))]
pub async fn delete_task(State(state): State<AppState>, user: AuthenticatedUser, Path(id): Path<TaskId>) -> Result<StatusCode> {
    user.require_user_id()?;
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    {
        let mut repo = Tasks::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);
        repo.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
            resource: "Task".to_string(),
            id: id.to_string(),
        })?;

        repo.delete(id).await?;
    }

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;
    state.task_events.publish(TaskEventKind::TaskDeleted, id);

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use crate::api::models::tasks::{TaskDetailResponse, TaskResponse, TaskStatistics, TaskStatus};
    use crate::test_utils::{build_test_app, create_project, create_task, register_user};
    use serde_json::json;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_defaults_assignee_to_creator(pool: PgPool) {
        let server = build_test_app(pool);
        let (token, user_id) = register_user(&server, "alice").await;
        let project = create_project(&server, &token, user_id, "Board").await;

        let response = server
            .post("/api/v1/tasks")
            .authorization_bearer(&token)
            .json(&json!({"title": "Unassigned", "project_id": project.id}))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        let task: TaskResponse = response.json();
        assert_eq!(task.assigned_to, user_id);
        assert_eq!(task.status, TaskStatus::Todo);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_any_authenticated_user_may_update(pool: PgPool) {
        let server = build_test_app(pool);
        let (owner_token, owner_id) = register_user(&server, "owner").await;
        let (other_token, _) = register_user(&server, "other").await;
        let project = create_project(&server, &owner_token, owner_id, "Board").await;
        let task = create_task(&server, &owner_token, project.id, "Shared").await;

        // No ownership gate on tasks, unlike projects
        let response = server
            .put(&format!("/api/v1/tasks/{}", task.id))
            .authorization_bearer(&other_token)
            .json(&json!({"status": "done"}))
            .await;
        response.assert_status_ok();
        let updated: TaskResponse = response.json();
        assert_eq!(updated.status, TaskStatus::Done);
        assert_eq!(updated.title, "Shared");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_requires_token(pool: PgPool) {
        let server = build_test_app(pool);
        let (token, user_id) = register_user(&server, "alice").await;
        let project = create_project(&server, &token, user_id, "Board").await;
        let task = create_task(&server, &token, project.id, "Locked").await;

        let response = server
            .put(&format!("/api/v1/tasks/{}", task.id))
            .json(&json!({"status": "done"}))
            .await;
        response.assert_status_unauthorized();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_detail_resolves_project_and_assignee(pool: PgPool) {
        let server = build_test_app(pool);
        let (token, user_id) = register_user(&server, "alice").await;
        let project = create_project(&server, &token, user_id, "Board").await;
        let task = create_task(&server, &token, project.id, "Detailed").await;

        let response = server.get(&format!("/api/v1/tasks/{}", task.id)).await;
        response.assert_status_ok();
        let detail: TaskDetailResponse = response.json();
        assert_eq!(detail.project.name, "Board");
        assert_eq!(detail.assignee.id, user_id);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_delete_missing_task_is_404(pool: PgPool) {
        let server = build_test_app(pool);
        let (token, _) = register_user(&server, "alice").await;

        let response = server.delete("/api/v1/tasks/424242").authorization_bearer(&token).await;
        response.assert_status_not_found();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_statistics_scenario(pool: PgPool) {
        let server = build_test_app(pool);
        let (token, user_id) = register_user(&server, "alice").await;
        let project = create_project(&server, &token, user_id, "Board").await;

        server
            .post("/api/v1/tasks")
            .authorization_bearer(&token)
            .json(&json!({
                "title": "overdue todo",
                "project_id": project.id,
                "due_date": "2020-01-01T00:00:00Z"
            }))
            .await
            .assert_status(axum::http::StatusCode::CREATED);
        server
            .post("/api/v1/tasks")
            .authorization_bearer(&token)
            .json(&json!({"title": "todo", "project_id": project.id}))
            .await
            .assert_status(axum::http::StatusCode::CREATED);
        server
            .post("/api/v1/tasks")
            .authorization_bearer(&token)
            .json(&json!({"title": "doing", "project_id": project.id, "status": "in_progress"}))
            .await
            .assert_status(axum::http::StatusCode::CREATED);
        server
            .post("/api/v1/tasks")
            .authorization_bearer(&token)
            .json(&json!({"title": "done", "project_id": project.id, "status": "done"}))
            .await
            .assert_status(axum::http::StatusCode::CREATED);

        let response = server
            .get(&format!("/api/v1/tasks/statistics?project_id={}", project.id))
            .await;
        response.assert_status_ok();
        let stats: TaskStatistics = response.json();
        assert_eq!(stats.total_tasks, 4);
        assert_eq!(stats.completed_tasks, 1);
        assert_eq!(stats.in_progress_tasks, 1);
        assert_eq!(stats.todo_tasks, 2);
        assert_eq!(stats.overdue_tasks, 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_filters_by_status(pool: PgPool) {
        let server = build_test_app(pool);
        let (token, user_id) = register_user(&server, "alice").await;
        let project = create_project(&server, &token, user_id, "Board").await;
        create_task(&server, &token, project.id, "one").await;
        server
            .post("/api/v1/tasks")
            .authorization_bearer(&token)
            .json(&json!({"title": "two", "project_id": project.id, "status": "done"}))
            .await
            .assert_status(axum::http::StatusCode::CREATED);

        let response = server.get("/api/v1/tasks?status=done").await;
        response.assert_status_ok();
        let tasks: Vec<TaskResponse> = response.json();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "two");
    }
}
