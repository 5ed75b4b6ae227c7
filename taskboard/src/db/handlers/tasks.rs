//! Database repository for tasks.

use crate::{
    api::models::tasks::{TaskPriority, TaskStatus},
    db::{
        errors::{DbError, Result},
        handlers::repository::Repository,
        models::tasks::{TaskCreateDBRequest, TaskDBResponse, TaskStatisticsDB, TaskUpdateDBRequest},
    },
    types::{ProjectId, TaskId, UserId},
};
use sqlx::PgConnection;
use tracing::instrument;

/// Filter for listing tasks
#[derive(Debug, Clone)]
pub struct TaskFilter {
    pub project_id: Option<ProjectId>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub skip: i64,
    pub limit: i64,
}

impl Default for TaskFilter {
    fn default() -> Self {
        Self {
            project_id: None,
            status: None,
            priority: None,
            skip: 0,
            limit: 100,
        }
    }
}

pub struct Tasks<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Tasks<'c> {
    type CreateRequest = TaskCreateDBRequest;
    type UpdateRequest = TaskUpdateDBRequest;
    type Response = TaskDBResponse;
    type Id = TaskId;
    type Filter = TaskFilter;

    #[instrument(skip(self, request), fields(title = %request.title, project_id = request.project_id), err)]
    async fn create(&mut self, request: &Self::CreateRequest, actor: Option<UserId>) -> Result<Self::Response> {
        let task = sqlx::query_as::<_, TaskDBResponse>(
            r#"
            INSERT INTO tasks (title, description, project_id, assigned_to, due_date, status, priority, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.project_id)
        .bind(request.assigned_to)
        .bind(request.due_date)
        .bind(request.status)
        .bind(request.priority)
        .bind(actor)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(task)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let task = sqlx::query_as::<_, TaskDBResponse>("SELECT * FROM tasks WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(task)
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = sqlx::QueryBuilder::new("SELECT * FROM tasks WHERE 1=1");
        if let Some(project_id) = filter.project_id {
            query.push(" AND project_id = ");
            query.push_bind(project_id);
        }
        if let Some(status) = filter.status {
            query.push(" AND status = ");
            query.push_bind(status);
        }
        if let Some(priority) = filter.priority {
            query.push(" AND priority = ");
            query.push_bind(priority);
        }
        query.push(" ORDER BY created_at DESC LIMIT ");
        query.push_bind(filter.limit);
        query.push(" OFFSET ");
        query.push_bind(filter.skip);

        let tasks = query.build_query_as::<TaskDBResponse>().fetch_all(&mut *self.db).await?;

        Ok(tasks)
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest, actor: Option<UserId>) -> Result<Self::Response> {
        let task = sqlx::query_as::<_, TaskDBResponse>(
            r#"
            UPDATE tasks SET
                title = $2,
                description = $3,
                project_id = $4,
                assigned_to = $5,
                due_date = $6,
                completed_at = $7,
                status = $8,
                priority = $9,
                updated_at = NOW(),
                updated_by = $10
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.project_id)
        .bind(request.assigned_to)
        .bind(request.due_date)
        .bind(request.completed_at)
        .bind(request.status)
        .bind(request.priority)
        .bind(actor)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(task)
    }
}

impl<'c> Tasks<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Aggregate task counts, optionally scoped to one project.
    ///
    /// A task is overdue when its due date has passed and it is not done.
    #[instrument(skip(self), err)]
    pub async fn statistics(&mut self, project_id: Option<ProjectId>) -> Result<TaskStatisticsDB> {
        let mut query = sqlx::QueryBuilder::new(
            "SELECT COUNT(*) AS total_tasks, \
             COUNT(*) FILTER (WHERE status = 'done') AS completed_tasks, \
             COUNT(*) FILTER (WHERE status = 'in_progress') AS in_progress_tasks, \
             COUNT(*) FILTER (WHERE status = 'todo') AS todo_tasks, \
             COUNT(*) FILTER (WHERE due_date < NOW() AND status <> 'done') AS overdue_tasks \
             FROM tasks",
        );
        if let Some(project_id) = project_id {
            query.push(" WHERE project_id = ");
            query.push_bind(project_id);
        }

        let stats = query.build_query_as::<TaskStatisticsDB>().fetch_one(&mut *self.db).await?;

        Ok(stats)
    }
}
