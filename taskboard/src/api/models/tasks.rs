//! API request/response models for tasks.

use crate::api::models::projects::ProjectLookup;
use crate::api::models::users::UserLookup;
use crate::db::models::tasks::{TaskDBResponse, TaskStatisticsDB};
use crate::types::{ProjectId, TaskId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "task_priority", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

// Task request models
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TaskCreate {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub project_id: ProjectId,
    /// Defaults to the creating user when absent.
    pub assigned_to: Option<UserId>,
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: TaskPriority,
}

/// Partial update; absent fields keep their stored values.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub project_id: Option<ProjectId>,
    pub assigned_to: Option<UserId>,
    pub due_date: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
}

// Task response models
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TaskResponse {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub project_id: ProjectId,
    pub assigned_to: UserId,
    pub due_date: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Task detail with its project and assignee resolved for display.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TaskDetailResponse {
    #[serde(flatten)]
    pub task: TaskResponse,
    pub project: ProjectLookup,
    pub assignee: UserLookup,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct TaskStatistics {
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub in_progress_tasks: i64,
    pub todo_tasks: i64,
    pub overdue_tasks: i64,
}

/// Query parameters for listing tasks
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListTasksQuery {
    pub project_id: Option<ProjectId>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

/// Query parameters for task statistics
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct TaskStatisticsQuery {
    pub project_id: Option<ProjectId>,
}

impl From<TaskDBResponse> for TaskResponse {
    fn from(db: TaskDBResponse) -> Self {
        Self {
            id: db.id,
            title: db.title,
            description: db.description,
            project_id: db.project_id,
            assigned_to: db.assigned_to,
            due_date: db.due_date,
            completed_at: db.completed_at,
            status: db.status,
            priority: db.priority,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<TaskStatisticsDB> for TaskStatistics {
    fn from(db: TaskStatisticsDB) -> Self {
        Self {
            total_tasks: db.total_tasks,
            completed_tasks: db.completed_tasks,
            in_progress_tasks: db.in_progress_tasks,
            todo_tasks: db.todo_tasks,
            overdue_tasks: db.overdue_tasks,
        }
    }
}
