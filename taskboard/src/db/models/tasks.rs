//! Database request/response models for tasks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::api::models::tasks::{TaskPriority, TaskStatus};
use crate::types::{ProjectId, TaskId, UserId};

/// Request to create a task row.
#[derive(Debug, Clone)]
pub struct TaskCreateDBRequest {
    pub title: String,
    pub description: String,
    pub project_id: ProjectId,
    pub assigned_to: UserId,
    pub due_date: Option<DateTime<Utc>>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
}

/// Request to update a task row.
///
/// Updates write every mutable column; callers merge partial input over the
/// loaded row first, so a stale caller overwrites concurrent changes.
#[derive(Debug, Clone)]
pub struct TaskUpdateDBRequest {
    pub title: String,
    pub description: String,
    pub project_id: ProjectId,
    pub assigned_to: UserId,
    pub due_date: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
}

/// A task row as stored, including audit columns.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TaskDBResponse {
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
    pub created_by: Option<UserId>,
    pub updated_at: Option<DateTime<Utc>>,
    pub updated_by: Option<UserId>,
}

/// Aggregate task counts, optionally scoped to one project.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct TaskStatisticsDB {
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub in_progress_tasks: i64,
    pub todo_tasks: i64,
    pub overdue_tasks: i64,
}
