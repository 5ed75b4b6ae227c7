//! Database request/response models for projects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::types::{ProjectId, UserId};

/// Request to create a project row.
#[derive(Debug, Clone)]
pub struct ProjectCreateDBRequest {
    pub name: String,
    pub description: String,
    pub owner_id: UserId,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Request to update a project row.
///
/// Updates write every mutable column; callers merge partial input over the
/// loaded row first, so a stale caller overwrites concurrent changes.
#[derive(Debug, Clone)]
pub struct ProjectUpdateDBRequest {
    pub name: String,
    pub description: String,
    pub owner_id: UserId,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// A project row as stored, including audit columns.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProjectDBResponse {
    pub id: ProjectId,
    pub name: String,
    pub description: String,
    pub owner_id: UserId,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<UserId>,
    pub updated_at: Option<DateTime<Utc>>,
    pub updated_by: Option<UserId>,
}

/// Minimal `(id, name)` pair for pickers and the lookup cache.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct ProjectLookupDB {
    pub id: ProjectId,
    pub name: String,
}
