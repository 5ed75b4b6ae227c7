//! API request/response models for projects.

use crate::api::models::tasks::{TaskResponse, TaskStatistics};
use crate::api::models::users::UserLookup;
use crate::db::models::projects::{ProjectDBResponse, ProjectLookupDB};
use crate::db::models::tasks::TaskStatisticsDB;
use crate::types::{ProjectId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

// Project request models
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProjectCreate {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub owner_id: UserId,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Partial update; absent fields keep their stored values.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

// Project response models
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProjectResponse {
    pub id: ProjectId,
    pub name: String,
    pub description: String,
    pub owner_id: UserId,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Project detail with its owner and tasks eagerly resolved.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProjectDetailResponse {
    #[serde(flatten)]
    pub project: ProjectResponse,
    pub owner: UserLookup,
    pub tasks: Vec<TaskResponse>,
}

/// Minimal `(id, name)` pair for pickers; this is the cached shape.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ProjectLookup {
    pub id: ProjectId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ProjectStatistics {
    pub project_id: ProjectId,
    pub project_name: String,
    #[serde(flatten)]
    pub tasks: TaskStatistics,
}

/// Query parameters for listing projects
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListProjectsQuery {
    pub owner_id: Option<UserId>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl From<ProjectDBResponse> for ProjectResponse {
    fn from(db: ProjectDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            description: db.description,
            owner_id: db.owner_id,
            start_date: db.start_date,
            end_date: db.end_date,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<ProjectLookupDB> for ProjectLookup {
    fn from(db: ProjectLookupDB) -> Self {
        Self { id: db.id, name: db.name }
    }
}

impl ProjectStatistics {
    pub fn new(project: &ProjectDBResponse, stats: TaskStatisticsDB) -> Self {
        Self {
            project_id: project.id,
            project_name: project.name.clone(),
            tasks: stats.into(),
        }
    }
}
