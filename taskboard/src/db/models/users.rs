//! Database request/response models for users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::types::UserId;

/// Request to create a user row.
#[derive(Debug, Clone)]
pub struct UserCreateDBRequest {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
}

/// Request to update a user row.
///
/// Updates write every mutable column; callers merge partial input over the
/// loaded row first.
#[derive(Debug, Clone)]
pub struct UserUpdateDBRequest {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
}

/// A user row as stored, including audit columns.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserDBResponse {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<UserId>,
    pub updated_at: Option<DateTime<Utc>>,
    pub updated_by: Option<UserId>,
}
