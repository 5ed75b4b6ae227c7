//! Database layer: repositories over `PgConnection` plus their request and
//! response models.

pub mod errors;
pub mod handlers;
pub mod models;
