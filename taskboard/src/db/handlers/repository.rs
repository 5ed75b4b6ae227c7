//! Base repository trait for database operations.

/// Contains the Repository trait.
///
/// A repository is basically a data access layer for a postgres table. It
/// provides methods for creating, reading, updating, and deleting entities,
/// as well as listing them with simple filters.
use crate::db::errors::Result;
use crate::types::UserId;

/// Base repository trait providing common database operations.
///
/// This trait has separate associated types for create requests, update requests, and responses.
///
/// Writes are audit-stamped: `create` records `created_at`/`created_by` and
/// `update` records `updated_at`/`updated_by` from the `actor` argument. The
/// actor is always passed explicitly by the caller; the data layer never
/// reads identity from ambient state. An anonymous write stamps a null actor.
///
/// `update` writes the full set of mutable columns from the request. Callers
/// load the current row, merge their changes over it, and save - which means
/// two concurrent updaters race and the last write wins.
#[async_trait::async_trait]
pub trait Repository {
    /// The request type for creating entities
    type CreateRequest;

    /// The request type for updating entities
    type UpdateRequest;

    /// The response/DTO type returned by operations
    type Response;

    /// The identifier type for lookups
    type Id: Send + Sync;

    /// The filter type for list operations
    type Filter: Send + Sync;

    /// Create a new entity, stamped with the acting user
    async fn create(&mut self, request: &Self::CreateRequest, actor: Option<UserId>) -> Result<Self::Response>;

    /// Get an entity by ID
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>>;

    /// List entities with filtering and pagination
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>>;

    /// Delete an entity by ID, returning whether a row was removed
    async fn delete(&mut self, id: Self::Id) -> Result<bool>;

    /// Update an entity by ID, stamped with the acting user
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest, actor: Option<UserId>) -> Result<Self::Response>;
}
