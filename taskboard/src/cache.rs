//! In-memory TTL cache for the project lookup list.
//!
//! The `(id, name)` picker list is read far more often than projects change,
//! so it is served from a single cached entry with a configurable TTL
//! (24 hours unless overridden). Project mutations invalidate the entry
//! before responding, so the TTL only matters for out-of-band writes.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use crate::api::models::projects::ProjectLookup;

#[derive(Clone, Debug)]
pub struct ProjectLookupCache {
    inner: Cache<(), Arc<Vec<ProjectLookup>>>,
}

impl ProjectLookupCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Cache::builder().max_capacity(1).time_to_live(ttl).build(),
        }
    }

    pub async fn get(&self) -> Option<Arc<Vec<ProjectLookup>>> {
        self.inner.get(&()).await
    }

    pub async fn insert(&self, lookups: Vec<ProjectLookup>) -> Arc<Vec<ProjectLookup>> {
        let lookups = Arc::new(lookups);
        self.inner.insert((), Arc::clone(&lookups)).await;
        lookups
    }

    pub async fn invalidate(&self) {
        self.inner.invalidate(&()).await;
    }
}
