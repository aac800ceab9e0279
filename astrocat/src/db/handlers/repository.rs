//! Base repository trait for database operations.

use std::collections::HashMap;

/// Contains the Repository trait.
///
/// A repository is a data access layer for a postgres table. It provides methods for creating,
/// reading, updating, and soft-deleting entities, as well as listing them with simple filters.
/// Reads never return soft-deleted rows, and every write records the actor that made it.
use crate::db::errors::Result;

/// Base repository trait providing common database operations
///
/// This trait has separate associated types for create requests, update requests, and responses.
#[async_trait::async_trait]
pub trait Repository {
    /// The request type for creating entities
    type CreateRequest: Send + Sync;

    /// The request type for updating entities
    type UpdateRequest: Send + Sync;

    /// The response/DTO type returned by operations
    type Response: Send;

    /// The identifier type for lookups
    type Id: Send + Sync;

    /// The filter type for list operations
    type Filter: Send + Sync;

    /// Create a new entity
    async fn create(&mut self, request: &Self::CreateRequest, updated_by: &str) -> Result<Self::Response>;

    /// Create several entities, returning them in input order.
    ///
    /// Run this on a transaction if the batch must be all-or-nothing.
    async fn bulk_create(&mut self, requests: &[Self::CreateRequest], updated_by: &str) -> Result<Vec<Self::Response>> {
        let mut created = Vec::with_capacity(requests.len());
        for request in requests {
            created.push(self.create(request, updated_by).await?);
        }
        Ok(created)
    }

    /// Get a live entity by ID
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>>;

    /// Get lots of live entities by their IDs, keyed by ID
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>>;

    /// List live entities matching the filter
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>>;

    /// Soft-delete an entity by ID. Returns false if no live entity matched.
    async fn delete(&mut self, id: Self::Id) -> Result<bool>;

    /// Update a live entity by ID
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest, updated_by: &str) -> Result<Self::Response>;
}
