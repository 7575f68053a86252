use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{ContentItem, ContentPatch, EnrichedContent};
use crate::error::StoreError;

/// Content store - the managed database holding content rows.
///
/// Listings are ordered newest-first by creation time.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Find one item by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ContentItem>, StoreError>;

    /// All items of one creator, any publication state.
    async fn list_by_creator(
        &self,
        creator_id: Uuid,
        limit: u64,
    ) -> Result<Vec<ContentItem>, StoreError>;

    /// Published items of one creator.
    async fn list_published_by_creator(
        &self,
        creator_id: Uuid,
        limit: u64,
    ) -> Result<Vec<ContentItem>, StoreError>;

    /// Published items across all creators.
    async fn list_published_global(&self, limit: u64) -> Result<Vec<ContentItem>, StoreError>;

    /// Published items joined with their creator's profile.
    async fn list_published_global_enriched(
        &self,
        limit: u64,
    ) -> Result<Vec<EnrichedContent>, StoreError>;

    /// Insert a new item and return the stored row.
    async fn insert(&self, item: ContentItem) -> Result<ContentItem, StoreError>;

    /// Apply a partial update and return the stored row.
    async fn update(&self, id: Uuid, patch: ContentPatch) -> Result<ContentItem, StoreError>;

    /// Delete an item by id.
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
}
