//! In-memory content store - used when no backend is configured.
//!
//! Data is lost on process restart.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use agora_core::domain::{ContentItem, ContentPatch, CreatorProfile, EnrichedContent};
use agora_core::error::StoreError;
use agora_core::ports::ContentStore;

#[derive(Default)]
struct Tables {
    content: HashMap<Uuid, ContentItem>,
    profiles: HashMap<Uuid, CreatorProfile>,
}

/// Content store backed by hash maps behind an async RwLock.
#[derive(Default)]
pub struct InMemoryContentStore {
    tables: RwLock<Tables>,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a creator profile so enriched listings can join it.
    pub async fn upsert_profile(&self, profile: CreatorProfile) {
        let mut tables = self.tables.write().await;
        tables.profiles.insert(profile.id, profile);
    }

    /// Newest-first, ties broken by id so repeated listings are identical.
    fn newest_first<'a>(
        items: impl Iterator<Item = &'a ContentItem>,
        limit: u64,
    ) -> Vec<ContentItem> {
        let mut items: Vec<ContentItem> = items.cloned().collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        items.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        items
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ContentItem>, StoreError> {
        Ok(self.tables.read().await.content.get(&id).cloned())
    }

    async fn list_by_creator(
        &self,
        creator_id: Uuid,
        limit: u64,
    ) -> Result<Vec<ContentItem>, StoreError> {
        let tables = self.tables.read().await;
        Ok(Self::newest_first(
            tables.content.values().filter(|c| c.creator_id == creator_id),
            limit,
        ))
    }

    async fn list_published_by_creator(
        &self,
        creator_id: Uuid,
        limit: u64,
    ) -> Result<Vec<ContentItem>, StoreError> {
        let tables = self.tables.read().await;
        Ok(Self::newest_first(
            tables
                .content
                .values()
                .filter(|c| c.creator_id == creator_id && c.is_published),
            limit,
        ))
    }

    async fn list_published_global(&self, limit: u64) -> Result<Vec<ContentItem>, StoreError> {
        let tables = self.tables.read().await;
        Ok(Self::newest_first(
            tables.content.values().filter(|c| c.is_published),
            limit,
        ))
    }

    async fn list_published_global_enriched(
        &self,
        limit: u64,
    ) -> Result<Vec<EnrichedContent>, StoreError> {
        let tables = self.tables.read().await;
        let items = Self::newest_first(tables.content.values().filter(|c| c.is_published), limit);

        Ok(items
            .into_iter()
            .map(|item| EnrichedContent {
                creator: tables.profiles.get(&item.creator_id).cloned(),
                item,
            })
            .collect())
    }

    async fn insert(&self, item: ContentItem) -> Result<ContentItem, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.content.contains_key(&item.id) {
            return Err(StoreError::Constraint(format!(
                "content {} already exists",
                item.id
            )));
        }
        tables.content.insert(item.id, item.clone());
        tracing::debug!(content_id = %item.id, "Content inserted");
        Ok(item)
    }

    async fn update(&self, id: Uuid, patch: ContentPatch) -> Result<ContentItem, StoreError> {
        let mut tables = self.tables.write().await;
        let item = tables.content.get_mut(&id).ok_or(StoreError::NotFound)?;
        patch.apply_to(item);
        Ok(item.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        tables
            .content
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_core::domain::ContentType;
    use chrono::TimeDelta;
    use serde_json::json;

    fn post(creator_id: Uuid, title: &str, age_minutes: i64) -> ContentItem {
        let mut item = ContentItem::new(creator_id, title, ContentType::Text, json!({"body": title}));
        item.created_at -= TimeDelta::minutes(age_minutes);
        item
    }

    #[tokio::test]
    async fn lists_creator_items_newest_first_with_limit() {
        let store = InMemoryContentStore::new();
        let creator = Uuid::new_v4();
        for (title, age) in [("old", 30), ("new", 1), ("mid", 10)] {
            store.insert(post(creator, title, age)).await.unwrap();
        }
        store.insert(post(Uuid::new_v4(), "other", 0)).await.unwrap();

        let titles: Vec<_> = store
            .list_by_creator(creator, 2)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.title)
            .collect();
        assert_eq!(titles, vec!["new", "mid"]);
    }

    #[tokio::test]
    async fn published_creator_listing_skips_newer_drafts() {
        let store = InMemoryContentStore::new();
        let creator = Uuid::new_v4();
        store.insert(post(creator, "released", 60).published()).await.unwrap();
        for (title, age) in [("wip-1", 3), ("wip-2", 2), ("wip-3", 1)] {
            store.insert(post(creator, title, age)).await.unwrap();
        }

        let items = store.list_published_by_creator(creator, 2).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "released");
    }

    #[tokio::test]
    async fn enriched_listing_joins_known_profiles() {
        let store = InMemoryContentStore::new();
        let creator = Uuid::new_v4();
        store.upsert_profile(CreatorProfile::new(creator, "mira")).await;
        store.insert(post(creator, "hello", 0).published()).await.unwrap();
        store.insert(post(Uuid::new_v4(), "orphan", 1).published()).await.unwrap();
        store.insert(post(creator, "hidden", 2)).await.unwrap();

        let rows = store.list_published_global_enriched(10).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].creator.as_ref().map(|p| p.username.as_str()), Some("mira"));
        assert!(rows[1].creator.is_none());
    }

    #[tokio::test]
    async fn update_and_delete_missing_are_not_found() {
        let store = InMemoryContentStore::new();
        let id = Uuid::new_v4();
        assert!(matches!(
            store.update(id, ContentPatch::default()).await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(store.delete(id).await, Err(StoreError::NotFound)));
    }
}
