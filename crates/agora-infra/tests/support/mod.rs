//! Store double with failure switches, call counters and an artificial delay.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use agora_core::domain::{ContentItem, ContentPatch, ContentType, CreatorProfile, EnrichedContent};
use agora_core::error::StoreError;
use agora_core::ports::ContentStore;
use agora_infra::InMemoryContentStore;
use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

#[derive(Default)]
pub struct ScriptedStore {
    pub inner: InMemoryContentStore,
    pub delay: Duration,
    pub fail_enriched: AtomicBool,
    pub fail_plain: AtomicBool,
    pub fail_creator: AtomicBool,
    /// The next enriched listing panics, then the flag clears itself.
    pub panic_enriched_once: AtomicBool,
    pub enriched_calls: AtomicUsize,
    pub plain_calls: AtomicUsize,
    pub creator_calls: AtomicUsize,
}

impl ScriptedStore {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn fail(flag: &AtomicBool, on: bool) {
        flag.store(on, Ordering::SeqCst);
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    /// Total listing calls of any kind.
    pub fn fetches(&self) -> usize {
        Self::count(&self.enriched_calls)
            + Self::count(&self.plain_calls)
            + Self::count(&self.creator_calls)
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }

    fn check(flag: &AtomicBool, what: &str) -> Result<(), StoreError> {
        if flag.load(Ordering::SeqCst) {
            Err(StoreError::Query(format!("{what} unavailable")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ContentStore for ScriptedStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ContentItem>, StoreError> {
        self.inner.find_by_id(id).await
    }

    async fn list_by_creator(
        &self,
        creator_id: Uuid,
        limit: u64,
    ) -> Result<Vec<ContentItem>, StoreError> {
        self.creator_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        Self::check(&self.fail_creator, "creator listing")?;
        self.inner.list_by_creator(creator_id, limit).await
    }

    async fn list_published_by_creator(
        &self,
        creator_id: Uuid,
        limit: u64,
    ) -> Result<Vec<ContentItem>, StoreError> {
        self.creator_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        Self::check(&self.fail_creator, "creator listing")?;
        self.inner.list_published_by_creator(creator_id, limit).await
    }

    async fn list_published_global(&self, limit: u64) -> Result<Vec<ContentItem>, StoreError> {
        self.plain_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        Self::check(&self.fail_plain, "plain listing")?;
        self.inner.list_published_global(limit).await
    }

    async fn list_published_global_enriched(
        &self,
        limit: u64,
    ) -> Result<Vec<EnrichedContent>, StoreError> {
        self.enriched_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        if self.panic_enriched_once.swap(false, Ordering::SeqCst) {
            panic!("profile join adapter crashed");
        }
        Self::check(&self.fail_enriched, "profile join")?;
        self.inner.list_published_global_enriched(limit).await
    }

    async fn insert(&self, item: ContentItem) -> Result<ContentItem, StoreError> {
        self.inner.insert(item).await
    }

    async fn update(&self, id: Uuid, patch: ContentPatch) -> Result<ContentItem, StoreError> {
        self.inner.update(id, patch).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.inner.delete(id).await
    }
}

pub fn text_post(creator_id: Uuid, title: &str) -> ContentItem {
    ContentItem::new(creator_id, title, ContentType::Text, json!({ "body": title }))
}

pub async fn seed_creator(store: &ScriptedStore, username: &str) -> Uuid {
    let id = Uuid::new_v4();
    store
        .inner
        .upsert_profile(CreatorProfile::new(id, username))
        .await;
    id
}
