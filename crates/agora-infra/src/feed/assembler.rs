//! Feed loading: one fetch per call, with a degraded path for the global feed.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use agora_core::domain::{ContentItem, EnrichedContent};
use agora_core::error::{FeedError, StoreError};
use agora_core::feed::{FeedEntry, FeedFilter, apply_visibility};
use agora_core::ports::ContentStore;

/// Upper bound for a single store call.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Loads feeds from a content store and applies the visibility policy.
pub struct FeedAssembler {
    store: Arc<dyn ContentStore>,
    fetch_timeout: Duration,
}

impl FeedAssembler {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self {
            store,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    pub fn store(&self) -> &Arc<dyn ContentStore> {
        &self.store
    }

    /// Load the feed described by `filter`, evaluated against the current time.
    pub async fn load(&self, filter: &FeedFilter) -> Result<Vec<FeedEntry>, FeedError> {
        self.load_at(filter, Utc::now()).await
    }

    /// Load the feed described by `filter`, evaluated at `now`.
    pub async fn load_at(
        &self,
        filter: &FeedFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<FeedEntry>, FeedError> {
        let rows = match filter.creator_id {
            Some(creator_id) => self
                .fetch_creator(creator_id, filter)
                .await
                .map(|items| items.into_iter().map(EnrichedContent::from).collect())
                .map_err(FeedError::FetchFailed)?,
            None => self.fetch_global(filter.effective_limit()).await?,
        };

        Ok(apply_visibility(rows, filter, now))
    }

    /// Public profiles filter on the published flag in the store so the limit
    /// counts only rows that survive visibility.
    async fn fetch_creator(
        &self,
        creator_id: Uuid,
        filter: &FeedFilter,
    ) -> Result<Vec<ContentItem>, StoreError> {
        let limit = filter.effective_limit();
        if filter.include_unpublished {
            self.timed(self.store.list_by_creator(creator_id, limit)).await
        } else {
            self.timed(self.store.list_published_by_creator(creator_id, limit))
                .await
        }
    }

    /// Enriched query first; on any failure, the plain query.
    async fn fetch_global(&self, limit: u64) -> Result<Vec<EnrichedContent>, FeedError> {
        let enriched = match self
            .timed(self.store.list_published_global_enriched(limit))
            .await
        {
            Ok(rows) => return Ok(rows),
            Err(e) => e,
        };

        let degraded = FeedError::EnrichmentUnavailable(enriched.clone());
        tracing::warn!(error = %degraded, limit, "Falling back to plain feed query");

        match self.timed(self.store.list_published_global(limit)).await {
            Ok(items) => Ok(items.into_iter().map(EnrichedContent::from).collect()),
            Err(plain) => Err(FeedError::FatalLoadFailure { enriched, plain }),
        }
    }

    async fn timed<T>(
        &self,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        tokio::time::timeout(self.fetch_timeout, call)
            .await
            .map_err(|_| StoreError::Timeout(self.fetch_timeout))?
    }
}
