//! Application state - shared across all handlers.

use std::sync::Arc;

use agora_core::feed::FeedFilter;
use agora_core::ports::ContentStore;
use agora_infra::{FeedAssembler, InMemoryContentStore, RefreshHandle, RefreshLoop};

use crate::config::{AppConfig, FeedConfig};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ContentStore>,
    pub assembler: Arc<FeedAssembler>,
    /// Refresh loop backing `GET /api/feed`.
    pub public_feed: Arc<RefreshHandle>,
    pub feed: FeedConfig,
    pub store_kind: &'static str,
}

impl AppState {
    /// Pick a content store and start the public feed loop.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn new(config: &AppConfig) -> Self {
        let (store, store_kind) = select_store(config).await;
        Self::with_store(store, store_kind, config.feed.clone())
    }

    pub fn with_store(
        store: Arc<dyn ContentStore>,
        store_kind: &'static str,
        feed: FeedConfig,
    ) -> Self {
        let assembler =
            Arc::new(FeedAssembler::new(store.clone()).with_fetch_timeout(feed.fetch_timeout));

        let public_feed = RefreshLoop::new(
            assembler.clone(),
            FeedFilter::global().with_limit(feed.page_limit),
        )
        .with_interval(feed.refresh_interval)
        .spawn();

        tracing::info!(store = store_kind, "Application state initialized");

        Self {
            store,
            assembler,
            public_feed: Arc::new(public_feed),
            feed,
            store_kind,
        }
    }

    /// Stop the public feed loop, waiting for it when no handler still holds it.
    pub async fn shutdown(self) {
        match Arc::try_unwrap(self.public_feed) {
            Ok(handle) => handle.shutdown().await,
            Err(shared) => shared.cancel(),
        }
    }
}

/// Postgres if `DATABASE_URL` is set, else the hosted backend if `BACKEND_URL`
/// is set, else in-memory. A backend that fails to initialize falls through to
/// the next option.
async fn select_store(config: &AppConfig) -> (Arc<dyn ContentStore>, &'static str) {
    #[cfg(feature = "postgres")]
    if let Some(db) = &config.database {
        match agora_infra::database::connect(db).await {
            Ok(conn) => {
                return (
                    Arc::new(agora_infra::PostgresContentStore::new(conn)),
                    "postgres",
                );
            }
            Err(e) => {
                tracing::error!("Failed to connect to database: {}. Trying next store.", e);
            }
        }
    }
    #[cfg(not(feature = "postgres"))]
    if config.database.is_some() {
        tracing::warn!("DATABASE_URL set but the postgres feature is disabled");
    }

    #[cfg(feature = "rest")]
    if let Some(backend) = &config.backend {
        let rest = agora_infra::PostgrestConfig::new(backend.url.clone(), backend.api_key.clone());
        match agora_infra::PostgrestContentStore::new(rest) {
            Ok(store) => return (Arc::new(store), "postgrest"),
            Err(e) => {
                tracing::error!("Failed to set up backend client: {}. Trying next store.", e);
            }
        }
    }
    #[cfg(not(feature = "rest"))]
    if config.backend.is_some() {
        tracing::warn!("BACKEND_URL set but the rest feature is disabled");
    }

    tracing::warn!("No content store configured. Running with in-memory store.");
    (Arc::new(InMemoryContentStore::new()), "memory")
}
