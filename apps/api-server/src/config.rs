//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use agora_core::feed::DEFAULT_FEED_LIMIT;
use agora_infra::database::DatabaseConfig;
use agora_infra::feed::{DEFAULT_FETCH_TIMEOUT, DEFAULT_REFRESH_INTERVAL};

/// Hosted backend (PostgREST) connection settings.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub url: String,
    pub api_key: String,
}

/// Feed refresh settings.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub refresh_interval: Duration,
    pub fetch_timeout: Duration,
    pub page_limit: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            page_limit: DEFAULT_FEED_LIMIT,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    pub backend: Option<BackendConfig>,
    pub feed: FeedConfig,
}

fn parsed<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| {
            let mut config = DatabaseConfig::new(url);
            if let Some(max) = parsed("DB_MAX_CONNECTIONS") {
                config.max_connections = max;
            }
            if let Some(min) = parsed("DB_MIN_CONNECTIONS") {
                config.min_connections = min;
            }
            config
        });

        let backend = env::var("BACKEND_URL").ok().map(|url| BackendConfig {
            url,
            api_key: env::var("BACKEND_API_KEY").unwrap_or_default(),
        });

        let defaults = FeedConfig::default();
        let feed = FeedConfig {
            refresh_interval: parsed("FEED_REFRESH_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.refresh_interval),
            fetch_timeout: parsed("FEED_FETCH_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.fetch_timeout),
            page_limit: parsed("FEED_PAGE_LIMIT").unwrap_or(defaults.page_limit),
        };

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parsed("PORT").unwrap_or(8080),
            database,
            backend,
            feed,
        }
    }
}
