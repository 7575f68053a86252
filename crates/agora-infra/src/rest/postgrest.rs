//! Content store over the hosted backend's PostgREST API.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use uuid::Uuid;

use agora_core::domain::{
    ContentItem, ContentPatch, ContentType, CreatorProfile, EnrichedContent, Tier,
};
use agora_core::error::StoreError;
use agora_core::ports::ContentStore;

const ENRICHED_SELECT: &str = "*,profiles(*)";
const PLAIN_SELECT: &str = "*";

/// Connection settings for the hosted REST backend.
#[derive(Debug, Clone)]
pub struct PostgrestConfig {
    /// Project URL, without the `/rest/v1` suffix.
    pub base_url: String,
    /// Anonymous or service key, sent as `apikey` and bearer token.
    pub api_key: String,
    pub request_timeout: Duration,
}

impl PostgrestConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            request_timeout: Duration::from_secs(15),
        }
    }
}

/// `content` row as PostgREST returns it, optionally with the embedded profile.
#[derive(Debug, Deserialize)]
struct ContentRow {
    id: Uuid,
    creator_id: Uuid,
    title: String,
    description: Option<String>,
    content_type: String,
    #[serde(default)]
    content_data: Value,
    tier_required: Option<String>,
    #[serde(default)]
    is_published: bool,
    scheduled_publish_at: Option<String>,
    #[serde(default)]
    view_count: i64,
    #[serde(default)]
    like_count: i64,
    #[serde(default)]
    comment_count: i64,
    tags: Option<Vec<String>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    profiles: Option<ProfileRow>,
}

#[derive(Debug, Deserialize)]
struct ProfileRow {
    id: Uuid,
    username: String,
    display_name: Option<String>,
    avatar_url: Option<String>,
}

impl ContentRow {
    fn into_enriched(self) -> Result<EnrichedContent, StoreError> {
        let id = self.id;
        let decode =
            move |e: agora_core::DomainError| StoreError::Decode(format!("content {id}: {e}"));
        let content_type: ContentType = self.content_type.parse().map_err(decode)?;
        let tier_required: Tier = match self.tier_required.as_deref() {
            Some(tier) => tier.parse().map_err(decode)?,
            None => Default::default(),
        };

        let item = ContentItem {
            id: self.id,
            creator_id: self.creator_id,
            title: self.title,
            description: self.description,
            content_type,
            content_data: self.content_data,
            tier_required,
            is_published: self.is_published,
            scheduled_publish_at: self.scheduled_publish_at,
            view_count: self.view_count,
            like_count: self.like_count,
            comment_count: self.comment_count,
            tags: self.tags.unwrap_or_default(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        };
        let creator = self.profiles.map(|p| CreatorProfile {
            id: p.id,
            username: p.username,
            display_name: p.display_name,
            avatar_url: p.avatar_url,
        });

        Ok(EnrichedContent { item, creator })
    }

    fn into_item(self) -> Result<ContentItem, StoreError> {
        self.into_enriched().map(|row| row.item)
    }
}

/// PostgREST request body for a partial update. Only the patched columns are sent.
fn patch_body(patch: &ContentPatch) -> Value {
    let mut body = Map::new();
    if let Some(title) = &patch.title {
        body.insert("title".into(), json!(title));
    }
    if let Some(description) = &patch.description {
        body.insert("description".into(), json!(description));
    }
    if let Some(data) = &patch.content_data {
        body.insert("content_data".into(), data.clone());
    }
    if let Some(tier) = patch.tier_required {
        body.insert("tier_required".into(), json!(tier));
    }
    if let Some(published) = patch.is_published {
        body.insert("is_published".into(), json!(published));
    }
    if let Some(schedule) = &patch.scheduled_publish_at {
        body.insert("scheduled_publish_at".into(), json!(schedule));
    }
    if let Some(tags) = &patch.tags {
        body.insert("tags".into(), json!(tags));
    }
    body.insert("updated_at".into(), json!(Utc::now()));
    Value::Object(body)
}

/// Content store talking to `<base_url>/rest/v1/content`.
pub struct PostgrestContentStore {
    client: Client,
    config: PostgrestConfig,
}

impl PostgrestContentStore {
    pub fn new(config: PostgrestConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| StoreError::Connection(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/content", self.config.base_url.trim_end_matches('/'))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        let response = self.authorized(request).send().await.map_err(|e| {
            if e.is_timeout() {
                StoreError::Timeout(self.config.request_timeout)
            } else if e.is_connect() {
                StoreError::Connection(e.to_string())
            } else {
                StoreError::Query(e.to_string())
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!(status = %status, error = %e, "Could not read error body");
                String::new()
            }
        };
        tracing::debug!(status = %status, body = %body, "Content backend returned an error");
        Err(match status {
            StatusCode::CONFLICT => StoreError::Constraint(body),
            StatusCode::NOT_FOUND => StoreError::NotFound,
            _ => StoreError::Query(format!("{status}: {body}")),
        })
    }

    async fn fetch_rows(&self, query: &[(&str, String)]) -> Result<Vec<ContentRow>, StoreError> {
        let response = self.send(self.client.get(self.table_url()).query(query)).await?;
        response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }

    /// Run a write that returns the affected rows and keep the first one.
    async fn write_returning(&self, request: RequestBuilder) -> Result<ContentItem, StoreError> {
        let response = self
            .send(request.header("Prefer", "return=representation"))
            .await?;
        let rows: Vec<ContentRow> = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        rows.into_iter()
            .next()
            .ok_or(StoreError::NotFound)?
            .into_item()
    }

    fn published_query(select: &str, limit: u64) -> Vec<(&'static str, String)> {
        vec![
            ("select", select.to_string()),
            ("is_published", "eq.true".to_string()),
            ("order", "created_at.desc".to_string()),
            ("limit", limit.to_string()),
        ]
    }
}

#[async_trait]
impl ContentStore for PostgrestContentStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ContentItem>, StoreError> {
        let rows = self
            .fetch_rows(&[("select", PLAIN_SELECT.to_string()), ("id", format!("eq.{id}"))])
            .await?;
        rows.into_iter().next().map(ContentRow::into_item).transpose()
    }

    async fn list_by_creator(
        &self,
        creator_id: Uuid,
        limit: u64,
    ) -> Result<Vec<ContentItem>, StoreError> {
        let rows = self
            .fetch_rows(&[
                ("select", PLAIN_SELECT.to_string()),
                ("creator_id", format!("eq.{creator_id}")),
                ("order", "created_at.desc".to_string()),
                ("limit", limit.to_string()),
            ])
            .await?;
        rows.into_iter().map(ContentRow::into_item).collect()
    }

    async fn list_published_by_creator(
        &self,
        creator_id: Uuid,
        limit: u64,
    ) -> Result<Vec<ContentItem>, StoreError> {
        let mut query = Self::published_query(PLAIN_SELECT, limit);
        query.push(("creator_id", format!("eq.{creator_id}")));
        let rows = self.fetch_rows(&query).await?;
        rows.into_iter().map(ContentRow::into_item).collect()
    }

    async fn list_published_global(&self, limit: u64) -> Result<Vec<ContentItem>, StoreError> {
        let rows = self
            .fetch_rows(&Self::published_query(PLAIN_SELECT, limit))
            .await?;
        rows.into_iter().map(ContentRow::into_item).collect()
    }

    async fn list_published_global_enriched(
        &self,
        limit: u64,
    ) -> Result<Vec<EnrichedContent>, StoreError> {
        let rows = self
            .fetch_rows(&Self::published_query(ENRICHED_SELECT, limit))
            .await?;
        rows.into_iter().map(ContentRow::into_enriched).collect()
    }

    async fn insert(&self, item: ContentItem) -> Result<ContentItem, StoreError> {
        self.write_returning(self.client.post(self.table_url()).json(&item))
            .await
    }

    async fn update(&self, id: Uuid, patch: ContentPatch) -> Result<ContentItem, StoreError> {
        self.write_returning(
            self.client
                .patch(self.table_url())
                .query(&[("id", format!("eq.{id}"))])
                .json(&patch_body(&patch)),
        )
        .await
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.write_returning(
            self.client
                .delete(self.table_url())
                .query(&[("id", format!("eq.{id}"))]),
        )
        .await
        .map(|_| ())
    }
}
