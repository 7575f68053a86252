//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Distinguish an absent field (`None`) from an explicit null (`Some(None)`).
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Query string accepted by feed listings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedQuery {
    pub limit: Option<u64>,
    #[serde(default)]
    pub include_unpublished: bool,
    /// Show bodies of drafts and scheduled items.
    #[serde(default)]
    pub preview: bool,
}

/// Request to create a content item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateContentRequest {
    pub creator_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub content_type: String,
    #[serde(default)]
    pub content_data: serde_json::Value,
    pub tier_required: Option<String>,
    #[serde(default)]
    pub is_published: bool,
    pub scheduled_publish_at: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Partial update. Omitted fields are untouched; `null` clears nullable ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateContentRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub content_data: Option<serde_json::Value>,
    pub tier_required: Option<String>,
    pub is_published: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub scheduled_publish_at: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
}

/// Public creator information shown next to content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatorResponse {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

/// Evaluated publication state of one item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicationStatusResponse {
    pub content_id: Uuid,
    /// "draft", "scheduled" or "published".
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relative_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub absolute_label: Option<String>,
}

/// One content item as rendered in a feed or returned by authoring calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentResponse {
    pub id: Uuid,
    pub creator_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<CreatorResponse>,
    pub title: String,
    pub description: Option<String>,
    pub content_type: String,
    /// Absent when the viewer may only see the banner.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_data: Option<serde_json::Value>,
    pub tier_required: String,
    pub tags: Vec<String>,
    pub view_count: i64,
    pub like_count: i64,
    pub comment_count: i64,
    pub scheduled_publish_at: Option<String>,
    pub status: PublicationStatusResponse,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A feed page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedResponse {
    pub items: Vec<ContentResponse>,
    pub refreshed_at: Option<DateTime<Utc>>,
    /// Set when the latest refresh failed and `items` are from an earlier one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stale_reason: Option<String>,
}
