use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, EvaluationError};

/// Kind of content a creator publishes. Each kind has its own payload shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Text,
    Image,
    Video,
    Audio,
    Link,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Text => "text",
            ContentType::Image => "image",
            ContentType::Video => "video",
            ContentType::Audio => "audio",
            ContentType::Link => "link",
        }
    }

    /// The payload key that must hold a non-empty string for this kind.
    pub fn required_field(&self) -> &'static str {
        match self {
            ContentType::Text => "body",
            ContentType::Image => "image_url",
            ContentType::Video => "video_url",
            ContentType::Audio => "audio_url",
            ContentType::Link => "url",
        }
    }

    /// Check a `content_data` payload against this kind's shape.
    pub fn validate_data(&self, data: &serde_json::Value) -> Result<(), DomainError> {
        let field = self.required_field();
        match data.get(field).and_then(|v| v.as_str()) {
            Some(value) if !value.trim().is_empty() => Ok(()),
            _ => Err(DomainError::Validation(format!(
                "{} content requires a non-empty '{}' field",
                self.as_str(),
                field
            ))),
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(ContentType::Text),
            "image" => Ok(ContentType::Image),
            "video" => Ok(ContentType::Video),
            "audio" => Ok(ContentType::Audio),
            "link" => Ok(ContentType::Link),
            other => Err(DomainError::Validation(format!(
                "unknown content type '{other}'"
            ))),
        }
    }
}

/// Subscription tier needed to view an item's body. Displayed, not enforced here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Free,
    Supporter,
    Premium,
    Vip,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Supporter => "supporter",
            Tier::Premium => "premium",
            Tier::Vip => "vip",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Tier::Free),
            "supporter" => Ok(Tier::Supporter),
            "premium" => Ok(Tier::Premium),
            "vip" => Ok(Tier::Vip),
            other => Err(DomainError::Validation(format!("unknown tier '{other}'"))),
        }
    }
}

/// Content item - a post, video, track or link published by a creator.
///
/// `scheduled_publish_at` is kept exactly as the store delivered it. It is only
/// interpreted when the item is evaluated, so a malformed value degrades one
/// item instead of failing the whole listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub content_type: ContentType,
    pub content_data: serde_json::Value,
    pub tier_required: Tier,
    pub is_published: bool,
    pub scheduled_publish_at: Option<String>,
    pub view_count: i64,
    pub like_count: i64,
    pub comment_count: i64,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContentItem {
    /// Create an unpublished, unscheduled item (a draft).
    pub fn new(
        creator_id: Uuid,
        title: impl Into<String>,
        content_type: ContentType,
        content_data: serde_json::Value,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            creator_id,
            title: title.into(),
            description: None,
            content_type,
            content_data,
            tier_required: Tier::Free,
            is_published: false,
            scheduled_publish_at: None,
            view_count: 0,
            like_count: 0,
            comment_count: 0,
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tier(mut self, tier: Tier) -> Self {
        self.tier_required = tier;
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn published(mut self) -> Self {
        self.is_published = true;
        self
    }

    pub fn scheduled_for(mut self, at: DateTime<Utc>) -> Self {
        self.scheduled_publish_at = Some(at.to_rfc3339());
        self
    }

    /// Parse `scheduled_publish_at`, if any.
    pub fn scheduled_publish_time(&self) -> Result<Option<DateTime<Utc>>, EvaluationError> {
        self.scheduled_publish_at
            .as_deref()
            .map(parse_timestamp)
            .transpose()
    }

    /// Validate the fields an author controls.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.title.trim().is_empty() {
            return Err(DomainError::Validation("title must not be empty".to_string()));
        }
        self.content_type.validate_data(&self.content_data)?;
        self.scheduled_publish_time()
            .map_err(|e| DomainError::Validation(e.to_string()))?;
        Ok(())
    }
}

/// Parse a schedule timestamp as delivered by the store or an authoring form.
///
/// RFC 3339 is the normal shape. Offset-less `YYYY-MM-DDTHH:MM[:SS]` values
/// (datetime-local inputs) are read as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, EvaluationError> {
    let value = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }

    Err(EvaluationError::InvalidTimestamp {
        value: raw.to_string(),
        reason: "expected an RFC 3339 or YYYY-MM-DDTHH:MM[:SS] timestamp".to_string(),
    })
}

/// Partial update of a content item.
///
/// `description` and `scheduled_publish_at` are double options: `Some(None)`
/// clears the field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub content_data: Option<serde_json::Value>,
    pub tier_required: Option<Tier>,
    pub is_published: Option<bool>,
    pub scheduled_publish_at: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
}

impl ContentPatch {
    pub fn is_empty(&self) -> bool {
        *self == ContentPatch::default()
    }

    /// Apply the patch in place and bump `updated_at`.
    pub fn apply_to(&self, item: &mut ContentItem) {
        if let Some(title) = &self.title {
            item.title = title.clone();
        }
        if let Some(description) = &self.description {
            item.description = description.clone();
        }
        if let Some(data) = &self.content_data {
            item.content_data = data.clone();
        }
        if let Some(tier) = self.tier_required {
            item.tier_required = tier;
        }
        if let Some(published) = self.is_published {
            item.is_published = published;
        }
        if let Some(schedule) = &self.scheduled_publish_at {
            item.scheduled_publish_at = schedule.clone();
        }
        if let Some(tags) = &self.tags {
            item.tags = tags.clone();
        }
        item.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn parses_rfc3339_with_offset() {
        let ts = parse_timestamp("2025-03-01T12:00:00+02:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap());
    }

    #[test]
    fn parses_datetime_local_as_utc() {
        let ts = parse_timestamp("2025-03-01T10:30").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2025, 3, 1, 10, 30, 0).unwrap());
    }

    #[test]
    fn rejects_garbage_timestamp() {
        let err = parse_timestamp("next tuesday").unwrap_err();
        assert!(matches!(err, EvaluationError::InvalidTimestamp { ref value, .. } if value == "next tuesday"));
    }

    #[test]
    fn payload_validation_follows_content_type() {
        assert!(ContentType::Video.validate_data(&json!({"video_url": "https://v"})).is_ok());
        assert!(ContentType::Video.validate_data(&json!({"body": "text"})).is_err());
        assert!(ContentType::Text.validate_data(&json!({"body": "  "})).is_err());
    }

    #[test]
    fn validate_rejects_bad_schedule() {
        let mut item = ContentItem::new(Uuid::new_v4(), "Post", ContentType::Text, json!({"body": "hi"}));
        item.scheduled_publish_at = Some("soon".to_string());
        assert!(matches!(item.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn patch_clears_schedule_and_publishes() {
        let mut item = ContentItem::new(Uuid::new_v4(), "Post", ContentType::Text, json!({"body": "hi"}))
            .scheduled_for(Utc::now());
        let before = item.updated_at;

        let patch = ContentPatch {
            is_published: Some(true),
            scheduled_publish_at: Some(None),
            ..Default::default()
        };
        patch.apply_to(&mut item);

        assert!(item.is_published);
        assert!(item.scheduled_publish_at.is_none());
        assert!(item.updated_at >= before);
    }

    #[test]
    fn tier_round_trips_through_str() {
        for tier in [Tier::Free, Tier::Supporter, Tier::Premium, Tier::Vip] {
            assert_eq!(tier.as_str().parse::<Tier>().unwrap(), tier);
        }
    }
}
