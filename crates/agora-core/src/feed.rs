//! Feed filters and the visibility policy applied after every fetch.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{ContentItem, CreatorProfile, EnrichedContent};
use crate::lifecycle::{Evaluation, evaluate_or_draft};

pub const DEFAULT_FEED_LIMIT: u64 = 20;
pub const MAX_FEED_LIMIT: u64 = 100;

/// Which items a feed asks for and how they may be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedFilter {
    /// Restrict to one creator; `None` is the global published feed.
    pub creator_id: Option<Uuid>,
    pub limit: u64,
    /// Keep drafts and scheduled items (creator dashboard).
    pub include_unpublished: bool,
    /// Expose bodies of non-published items too.
    pub preview_unpublished: bool,
}

impl Default for FeedFilter {
    fn default() -> Self {
        Self {
            creator_id: None,
            limit: DEFAULT_FEED_LIMIT,
            include_unpublished: false,
            preview_unpublished: false,
        }
    }
}

impl FeedFilter {
    pub fn global() -> Self {
        Self::default()
    }

    pub fn creator(creator_id: Uuid) -> Self {
        Self {
            creator_id: Some(creator_id),
            ..Self::default()
        }
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    pub fn including_unpublished(mut self) -> Self {
        self.include_unpublished = true;
        self
    }

    pub fn with_preview(mut self) -> Self {
        self.preview_unpublished = true;
        self
    }

    /// The limit actually sent to the store.
    pub fn effective_limit(&self) -> u64 {
        self.limit.clamp(1, MAX_FEED_LIMIT)
    }
}

/// One item as handed to presentation.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    pub item: ContentItem,
    pub creator: Option<CreatorProfile>,
    pub evaluation: Evaluation,
    /// When false, show a draft/scheduled banner instead of the body.
    pub body_visible: bool,
}

impl FeedEntry {
    /// The payload to render, if the viewer may see it.
    pub fn body(&self) -> Option<&serde_json::Value> {
        self.body_visible.then_some(&self.item.content_data)
    }
}

/// Evaluate each fetched row and keep only what this viewer may list.
///
/// Order is preserved. Without `include_unpublished`, anything not currently
/// published is dropped, including items whose schedule elapsed before the
/// store flipped their flag.
pub fn apply_visibility(
    rows: Vec<EnrichedContent>,
    filter: &FeedFilter,
    now: DateTime<Utc>,
) -> Vec<FeedEntry> {
    rows.into_iter()
        .filter_map(|row| {
            let evaluation = evaluate_or_draft(&row.item, now);
            if !filter.include_unpublished && !evaluation.is_published() {
                return None;
            }
            let body_visible = evaluation.is_published() || filter.preview_unpublished;
            Some(FeedEntry {
                item: row.item,
                creator: row.creator,
                evaluation,
                body_visible,
            })
        })
        .collect()
}
