use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ContentItem;

/// Public profile of a creator, joined onto content for feed display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatorProfile {
    pub id: Uuid,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl CreatorProfile {
    pub fn new(id: Uuid, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            display_name: None,
            avatar_url: None,
        }
    }

    /// Name shown next to content: display name when set, otherwise the username.
    pub fn shown_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }
}

/// A content row together with its creator's profile, when the join succeeded.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedContent {
    pub item: ContentItem,
    pub creator: Option<CreatorProfile>,
}

impl From<ContentItem> for EnrichedContent {
    fn from(item: ContentItem) -> Self {
        Self {
            item,
            creator: None,
        }
    }
}
