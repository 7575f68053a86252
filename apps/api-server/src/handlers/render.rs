//! Domain to DTO mapping.

use agora_core::domain::{ContentItem, CreatorProfile};
use agora_core::feed::FeedEntry;
use agora_core::lifecycle::Evaluation;
use agora_infra::FeedSnapshot;
use agora_shared::dto::{ContentResponse, CreatorResponse, FeedResponse, PublicationStatusResponse};

pub fn status(item: &ContentItem, evaluation: &Evaluation) -> PublicationStatusResponse {
    PublicationStatusResponse {
        content_id: item.id,
        state: evaluation.state.as_str().to_string(),
        relative_label: evaluation.relative_label.clone(),
        absolute_label: evaluation.absolute_label.clone(),
    }
}

fn creator(profile: CreatorProfile) -> CreatorResponse {
    CreatorResponse {
        display_name: profile.shown_name().to_string(),
        id: profile.id,
        username: profile.username,
        avatar_url: profile.avatar_url,
    }
}

/// Render an item. `content_data` is omitted unless `body_visible`.
pub fn content(
    item: ContentItem,
    profile: Option<CreatorProfile>,
    evaluation: &Evaluation,
    body_visible: bool,
) -> ContentResponse {
    let status = status(&item, evaluation);
    ContentResponse {
        id: item.id,
        creator_id: item.creator_id,
        creator: profile.map(creator),
        title: item.title,
        description: item.description,
        content_type: item.content_type.as_str().to_string(),
        content_data: body_visible.then_some(item.content_data),
        tier_required: item.tier_required.as_str().to_string(),
        tags: item.tags,
        view_count: item.view_count,
        like_count: item.like_count,
        comment_count: item.comment_count,
        scheduled_publish_at: item.scheduled_publish_at,
        status,
        created_at: item.created_at,
        updated_at: item.updated_at,
    }
}

pub fn entry(entry: FeedEntry) -> ContentResponse {
    content(entry.item, entry.creator, &entry.evaluation, entry.body_visible)
}

pub fn feed(entries: Vec<FeedEntry>, snapshot: Option<&FeedSnapshot>) -> FeedResponse {
    FeedResponse {
        items: entries.into_iter().map(entry).collect(),
        refreshed_at: snapshot.and_then(|s| s.refreshed_at),
        stale_reason: snapshot.and_then(|s| s.last_error.clone()),
    }
}
