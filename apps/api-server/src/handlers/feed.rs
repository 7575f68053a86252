//! Feed endpoints.

use actix_web::{HttpResponse, web};
use agora_core::feed::FeedFilter;
use agora_shared::ApiResponse;
use agora_shared::dto::FeedQuery;
use uuid::Uuid;

use super::render;
use crate::middleware::error::{AppError, AppResult, FEED_RETRY_PATH};
use crate::state::AppState;

fn filter_for(query: &FeedQuery, base: FeedFilter, default_limit: u64) -> FeedFilter {
    let mut filter = base.with_limit(query.limit.unwrap_or(default_limit));
    if query.include_unpublished {
        filter = filter.including_unpublished();
    }
    if query.preview {
        filter = filter.with_preview();
    }
    filter
}

/// Public feed, served from the server's refresh loop.
///
/// Only `limit` is honoured. The global feed lists published rows only, so
/// `include_unpublished` and `preview` are ignored on this route.
///
/// GET /api/feed
pub async fn public_feed(
    state: web::Data<AppState>,
    query: web::Query<FeedQuery>,
) -> AppResult<HttpResponse> {
    let snapshot = state.public_feed.view().snapshot();
    let limit = query.limit.unwrap_or(state.feed.page_limit);

    // Cold start, or a page larger than the loop keeps: load directly.
    if snapshot.generation == 0 || limit > state.feed.page_limit {
        let filter = FeedFilter::global().with_limit(limit);
        let entries = state.assembler.load(&filter).await?;
        return Ok(HttpResponse::Ok().json(ApiResponse::ok(render::feed(entries, None))));
    }

    if snapshot.last_error_fatal && snapshot.entries.is_empty() {
        return Err(AppError::Unavailable {
            detail: snapshot
                .last_error
                .unwrap_or_else(|| "Feed could not be loaded".to_string()),
            retry: Some(FEED_RETRY_PATH.to_string()),
        });
    }

    let mut entries = snapshot.entries.clone();
    entries.truncate(limit.max(1) as usize);
    Ok(HttpResponse::Ok().json(ApiResponse::ok(render::feed(entries, Some(&snapshot)))))
}

/// Ask the public feed loop for an immediate refresh.
///
/// POST /api/feed/refresh
pub async fn refresh_feed(state: web::Data<AppState>) -> HttpResponse {
    state.public_feed.refresh_now();
    tracing::debug!("Manual feed refresh requested");
    HttpResponse::Accepted().json(ApiResponse::ok_with_message(
        state.public_feed.fetches_started(),
        "Refresh requested",
    ))
}

/// One creator's content. `include_unpublished` gives the dashboard view.
///
/// GET /api/creators/{creator_id}/content
pub async fn creator_feed(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<FeedQuery>,
) -> AppResult<HttpResponse> {
    let creator_id = path.into_inner();
    let filter = filter_for(
        &query,
        FeedFilter::creator(creator_id),
        state.feed.page_limit,
    );

    let entries = state.assembler.load(&filter).await?;
    tracing::debug!(%creator_id, count = entries.len(), "Creator feed loaded");

    Ok(HttpResponse::Ok().json(ApiResponse::ok(render::feed(entries, None))))
}
