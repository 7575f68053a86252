//! Content authoring endpoints.

use actix_web::{HttpResponse, web};
use agora_core::domain::{ContentItem, ContentPatch, ContentType, Tier, parse_timestamp};
use agora_core::error::DomainError;
use agora_core::lifecycle::{evaluate, evaluate_or_draft};
use agora_shared::ApiResponse;
use agora_shared::dto::{CreateContentRequest, UpdateContentRequest};
use chrono::Utc;
use uuid::Uuid;

use super::render;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn parse_tier(raw: &str) -> AppResult<Tier> {
    raw.parse::<Tier>()
        .map_err(|_| AppError::Validation(format!("unknown tier '{}'", raw)))
}

/// A validated update request.
struct PatchRequest(ContentPatch);

impl TryFrom<UpdateContentRequest> for PatchRequest {
    type Error = AppError;

    fn try_from(req: UpdateContentRequest) -> Result<Self, Self::Error> {
        let tier_required = req.tier_required.as_deref().map(parse_tier).transpose()?;
        if let Some(Some(at)) = &req.scheduled_publish_at {
            parse_timestamp(at)?;
        }
        Ok(PatchRequest(ContentPatch {
            title: req.title,
            description: req.description,
            content_data: req.content_data,
            tier_required,
            is_published: req.is_published,
            scheduled_publish_at: req.scheduled_publish_at,
            tags: req.tags,
        }))
    }
}

async fn load(state: &AppState, id: Uuid) -> AppResult<ContentItem> {
    state.store.find_by_id(id).await?.ok_or_else(|| {
        DomainError::NotFound {
            entity_type: "content",
            id,
        }
        .into()
    })
}

/// Create a content item, published, scheduled or as a draft.
///
/// POST /api/content
pub async fn create(
    state: web::Data<AppState>,
    body: web::Json<CreateContentRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let content_type: ContentType = req
        .content_type
        .parse()
        .map_err(|_| AppError::Validation(format!("unknown content type '{}'", req.content_type)))?;

    let tier = match req.tier_required.as_deref() {
        Some(raw) => parse_tier(raw)?,
        None => Tier::default(),
    };

    let mut item = ContentItem::new(req.creator_id, req.title, content_type, req.content_data)
        .with_tier(tier)
        .with_tags(req.tags);
    if let Some(description) = req.description {
        item = item.with_description(description);
    }
    item.is_published = req.is_published;
    item.scheduled_publish_at = req.scheduled_publish_at;
    item.validate()?;

    let saved = state.store.insert(item).await?;
    let evaluation = evaluate_or_draft(&saved, Utc::now());
    tracing::info!(
        content_id = %saved.id,
        creator_id = %saved.creator_id,
        state = evaluation.state.as_str(),
        "Content created"
    );

    Ok(HttpResponse::Created().json(ApiResponse::ok(render::content(
        saved,
        None,
        &evaluation,
        true,
    ))))
}

/// Partially update a content item.
///
/// PATCH /api/content/{id}
pub async fn update(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateContentRequest>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let PatchRequest(patch) = PatchRequest::try_from(body.into_inner())?;
    if patch.is_empty() {
        return Err(AppError::BadRequest("no fields to update".to_string()));
    }

    let mut preview = load(&state, id).await?;
    patch.apply_to(&mut preview);
    preview.validate()?;

    let saved = state.store.update(id, patch).await?;
    let evaluation = evaluate_or_draft(&saved, Utc::now());
    tracing::info!(content_id = %id, state = evaluation.state.as_str(), "Content updated");

    Ok(HttpResponse::Ok().json(ApiResponse::ok(render::content(
        saved,
        None,
        &evaluation,
        true,
    ))))
}

/// Delete a content item.
///
/// DELETE /api/content/{id}
pub async fn delete(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    state.store.delete(id).await?;
    tracing::info!(content_id = %id, "Content deleted");
    Ok(HttpResponse::NoContent().finish())
}

/// Publication state of one item, with countdown labels when scheduled.
///
/// GET /api/content/{id}/status
pub async fn status(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let item = load(&state, path.into_inner()).await?;
    let evaluation = evaluate(&item, Utc::now())?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(render::status(&item, &evaluation))))
}
