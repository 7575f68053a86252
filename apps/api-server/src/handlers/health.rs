//! Health check endpoint.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: String,
    pub store: &'static str,
    pub feed_generation: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feed_error: Option<String>,
}

/// Health check endpoint - returns server status.
///
/// GET /api/health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let snapshot = state.public_feed.view().snapshot();
    let response = HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
        store: state.store_kind,
        feed_generation: snapshot.generation,
        feed_error: snapshot.last_error,
    };

    HttpResponse::Ok().json(response)
}
