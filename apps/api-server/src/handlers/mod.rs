//! HTTP handlers and route configuration.

mod content;
mod feed;
mod health;
mod render;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            // Feeds
            .route("/feed", web::get().to(feed::public_feed))
            .route("/feed/refresh", web::post().to(feed::refresh_feed))
            .route(
                "/creators/{creator_id}/content",
                web::get().to(feed::creator_feed),
            )
            // Authoring
            .service(
                web::scope("/content")
                    .route("", web::post().to(content::create))
                    .route("/{id}", web::patch().to(content::update))
                    .route("/{id}", web::delete().to(content::delete))
                    .route("/{id}/status", web::get().to(content::status)),
            ),
    );
}
