#![cfg(feature = "rest")]

use std::sync::Arc;

use agora_core::domain::{ContentPatch, ContentType};
use agora_core::error::StoreError;
use agora_core::feed::FeedFilter;
use agora_core::ports::ContentStore;
use agora_infra::{FeedAssembler, PostgrestConfig, PostgrestContentStore};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn row(creator_id: Uuid, title: &str, published: bool) -> serde_json::Value {
    json!({
        "id": Uuid::new_v4(),
        "creator_id": creator_id,
        "title": title,
        "description": "episode notes",
        "content_type": "audio",
        "content_data": {"audio_url": "https://cdn.example/ep.mp3"},
        "tier_required": "supporter",
        "is_published": published,
        "scheduled_publish_at": null,
        "view_count": 40,
        "like_count": 7,
        "comment_count": 2,
        "tags": ["podcast"],
        "created_at": "2025-02-01T09:00:00.123456+00:00",
        "updated_at": "2025-02-01T09:00:00.123456+00:00"
    })
}

fn store_for(server: &MockServer) -> PostgrestContentStore {
    PostgrestContentStore::new(PostgrestConfig::new(server.uri(), "anon-key")).unwrap()
}

#[tokio::test]
async fn enriched_listing_sends_embed_select_and_keys() {
    let server = MockServer::start().await;
    let creator = Uuid::new_v4();
    let mut body = row(creator, "Ep. 12", true);
    body["profiles"] = json!({
        "id": creator,
        "username": "radio_ru",
        "display_name": null,
        "avatar_url": null
    });

    Mock::given(method("GET"))
        .and(path("/rest/v1/content"))
        .and(query_param("select", "*,profiles(*)"))
        .and(query_param("is_published", "eq.true"))
        .and(query_param("order", "created_at.desc"))
        .and(query_param("limit", "20"))
        .and(header("apikey", "anon-key"))
        .and(header("authorization", "Bearer anon-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([body])))
        .expect(1)
        .mount(&server)
        .await;

    let rows = store_for(&server)
        .list_published_global_enriched(20)
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].item.content_type, ContentType::Audio);
    assert_eq!(rows[0].creator.as_ref().unwrap().shown_name(), "radio_ru");
    server.verify().await;
}

#[tokio::test]
async fn feed_falls_back_when_embed_is_rejected() {
    let server = MockServer::start().await;
    let creator = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/content"))
        .and(query_param("select", "*,profiles(*)"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": "PGRST200",
            "message": "Could not find a relationship between 'content' and 'profiles'"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/content"))
        .and(query_param("select", "*"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row(creator, "Ep. 13", true)])))
        .expect(1)
        .mount(&server)
        .await;

    let assembler = FeedAssembler::new(Arc::new(store_for(&server)));
    let entries = assembler.load(&FeedFilter::global()).await.unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].item.title, "Ep. 13");
    assert!(entries[0].creator.is_none());
    server.verify().await;
}

#[tokio::test]
async fn unparsable_schedule_passes_through_the_store() {
    let server = MockServer::start().await;
    let creator = Uuid::new_v4();
    let mut body = row(creator, "Teaser", false);
    body["scheduled_publish_at"] = json!("sometime next week");

    Mock::given(method("GET"))
        .and(path("/rest/v1/content"))
        .and(query_param("creator_id", format!("eq.{creator}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([body])))
        .mount(&server)
        .await;

    let assembler = FeedAssembler::new(Arc::new(store_for(&server)));
    let entries = assembler
        .load(&FeedFilter::creator(creator).including_unpublished())
        .await
        .unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].evaluation.state.as_str(), "draft");
}

#[tokio::test]
async fn public_profile_asks_backend_for_published_rows_only() {
    let server = MockServer::start().await;
    let creator = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/content"))
        .and(query_param("creator_id", format!("eq.{creator}")))
        .and(query_param("is_published", "eq.true"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row(creator, "Ep. 1", true)])))
        .expect(1)
        .mount(&server)
        .await;

    let assembler = FeedAssembler::new(Arc::new(store_for(&server)));
    let entries = assembler
        .load(&FeedFilter::creator(creator).with_limit(2))
        .await
        .unwrap();

    assert_eq!(entries.len(), 1);
    server.verify().await;
}

#[tokio::test]
async fn update_of_missing_row_is_not_found() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/content"))
        .and(query_param("id", format!("eq.{id}")))
        .and(header("prefer", "return=representation"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let patch = ContentPatch {
        title: Some("renamed".into()),
        ..Default::default()
    };
    let err = store_for(&server).update(id, patch).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound));
}

#[tokio::test]
async fn server_error_is_a_query_error_with_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = store_for(&server).list_published_global(5).await.unwrap_err();
    match err {
        StoreError::Query(msg) => assert!(msg.contains("503") && msg.contains("maintenance")),
        other => panic!("unexpected error: {other:?}"),
    }
}
