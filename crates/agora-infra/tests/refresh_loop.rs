mod support;

use std::sync::Arc;
use std::time::Duration;

use agora_core::domain::ContentPatch;
use agora_core::feed::FeedFilter;
use agora_core::ports::ContentStore;
use agora_infra::{FeedAssembler, LoopState, RefreshLoop};
use tokio::time::sleep;

use support::{ScriptedStore, seed_creator, text_post};

const INTERVAL: Duration = Duration::from_secs(60);

fn assembler(store: &Arc<ScriptedStore>) -> Arc<FeedAssembler> {
    Arc::new(FeedAssembler::new(store.clone()).with_fetch_timeout(Duration::from_secs(600)))
}

#[tokio::test(start_paused = true)]
async fn first_load_happens_immediately() {
    let store = Arc::new(ScriptedStore::default());
    let creator = seed_creator(&store, "kai").await;
    store.insert(text_post(creator, "hello").published()).await.unwrap();

    let handle = RefreshLoop::new(assembler(&store), FeedFilter::global())
        .with_interval(INTERVAL)
        .spawn();
    sleep(Duration::from_secs(1)).await;

    let snapshot = handle.view().snapshot();
    assert_eq!(snapshot.generation, 1);
    assert_eq!(snapshot.entries.len(), 1);
    assert_eq!(handle.state(), LoopState::Idle);
}

#[tokio::test(start_paused = true)]
async fn newly_published_item_appears_on_next_tick() {
    let store = Arc::new(ScriptedStore::default());
    let creator = seed_creator(&store, "kai").await;
    let pending = store.insert(text_post(creator, "premiere")).await.unwrap();

    let handle = RefreshLoop::new(assembler(&store), FeedFilter::global())
        .with_interval(INTERVAL)
        .spawn();
    sleep(Duration::from_secs(1)).await;
    assert!(handle.view().snapshot().entries.is_empty());

    // The store flips the flag once the scheduled time passes.
    let patch = ContentPatch {
        is_published: Some(true),
        ..Default::default()
    };
    store.update(pending.id, patch).await.unwrap();

    sleep(INTERVAL).await;
    let snapshot = handle.view().snapshot();
    assert_eq!(snapshot.entries.len(), 1);
    assert_eq!(snapshot.entries[0].item.title, "premiere");
}

#[tokio::test(start_paused = true)]
async fn ticks_during_a_slow_fetch_are_skipped() {
    let store = Arc::new(ScriptedStore::with_delay(Duration::from_secs(150)));

    let handle = RefreshLoop::new(assembler(&store), FeedFilter::global())
        .with_interval(INTERVAL)
        .spawn();

    // Ticks at 60s and 120s land while the first fetch is still running.
    sleep(Duration::from_secs(130)).await;
    assert_eq!(store.fetches(), 1);
    assert_eq!(handle.fetches_started(), 1);
    assert_eq!(handle.state(), LoopState::Fetching);

    // First fetch resolves at 150s; the 180s tick starts the second one.
    sleep(Duration::from_secs(70)).await;
    assert_eq!(handle.view().snapshot().generation, 1);
    assert_eq!(store.fetches(), 2);
}

#[tokio::test(start_paused = true)]
async fn cancelled_loop_ignores_in_flight_result_and_stops_fetching() {
    let store = Arc::new(ScriptedStore::with_delay(Duration::from_secs(10)));
    let creator = seed_creator(&store, "kai").await;
    store.insert(text_post(creator, "late").published()).await.unwrap();

    let handle = RefreshLoop::new(assembler(&store), FeedFilter::global())
        .with_interval(INTERVAL)
        .spawn();
    sleep(Duration::from_secs(1)).await;
    assert_eq!(handle.state(), LoopState::Fetching);

    handle.cancel();
    assert_eq!(handle.state(), LoopState::Cancelled);

    sleep(Duration::from_secs(300)).await;
    let snapshot = handle.view().snapshot();
    assert!(snapshot.entries.is_empty());
    assert_eq!(snapshot.generation, 0);
    assert_eq!(store.fetches(), 1);
    assert_eq!(handle.state(), LoopState::Cancelled);
}

#[tokio::test(start_paused = true)]
async fn refresh_now_runs_an_out_of_band_fetch() {
    let store = Arc::new(ScriptedStore::default());
    let handle = RefreshLoop::new(assembler(&store), FeedFilter::global())
        .with_interval(INTERVAL)
        .spawn();
    sleep(Duration::from_secs(1)).await;
    assert_eq!(handle.fetches_started(), 1);

    handle.refresh_now();
    sleep(Duration::from_secs(1)).await;
    assert_eq!(handle.fetches_started(), 2);
    assert_eq!(handle.view().snapshot().generation, 2);
}

#[tokio::test(start_paused = true)]
async fn fatal_failure_keeps_previous_entries_until_recovery() {
    let store = Arc::new(ScriptedStore::default());
    let creator = seed_creator(&store, "kai").await;
    store.insert(text_post(creator, "steady").published()).await.unwrap();

    let handle = RefreshLoop::new(assembler(&store), FeedFilter::global())
        .with_interval(INTERVAL)
        .spawn();
    sleep(Duration::from_secs(1)).await;

    ScriptedStore::fail(&store.fail_enriched, true);
    ScriptedStore::fail(&store.fail_plain, true);
    sleep(INTERVAL).await;

    let snapshot = handle.view().snapshot();
    assert!(snapshot.last_error_fatal);
    assert_eq!(snapshot.entries.len(), 1);

    ScriptedStore::fail(&store.fail_enriched, false);
    ScriptedStore::fail(&store.fail_plain, false);
    handle.refresh_now();
    sleep(Duration::from_secs(1)).await;

    let snapshot = handle.view().snapshot();
    assert!(snapshot.last_error.is_none());
    assert_eq!(snapshot.entries.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_handle_stops_the_loop() {
    let store = Arc::new(ScriptedStore::default());
    let handle = RefreshLoop::new(assembler(&store), FeedFilter::global())
        .with_interval(INTERVAL)
        .spawn();
    sleep(Duration::from_secs(1)).await;
    let view = handle.view().clone();
    drop(handle);

    sleep(INTERVAL * 5).await;
    assert_eq!(store.fetches(), 1);
    assert!(view.is_detached());
}

#[tokio::test(start_paused = true)]
async fn panicking_store_does_not_wedge_the_loop() {
    let store = Arc::new(ScriptedStore::default());
    let creator = seed_creator(&store, "kai").await;
    store.insert(text_post(creator, "survivor").published()).await.unwrap();
    ScriptedStore::fail(&store.panic_enriched_once, true);

    let handle = RefreshLoop::new(assembler(&store), FeedFilter::global())
        .with_interval(INTERVAL)
        .spawn();
    sleep(Duration::from_secs(1)).await;

    assert_eq!(handle.state(), LoopState::Idle);
    let snapshot = handle.view().snapshot();
    assert_eq!(snapshot.generation, 1);
    assert!(snapshot.last_error.is_some());
    assert!(!snapshot.last_error_fatal);

    sleep(INTERVAL).await;
    assert_eq!(handle.fetches_started(), 2);
    let snapshot = handle.view().snapshot();
    assert!(snapshot.last_error.is_none());
    assert_eq!(snapshot.entries.len(), 1);
}
