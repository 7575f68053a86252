//! Timer-driven feed refresh owned by one view.
//!
//! Each view gets its own loop. A tick that arrives while the previous fetch is
//! still outstanding does nothing; it is not queued. Cancelling is synchronous:
//! after [`RefreshHandle::cancel`] returns, no fetch is started and any result
//! still in flight is dropped when it lands.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use agora_core::error::{FeedError, StoreError};
use agora_core::feed::FeedFilter;

use super::assembler::FeedAssembler;
use super::view::FeedView;

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60);
const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// Refresh loop state. `Cancelled` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Fetching,
    Cancelled,
}

struct LoopShared {
    state: Mutex<LoopState>,
    cancel: watch::Sender<bool>,
    kick: Notify,
    fetches_started: AtomicU64,
}

impl LoopShared {
    fn lock(&self) -> MutexGuard<'_, LoopState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Idle -> Fetching. False when busy or cancelled.
    fn begin_fetch(&self) -> bool {
        let mut state = self.lock();
        if *state != LoopState::Idle {
            return false;
        }
        *state = LoopState::Fetching;
        self.fetches_started.fetch_add(1, Ordering::Relaxed);
        true
    }

    /// Fetching -> Idle, unless cancelled meanwhile.
    fn finish_fetch(&self) {
        let mut state = self.lock();
        if *state == LoopState::Fetching {
            *state = LoopState::Idle;
        }
    }
}

/// Returns the loop to `Idle` when a fetch task ends, however it ends.
struct FetchGuard(Arc<LoopShared>);

impl Drop for FetchGuard {
    fn drop(&mut self) {
        self.0.finish_fetch();
    }
}

/// Resolves once the loop is cancelled or its handle is gone.
async fn cancelled(rx: &mut watch::Receiver<bool>) {
    let _ = rx.wait_for(|cancelled| *cancelled).await;
}

/// A feed refresh loop, ready to be spawned.
pub struct RefreshLoop {
    assembler: Arc<FeedAssembler>,
    filter: FeedFilter,
    interval: Duration,
}

impl RefreshLoop {
    pub fn new(assembler: Arc<FeedAssembler>, filter: FeedFilter) -> Self {
        Self {
            assembler,
            filter,
            interval: DEFAULT_REFRESH_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(MIN_REFRESH_INTERVAL);
        self
    }

    /// Start polling on the current tokio runtime. The first load starts immediately.
    pub fn spawn(self) -> RefreshHandle {
        let view = FeedView::new();
        let (cancel, cancel_rx) = watch::channel(false);
        let shared = Arc::new(LoopShared {
            state: Mutex::new(LoopState::Idle),
            cancel,
            kick: Notify::new(),
            fetches_started: AtomicU64::new(0),
        });

        tracing::info!(
            creator_id = ?self.filter.creator_id,
            interval_secs = self.interval.as_secs(),
            "Feed refresh loop started"
        );

        let task = tokio::spawn(self.run(view.clone(), shared.clone(), cancel_rx));

        RefreshHandle {
            view,
            shared,
            task: Some(task),
        }
    }

    async fn run(
        self,
        view: FeedView,
        shared: Arc<LoopShared>,
        mut cancel_rx: watch::Receiver<bool>,
    ) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = cancelled(&mut cancel_rx) => break,
                _ = ticker.tick() => {}
                _ = shared.kick.notified() => {}
            }

            if !shared.begin_fetch() {
                tracing::debug!("Feed refresh tick skipped, previous fetch still outstanding");
                continue;
            }

            let assembler = self.assembler.clone();
            let filter = self.filter.clone();
            let task_view = view.clone();
            let busy = FetchGuard(shared.clone());
            let mut task_cancel_rx = cancel_rx.clone();

            tokio::spawn(async move {
                let _busy = busy;
                let fetch = tokio::spawn(async move { assembler.load(&filter).await });
                let abort = fetch.abort_handle();

                let outcome = tokio::select! {
                    biased;
                    _ = cancelled(&mut task_cancel_rx) => {
                        abort.abort();
                        None
                    }
                    joined = fetch => Some(joined.unwrap_or_else(|e| {
                        Err(FeedError::FetchFailed(StoreError::Query(format!(
                            "feed fetch task failed: {e}"
                        ))))
                    })),
                };

                match outcome {
                    Some(result) => {
                        match &result {
                            Ok(entries) => {
                                tracing::debug!(count = entries.len(), "Feed refreshed")
                            }
                            Err(e) if e.is_fatal() => {
                                tracing::error!(error = %e, "Feed refresh failed")
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, "Feed refresh failed, retrying next tick")
                            }
                        }
                        if !task_view.apply(result, Utc::now()) {
                            tracing::debug!("Discarded feed result that arrived after cancellation");
                        }
                    }
                    None => tracing::debug!("Abandoned in-flight feed fetch after cancellation"),
                }
            });
        }

        tracing::info!("Feed refresh loop stopped");
    }
}

/// Owner of a running refresh loop. Dropping it cancels the loop.
pub struct RefreshHandle {
    view: FeedView,
    shared: Arc<LoopShared>,
    task: Option<JoinHandle<()>>,
}

impl RefreshHandle {
    /// The view this loop writes to.
    pub fn view(&self) -> &FeedView {
        &self.view
    }

    pub fn state(&self) -> LoopState {
        *self.shared.lock()
    }

    /// Number of fetches this loop has issued.
    pub fn fetches_started(&self) -> u64 {
        self.shared.fetches_started.load(Ordering::Relaxed)
    }

    /// Ask for an immediate refresh. Ignored while a fetch is outstanding.
    pub fn refresh_now(&self) {
        if self.state() == LoopState::Idle {
            self.shared.kick.notify_one();
        }
    }

    /// Stop the loop. No fetch starts afterwards and late results are discarded.
    pub fn cancel(&self) {
        *self.shared.lock() = LoopState::Cancelled;
        self.view.detach();
        self.shared.cancel.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.state() == LoopState::Cancelled
    }

    /// Cancel and wait for the timer task to exit.
    pub async fn shutdown(mut self) {
        self.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Feed refresh task ended abnormally");
            }
        }
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        if !self.is_cancelled() {
            self.cancel();
        }
    }
}
