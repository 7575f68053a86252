//! The client-local copy of a feed that a refresh loop keeps current.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use agora_core::error::FeedError;
use agora_core::feed::FeedEntry;

/// What a consumer of the view renders.
#[derive(Debug, Clone, Default)]
pub struct FeedSnapshot {
    pub entries: Vec<FeedEntry>,
    /// Message of the most recent failed refresh; cleared by the next success.
    pub last_error: Option<String>,
    /// The most recent failure needs a manual retry control.
    pub last_error_fatal: bool,
    pub refreshed_at: Option<DateTime<Utc>>,
    /// Number of refresh results applied so far.
    pub generation: u64,
}

struct ViewState {
    snapshot: FeedSnapshot,
    detached: bool,
}

/// Shared handle to one feed view.
///
/// Results are applied under the same lock that detaching takes, so once
/// [`FeedView::detach`] returns no late result can change the snapshot.
#[derive(Clone)]
pub struct FeedView {
    state: Arc<Mutex<ViewState>>,
}

impl Default for FeedView {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedView {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ViewState {
                snapshot: FeedSnapshot::default(),
                detached: false,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        self.lock().snapshot.clone()
    }

    pub fn is_detached(&self) -> bool {
        self.lock().detached
    }

    /// Stop accepting results. Irreversible.
    pub fn detach(&self) {
        self.lock().detached = true;
    }

    /// Record a refresh outcome. Returns false when the view was already detached
    /// and the outcome was discarded.
    ///
    /// A failure keeps the previously loaded entries.
    pub fn apply(&self, outcome: Result<Vec<FeedEntry>, FeedError>, at: DateTime<Utc>) -> bool {
        let mut state = self.lock();
        if state.detached {
            return false;
        }

        let snapshot = &mut state.snapshot;
        match outcome {
            Ok(entries) => {
                snapshot.entries = entries;
                snapshot.last_error = None;
                snapshot.last_error_fatal = false;
                snapshot.refreshed_at = Some(at);
            }
            Err(e) => {
                snapshot.last_error_fatal = e.is_fatal();
                snapshot.last_error = Some(e.to_string());
            }
        }
        snapshot.generation += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_core::error::StoreError;

    #[test]
    fn failure_keeps_entries_and_success_clears_error() {
        let view = FeedView::new();
        assert!(view.apply(Ok(Vec::new()), Utc::now()));

        let fatal = FeedError::FatalLoadFailure {
            enriched: StoreError::Query("join failed".into()),
            plain: StoreError::Connection("refused".into()),
        };
        assert!(view.apply(Err(fatal), Utc::now()));
        let snap = view.snapshot();
        assert!(snap.last_error_fatal);
        assert!(snap.refreshed_at.is_some());
        assert_eq!(snap.generation, 2);

        assert!(view.apply(Ok(Vec::new()), Utc::now()));
        let snap = view.snapshot();
        assert!(snap.last_error.is_none());
        assert!(!snap.last_error_fatal);
    }

    #[test]
    fn detached_view_discards_results() {
        let view = FeedView::new();
        view.detach();

        assert!(!view.apply(Ok(Vec::new()), Utc::now()));
        assert_eq!(view.snapshot().generation, 0);
        assert!(view.snapshot().refreshed_at.is_none());
    }
}
