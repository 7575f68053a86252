//! Domain-level error types.

use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

/// Domain errors - business rule failures.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: &'static str, id: Uuid },

    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Content store errors.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Store connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Store call timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Malformed store row: {0}")]
    Decode(String),
}

/// Raised by the publication state evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    #[error("Invalid scheduled_publish_at '{value}': {reason}")]
    InvalidTimestamp { value: String, reason: String },
}

/// Feed loading failures, as seen at the feed boundary.
#[derive(Debug, Error)]
pub enum FeedError {
    /// A single store call failed; the next poll tick retries.
    #[error("Feed fetch failed: {0}")]
    FetchFailed(#[source] StoreError),

    /// The creator-profile join failed; callers fall back to the plain query.
    #[error("Feed enrichment unavailable: {0}")]
    EnrichmentUnavailable(#[source] StoreError),

    /// Both the enriched and the plain query failed.
    #[error("Feed could not be loaded (enriched: {enriched}; plain: {plain})")]
    FatalLoadFailure {
        enriched: StoreError,
        plain: StoreError,
    },
}

impl FeedError {
    /// Whether the UI should offer a manual retry instead of waiting for the next tick.
    pub fn is_fatal(&self) -> bool {
        matches!(self, FeedError::FatalLoadFailure { .. })
    }
}
