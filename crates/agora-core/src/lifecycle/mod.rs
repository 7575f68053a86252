//! Publication state evaluation.
//!
//! Decides, for one content item at one instant, whether it is a draft, a
//! scheduled item waiting for its publish time, or published. Pure and cheap:
//! it runs for every row of every listing.

mod labels;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ContentItem;
use crate::error::EvaluationError;

pub use labels::{absolute_label, relative_label};

/// Lifecycle state of a content item at an evaluation instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublicationState {
    Draft,
    Scheduled,
    Published,
}

impl PublicationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PublicationState::Draft => "draft",
            PublicationState::Scheduled => "scheduled",
            PublicationState::Published => "published",
        }
    }
}

/// Result of evaluating one item. Labels are only present for scheduled items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub state: PublicationState,
    pub relative_label: Option<String>,
    pub absolute_label: Option<String>,
}

impl Evaluation {
    pub fn draft() -> Self {
        Self {
            state: PublicationState::Draft,
            relative_label: None,
            absolute_label: None,
        }
    }

    pub fn published() -> Self {
        Self {
            state: PublicationState::Published,
            relative_label: None,
            absolute_label: None,
        }
    }

    pub fn is_published(&self) -> bool {
        self.state == PublicationState::Published
    }
}

/// Evaluate an item's publication state at `now`.
///
/// The published flag wins over any schedule. An unpublished item whose
/// schedule has already elapsed stays a draft until the store flips the flag;
/// it is not reported as published early.
pub fn evaluate(item: &ContentItem, now: DateTime<Utc>) -> Result<Evaluation, EvaluationError> {
    if item.is_published {
        return Ok(Evaluation::published());
    }

    match item.scheduled_publish_time()? {
        Some(at) if at > now => Ok(Evaluation {
            state: PublicationState::Scheduled,
            relative_label: Some(relative_label(at - now)),
            absolute_label: Some(absolute_label(at)),
        }),
        _ => Ok(Evaluation::draft()),
    }
}

/// Render-path form of [`evaluate`]: a malformed schedule degrades to draft.
pub fn evaluate_or_draft(item: &ContentItem, now: DateTime<Utc>) -> Evaluation {
    evaluate(item, now).unwrap_or_else(|e| {
        tracing::warn!(content_id = %item.id, error = %e, "Treating content with bad schedule as draft");
        Evaluation::draft()
    })
}
