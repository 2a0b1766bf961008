//! Collaborator contract consumed by the review session.

use std::future::Future;

use recall_core::{Quality, ReviewCard};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Failure reported by a collaborator call.
///
/// The session retries `Transient` rating submissions and surfaces
/// everything else without retrying.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ApiFailure {
    /// Connectivity or transport failure; the request may not have arrived.
    #[error("Network error: {0}")]
    Transient(String),

    /// The collaborator answered and refused the request.
    #[error("{reason}")]
    Rejected { status: Option<u16>, reason: String },
}

impl ApiFailure {
    pub fn rejected(status: Option<u16>, reason: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            reason: reason.into(),
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

/// Result of asking for due cards.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Cards(Vec<ReviewCard>),
    /// Explicit empty-success signal, distinct from a failure.
    NoneDue,
}

/// Fetch-due-cards and submit-rating collaborators.
pub trait ReviewApi: Send + Sync + 'static {
    /// Due cards for the current learner, optionally narrowed to any of `tag_ids`.
    fn fetch_due(
        &self,
        tag_ids: &[Uuid],
    ) -> impl Future<Output = Result<FetchOutcome, ApiFailure>> + Send;

    /// Persist one rating; the collaborator runs the scheduler.
    fn submit_rating(
        &self,
        card_id: Uuid,
        quality: Quality,
    ) -> impl Future<Output = Result<(), ApiFailure>> + Send;
}
