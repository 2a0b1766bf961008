//! Review session orchestrator.
//!
//! Drives `ReviewSessionState` around the fetch and submit collaborators.
//! Ratings lost to transient failures are resubmitted in the background
//! after the policy delay, keeping the learner on the same card until the
//! rating lands. Starting a new session abandons the old one, including any
//! retry or submission still in flight.

use std::sync::Arc;
use std::time::Duration;

use recall_core::Quality;
use tokio::sync::{mpsc, watch, Mutex};
use uuid::Uuid;

use crate::api::{ApiFailure, FetchOutcome, ReviewApi};
use crate::error::SessionError;
use crate::retry::{PendingRetry, RetryPolicy};
use crate::state::{IgnoreReason, RatingProgress, ReviewSessionState, Side};
use crate::summary::SessionSummary;

/// User-facing message emitted by the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Info(String),
    Error(String),
    /// A rating failed to reach the server and will be sent again.
    Retrying { card_id: Uuid, delay: Duration },
}

/// Result of `start_session`.
#[derive(Debug, Clone, PartialEq)]
pub enum StartOutcome {
    Started { count: usize },
    NoneDue,
    Failed(ApiFailure),
    Ignored(IgnoreReason),
}

/// Result of `rate`.
#[derive(Debug, Clone, PartialEq)]
pub enum RateOutcome {
    /// Rating stored; the next card is showing.
    Advanced,
    /// Rating stored for the last card.
    Completed(SessionSummary),
    /// Rating not stored yet; it will be resubmitted after `delay`.
    RetryScheduled { delay: Duration },
    Rejected(ApiFailure),
    Ignored(IgnoreReason),
    /// A new session started while the rating was in flight.
    Abandoned,
}

struct SessionCore {
    state: ReviewSessionState,
    /// Bumped on every session start; results from older generations are dropped.
    generation: u64,
    pending_retry: Option<PendingRetry>,
    next_retry_id: u64,
}

impl SessionCore {
    fn cancel_retry(&mut self) {
        if let Some(retry) = self.pending_retry.take() {
            retry.cancel();
        }
    }

    fn owns_retry(&self, generation: u64, retry_id: u64) -> bool {
        self.generation == generation
            && self
                .pending_retry
                .as_ref()
                .is_some_and(|retry| retry.id == retry_id)
    }
}

/// How a submission result was folded into the state.
enum Settled {
    Advanced,
    Completed(SessionSummary),
    Transient,
    Rejected(ApiFailure),
}

struct Inner<A> {
    api: A,
    policy: RetryPolicy,
    core: Mutex<SessionCore>,
    notices: mpsc::UnboundedSender<Notice>,
    state_tx: watch::Sender<ReviewSessionState>,
}

impl<A: ReviewApi> Inner<A> {
    fn publish(&self, state: &ReviewSessionState) {
        self.state_tx.send_replace(state.clone());
    }

    fn notify(&self, notice: Notice) {
        // Nobody listening is fine.
        let _ = self.notices.send(notice);
    }

    /// Apply a submission result for `card_id`, which must be `Submitting`.
    fn settle(
        &self,
        core: &mut SessionCore,
        card_id: Uuid,
        quality: Quality,
        result: Result<(), ApiFailure>,
    ) -> Settled {
        let settled = match result {
            Ok(()) => match core.state.complete_rating(card_id, quality) {
                RatingProgress::Advanced { next_index } => {
                    tracing::debug!(%card_id, next_index, "rating stored");
                    Settled::Advanced
                }
                RatingProgress::Completed(summary) => {
                    tracing::info!(
                        total = summary.total,
                        average_quality = summary.average_quality,
                        correct_percentage = summary.correct_percentage,
                        "review session complete"
                    );
                    Settled::Completed(summary)
                }
            },
            Err(failure) if failure.is_transient() => {
                core.state.abort_rating();
                tracing::warn!(%card_id, error = %failure, "rating not delivered, will retry");
                self.notify(Notice::Retrying {
                    card_id,
                    delay: self.policy.delay,
                });
                Settled::Transient
            }
            Err(failure) => {
                core.state.abort_rating();
                tracing::warn!(%card_id, error = %failure, "rating rejected");
                self.notify(Notice::Error(format!("Failed to submit review: {failure}")));
                Settled::Rejected(failure)
            }
        };
        self.publish(&core.state);
        settled
    }
}

/// Background resubmission of one rating until it lands, is rejected, or
/// the retry is cancelled.
async fn retry_loop<A: ReviewApi>(
    inner: Arc<Inner<A>>,
    generation: u64,
    retry_id: u64,
    card_id: Uuid,
    quality: Quality,
) {
    loop {
        tokio::time::sleep(inner.policy.delay).await;

        {
            let mut core = inner.core.lock().await;
            if !core.owns_retry(generation, retry_id) {
                return;
            }
            if !core.state.begin_retry(card_id) {
                core.pending_retry = None;
                return;
            }
            inner.publish(&core.state);
        }

        tracing::debug!(%card_id, retry_id, "resubmitting rating");
        let result = inner.api.submit_rating(card_id, quality).await;

        let mut core = inner.core.lock().await;
        if !core.owns_retry(generation, retry_id) {
            return;
        }
        match inner.settle(&mut core, card_id, quality, result) {
            Settled::Transient => continue,
            Settled::Advanced | Settled::Completed(_) | Settled::Rejected(_) => {
                core.pending_retry = None;
                return;
            }
        }
    }
}

/// A learner's review session.
///
/// Cheap to clone; clones share the same session.
pub struct ReviewSession<A: ReviewApi> {
    inner: Arc<Inner<A>>,
}

impl<A: ReviewApi> Clone for ReviewSession<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: ReviewApi> ReviewSession<A> {
    /// Create an idle session. The receiver yields the session's notices.
    pub fn new(api: A, policy: RetryPolicy) -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (notices, notice_rx) = mpsc::unbounded_channel();
        let (state_tx, _) = watch::channel(ReviewSessionState::default());

        let session = Self {
            inner: Arc::new(Inner {
                api,
                policy,
                core: Mutex::new(SessionCore {
                    state: ReviewSessionState::default(),
                    generation: 0,
                    pending_retry: None,
                    next_retry_id: 0,
                }),
                notices,
                state_tx,
            }),
        };
        (session, notice_rx)
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> ReviewSessionState {
        self.inner.state_tx.borrow().clone()
    }

    /// Watch state changes.
    pub fn subscribe(&self) -> watch::Receiver<ReviewSessionState> {
        self.inner.state_tx.subscribe()
    }

    /// Load the cards due now, optionally narrowed to any of `tag_ids`.
    ///
    /// Replaces whatever session was running. Ignored while a load is
    /// already in progress.
    pub async fn start_session(&self, tag_ids: &[Uuid]) -> StartOutcome {
        {
            let mut core = self.inner.core.lock().await;
            if !core.state.begin_loading() {
                tracing::debug!("session load already in progress");
                return StartOutcome::Ignored(IgnoreReason::Loading);
            }
            core.cancel_retry();
            core.generation += 1;
            self.inner.publish(&core.state);
        }

        tracing::info!(tags = tag_ids.len(), "starting review session");
        let result = self.inner.api.fetch_due(tag_ids).await;

        let mut core = self.inner.core.lock().await;
        let outcome = match result {
            Ok(FetchOutcome::Cards(cards)) if !cards.is_empty() => {
                let count = cards.len();
                core.state.finish_loading(cards);
                tracing::info!(count, "review session started");
                StartOutcome::Started { count }
            }
            Ok(_) => {
                core.state.finish_loading(Vec::new());
                tracing::info!("no cards due");
                self.inner
                    .notify(Notice::Info("No cards are due for review.".to_string()));
                StartOutcome::NoneDue
            }
            Err(failure) => {
                core.state.fail_loading();
                tracing::warn!(error = %failure, "failed to load due cards");
                self.inner
                    .notify(Notice::Error(format!("Failed to load due cards: {failure}")));
                StartOutcome::Failed(failure)
            }
        };
        self.inner.publish(&core.state);
        outcome
    }

    /// Show the other face of the current card.
    pub async fn flip(&self) -> Result<Side, IgnoreReason> {
        let mut core = self.inner.core.lock().await;
        let side = core.state.flip()?;
        self.inner.publish(&core.state);
        Ok(side)
    }

    /// Rate the current card with `quality` (0-5).
    ///
    /// Only accepted while the answer is showing and nothing else is being
    /// submitted. A rating given while a retry is waiting replaces it.
    pub async fn rate(&self, quality: i64) -> Result<RateOutcome, SessionError> {
        let quality = Quality::new(quality).map_err(|_| SessionError::InvalidQuality(quality))?;

        let (generation, card_id) = {
            let mut core = self.inner.core.lock().await;
            let card_id = match core.state.begin_rating() {
                Ok(card_id) => card_id,
                Err(reason) => {
                    tracing::debug!(?reason, "rating ignored");
                    return Ok(RateOutcome::Ignored(reason));
                }
            };
            core.cancel_retry();
            self.inner.publish(&core.state);
            (core.generation, card_id)
        };

        tracing::debug!(%card_id, quality = quality.value(), "submitting rating");
        let result = self.inner.api.submit_rating(card_id, quality).await;

        let mut core = self.inner.core.lock().await;
        if core.generation != generation {
            tracing::debug!(%card_id, "session replaced while rating was in flight");
            return Ok(RateOutcome::Abandoned);
        }

        let outcome = match self.inner.settle(&mut core, card_id, quality, result) {
            Settled::Advanced => RateOutcome::Advanced,
            Settled::Completed(summary) => RateOutcome::Completed(summary),
            Settled::Rejected(failure) => RateOutcome::Rejected(failure),
            Settled::Transient => {
                let retry_id = core.next_retry_id;
                core.next_retry_id += 1;
                let task = tokio::spawn(retry_loop(
                    Arc::clone(&self.inner),
                    generation,
                    retry_id,
                    card_id,
                    quality,
                ));
                core.pending_retry = Some(PendingRetry::new(retry_id, card_id, task.abort_handle()));
                RateOutcome::RetryScheduled {
                    delay: self.inner.policy.delay,
                }
            }
        };
        Ok(outcome)
    }
}
