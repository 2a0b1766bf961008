//! Review session state machine.
//!
//! `Idle -> Loading -> Active <-> Submitting -> Complete`, with `Loading`
//! falling back to `Idle` when nothing is due or the fetch fails. The
//! transitions here do no I/O; `ReviewSession` drives them around the
//! collaborator calls.

use std::collections::HashMap;

use recall_core::{Quality, ReviewCard};
use serde::Serialize;
use uuid::Uuid;

use crate::summary::SessionSummary;

/// Which face of the current card is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    #[default]
    Front,
    Back,
}

impl Side {
    fn flipped(self) -> Self {
        match self {
            Self::Front => Self::Back,
            Self::Back => Self::Front,
        }
    }
}

/// Session lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Active,
    Submitting,
    Complete,
}

/// Why an action was ignored without changing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    NoActiveSession,
    Loading,
    /// The answer has not been revealed yet.
    FrontShowing,
    /// A rating for the current card is already in flight.
    AlreadySubmitting,
    SessionComplete,
}

/// Effect of a successful rating on the session.
#[derive(Debug, Clone, PartialEq)]
pub enum RatingProgress {
    Advanced { next_index: usize },
    Completed(SessionSummary),
}

/// Everything a session UI needs to render.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReviewSessionState {
    phase: Phase,
    queue: Vec<ReviewCard>,
    current_index: usize,
    side: Side,
    submitted: HashMap<Uuid, Quality>,
    summary: Option<SessionSummary>,
}

impl ReviewSessionState {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn queue(&self) -> &[ReviewCard] {
        &self.queue
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn submitted(&self) -> &HashMap<Uuid, Quality> {
        &self.submitted
    }

    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    pub fn current_card(&self) -> Option<&ReviewCard> {
        match self.phase {
            Phase::Active | Phase::Submitting => self.queue.get(self.current_index),
            _ => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.summary.is_some()
    }

    /// Enter `Loading`, discarding whatever session was there.
    ///
    /// Returns false (and changes nothing) when a load is already running.
    pub(crate) fn begin_loading(&mut self) -> bool {
        if self.phase == Phase::Loading {
            return false;
        }
        *self = Self {
            phase: Phase::Loading,
            ..Self::default()
        };
        true
    }

    /// Install the fetched queue. An empty queue returns to `Idle`.
    pub(crate) fn finish_loading(&mut self, cards: Vec<ReviewCard>) {
        debug_assert_eq!(self.phase, Phase::Loading);
        if cards.is_empty() {
            self.phase = Phase::Idle;
            return;
        }
        self.queue = cards;
        self.current_index = 0;
        self.side = Side::Front;
        self.submitted.clear();
        self.summary = None;
        self.phase = Phase::Active;
    }

    pub(crate) fn fail_loading(&mut self) {
        debug_assert_eq!(self.phase, Phase::Loading);
        self.phase = Phase::Idle;
    }

    /// Toggle the visible face. Only meaningful while `Active`.
    pub(crate) fn flip(&mut self) -> Result<Side, IgnoreReason> {
        self.ensure_active()?;
        self.side = self.side.flipped();
        Ok(self.side)
    }

    /// Start submitting a learner's rating for the current card.
    pub(crate) fn begin_rating(&mut self) -> Result<Uuid, IgnoreReason> {
        self.ensure_active()?;
        if self.side == Side::Front {
            return Err(IgnoreReason::FrontShowing);
        }
        let card_id = self
            .queue
            .get(self.current_index)
            .map(|card| card.id)
            .ok_or(IgnoreReason::NoActiveSession)?;
        self.phase = Phase::Submitting;
        Ok(card_id)
    }

    /// Start resubmitting an already accepted rating.
    ///
    /// The side is not checked: the learner revealed the answer when the
    /// rating was first given.
    pub(crate) fn begin_retry(&mut self, card_id: Uuid) -> bool {
        let is_current = self
            .queue
            .get(self.current_index)
            .is_some_and(|card| card.id == card_id);
        if self.phase != Phase::Active || !is_current {
            return false;
        }
        self.phase = Phase::Submitting;
        true
    }

    /// Record a successful submission and move on.
    pub(crate) fn complete_rating(&mut self, card_id: Uuid, quality: Quality) -> RatingProgress {
        debug_assert_eq!(self.phase, Phase::Submitting);
        debug_assert_eq!(
            self.queue.get(self.current_index).map(|card| card.id),
            Some(card_id),
            "ratings resolve in queue order"
        );

        self.submitted.insert(card_id, quality);

        if self.current_index + 1 >= self.queue.len() {
            let summary = SessionSummary::from_ratings(self.submitted.values().copied())
                .unwrap_or(SessionSummary {
                    total: 0,
                    average_quality: 0.0,
                    correct_percentage: 0.0,
                });
            self.summary = Some(summary.clone());
            self.phase = Phase::Complete;
            return RatingProgress::Completed(summary);
        }

        self.current_index += 1;
        self.side = Side::Front;
        self.phase = Phase::Active;
        RatingProgress::Advanced {
            next_index: self.current_index,
        }
    }

    /// Give up on the in-flight submission without advancing.
    pub(crate) fn abort_rating(&mut self) {
        if self.phase == Phase::Submitting {
            self.phase = Phase::Active;
        }
    }

    fn ensure_active(&self) -> Result<(), IgnoreReason> {
        match self.phase {
            Phase::Active => Ok(()),
            Phase::Idle => Err(IgnoreReason::NoActiveSession),
            Phase::Loading => Err(IgnoreReason::Loading),
            Phase::Submitting => Err(IgnoreReason::AlreadySubmitting),
            Phase::Complete => Err(IgnoreReason::SessionComplete),
        }
    }
}
