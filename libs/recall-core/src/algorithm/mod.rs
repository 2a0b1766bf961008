//! Spaced repetition scheduling.

pub mod sm2;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::types::{CardSchedulingState, Quality};

/// Trait for spaced repetition algorithms.
pub trait SpacedRepetitionAlgorithm: Send + Sync {
    /// Algorithm identifier.
    fn name(&self) -> &'static str;

    /// Initial state for a card authored on `created_on`.
    fn initial_state(&self, id: Uuid, created_on: NaiveDate) -> CardSchedulingState;

    /// Calculate the next scheduling state after a review done on `today`.
    ///
    /// Must be deterministic: same inputs, same output.
    fn schedule(
        &self,
        state: &CardSchedulingState,
        quality: Quality,
        today: NaiveDate,
    ) -> CardSchedulingState;
}

/// Schedule with the default SM-2 parameters.
pub fn next_state(
    current: &CardSchedulingState,
    quality: Quality,
    today: NaiveDate,
) -> CardSchedulingState {
    sm2::Sm2::default().schedule(current, quality, today)
}
