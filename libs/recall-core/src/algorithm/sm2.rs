//! SM-2 spaced repetition algorithm.
//!
//! Based on SuperMemo 2. A lapse (quality < 3) resets the repetition streak
//! and brings the card back the next day without touching its ease factor.
//! Intervals are capped at `max_interval` and due dates saturate at the end
//! of the calendar, so any stored state can be scheduled.

use chrono::{Days, NaiveDate};
use uuid::Uuid;

use super::SpacedRepetitionAlgorithm;
use crate::types::{
    CardSchedulingState, Quality, DEFAULT_EASE_FACTOR, MAX_INTERVAL_DAYS, MIN_EASE_FACTOR,
};

/// SM-2 algorithm with configurable parameters.
#[derive(Debug, Clone)]
pub struct Sm2 {
    pub initial_ease: f64,
    pub minimum_ease: f64,
    /// Interval after the first passing review.
    pub first_interval: u32,
    /// Interval after the second consecutive passing review.
    pub second_interval: u32,
    /// Interval after a lapse.
    pub lapse_interval: u32,
    /// Upper bound for every interval handed out.
    pub max_interval: u32,
}

impl Default for Sm2 {
    fn default() -> Self {
        Self {
            initial_ease: DEFAULT_EASE_FACTOR,
            minimum_ease: MIN_EASE_FACTOR,
            first_interval: 1,
            second_interval: 6,
            lapse_interval: 1,
            max_interval: MAX_INTERVAL_DAYS,
        }
    }
}

impl SpacedRepetitionAlgorithm for Sm2 {
    fn name(&self) -> &'static str {
        "sm2"
    }

    fn initial_state(&self, id: Uuid, created_on: NaiveDate) -> CardSchedulingState {
        CardSchedulingState {
            id,
            ease_factor: self.initial_ease,
            interval: 0,
            repetition_count: 0,
            next_review_date: created_on,
        }
    }

    fn schedule(
        &self,
        state: &CardSchedulingState,
        quality: Quality,
        today: NaiveDate,
    ) -> CardSchedulingState {
        debug_assert!(
            state.ease_factor >= self.minimum_ease,
            "ease factor {} of card {} is below the minimum {}",
            state.ease_factor,
            state.id,
            self.minimum_ease
        );

        let (repetition_count, ease_factor, interval) = if quality.is_passing() {
            self.schedule_success(state, quality)
        } else {
            self.schedule_lapse(state)
        };

        let interval = interval.min(self.max_interval);

        CardSchedulingState {
            id: state.id,
            ease_factor,
            interval,
            repetition_count,
            next_review_date: today
                .checked_add_days(Days::new(u64::from(interval)))
                .unwrap_or(NaiveDate::MAX),
        }
    }
}

impl Sm2 {
    fn schedule_success(&self, state: &CardSchedulingState, quality: Quality) -> (u32, f64, u32) {
        let repetition_count = state.repetition_count.saturating_add(1);

        // EF' = EF + (0.1 - (5-q) * (0.08 + (5-q) * 0.02))
        let miss = f64::from(Quality::MAX - quality.value());
        let ease_factor =
            (state.ease_factor + (0.1 - miss * (0.08 + miss * 0.02))).max(self.minimum_ease);

        let interval = match repetition_count {
            1 => self.first_interval,
            2 => self.second_interval,
            _ => {
                let grown = (f64::from(state.interval) * ease_factor).round();
                if grown >= f64::from(self.max_interval) {
                    self.max_interval
                } else {
                    grown as u32
                }
            }
        };

        (repetition_count, ease_factor, interval)
    }

    fn schedule_lapse(&self, state: &CardSchedulingState) -> (u32, f64, u32) {
        (0, state.ease_factor, self.lapse_interval)
    }
}
