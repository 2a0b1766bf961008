//! Core types for the scheduling engine and review sessions.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, Result};

/// Ease factor given to a card that has never been reviewed.
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// Lower bound for any ease factor.
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Longest interval the scheduler hands out, in days (about a century).
pub const MAX_INTERVAL_DAYS: u32 = 36_500;

/// Self-rated recall quality on the SM-2 scale.
///
/// - 0: complete blackout
/// - 1: incorrect, but the answer was recognised
/// - 2: incorrect, but the answer seemed easy once shown
/// - 3: correct with serious difficulty
/// - 4: correct after hesitation
/// - 5: perfect recall
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Quality(u8);

impl Quality {
    /// Highest quality on the scale.
    pub const MAX: u8 = 5;

    /// Lowest quality that counts as "remembered".
    pub const PASSING: u8 = 3;

    /// Validate a raw rating. Out-of-range values are rejected, never clamped.
    pub fn new(value: i64) -> Result<Self> {
        if (0..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(CoreError::InvalidQuality(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// True for quality >= 3.
    pub fn is_passing(self) -> bool {
        self.0 >= Self::PASSING
    }
}

impl TryFrom<i64> for Quality {
    type Error = CoreError;

    fn try_from(value: i64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Quality> for u8 {
    fn from(quality: Quality) -> Self {
        quality.0
    }
}

/// Scheduling parameters of one flashcard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardSchedulingState {
    pub id: Uuid,
    pub ease_factor: f64,
    /// Days until the next review.
    pub interval: u32,
    /// Consecutive passing reviews since the last lapse.
    pub repetition_count: u32,
    pub next_review_date: NaiveDate,
}

impl CardSchedulingState {
    /// A card is due on or after its next review date.
    pub fn is_due(&self, as_of: NaiveDate) -> bool {
        self.next_review_date <= as_of
    }
}

/// Card as shown in a review session: content plus display scheduling fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewCard {
    pub id: Uuid,
    pub front: String,
    pub back: String,
    pub interval: u32,
    pub ease_factor: f64,
    pub next_review_date: NaiveDate,
}

/// One rating handed from a review session to the persistence side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewEvent {
    pub card_id: Uuid,
    pub quality: Quality,
    pub reviewed_at: DateTime<Utc>,
}

impl ReviewEvent {
    pub fn new(card_id: Uuid, quality: Quality) -> Self {
        Self {
            card_id,
            quality,
            reviewed_at: Utc::now(),
        }
    }
}
