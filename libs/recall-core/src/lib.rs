//! Core spaced-repetition library shared by the backend and the review client.
//!
//! Provides:
//! - SM-2 scheduler (quality rating -> next scheduling state)
//! - Due-card selection over a pluggable card store
//! - Study-day computation with a configurable daily reset hour
//! - Shared types (CardSchedulingState, Quality, ReviewCard, etc.)

pub mod algorithm;
pub mod error;
pub mod selector;
pub mod study_day;
pub mod types;

pub use algorithm::{next_state, sm2::Sm2, SpacedRepetitionAlgorithm};
pub use error::{CoreError, Result};
pub use selector::{due_cards, select_due, CardStore, DueQuery, MemoryCardStore, StoredCard};
pub use study_day::study_day;
pub use types::{CardSchedulingState, Quality, ReviewCard, ReviewEvent};
