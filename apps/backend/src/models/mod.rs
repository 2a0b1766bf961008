//! Database models and API types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::config::{DEFAULT_SESSION_LIMIT, MAX_SESSION_LIMIT};
use crate::error::{ApiError, Result};

// Re-export shared types from recall-core
pub use recall_core::selector::StoredCard;
pub use recall_core::types::{CardSchedulingState, Quality, ReviewCard, ReviewEvent};

/// Convert between the core's unsigned counters and Postgres INTEGER columns.
pub fn column_value<T, U>(column: &str, value: T) -> Result<U>
where
    T: Copy + std::fmt::Display,
    U: TryFrom<T>,
{
    U::try_from(value)
        .map_err(|_| ApiError::Internal(format!("{} out of range: {}", column, value)))
}

// === Database Entity Types ===

/// Learner resolved from a bearer token
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

/// Card row with its scheduling columns
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbCard {
    pub id: Uuid,
    pub user_id: Uuid,
    pub front: String,
    pub back: String,
    pub ease_factor: f64,
    pub interval_days: i32,
    pub repetition_count: i32,
    pub next_review_date: NaiveDate,
}

impl DbCard {
    /// Convert to recall-core scheduling state
    pub fn to_core_state(&self) -> Result<CardSchedulingState> {
        Ok(CardSchedulingState {
            id: self.id,
            ease_factor: self.ease_factor,
            interval: column_value("interval_days", self.interval_days)?,
            repetition_count: column_value("repetition_count", self.repetition_count)?,
            next_review_date: self.next_review_date,
        })
    }
}

/// Due-card candidate with its tags aggregated into an array
#[derive(Debug, Clone, FromRow)]
pub struct DbDueCard {
    pub id: Uuid,
    pub front: String,
    pub back: String,
    pub ease_factor: f64,
    pub interval_days: i32,
    pub next_review_date: NaiveDate,
    pub tag_ids: Vec<Uuid>,
}

impl DbDueCard {
    pub fn into_stored_card(self) -> Result<StoredCard> {
        Ok(StoredCard {
            card: ReviewCard {
                id: self.id,
                front: self.front,
                back: self.back,
                interval: column_value("interval_days", self.interval_days)?,
                ease_factor: self.ease_factor,
                next_review_date: self.next_review_date,
            },
            tag_ids: self.tag_ids,
        })
    }
}

/// Processed rating, appended to review_events
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbReviewEvent {
    pub id: Uuid,
    pub card_id: Uuid,
    pub user_id: Uuid,
    pub quality: i16,
    pub reviewed_at: DateTime<Utc>,
    pub interval_before: i32,
    pub interval_after: i32,
    pub ease_before: f64,
    pub ease_after: f64,
    pub algorithm: String,
}

impl DbReviewEvent {
    pub fn new(
        user_id: Uuid,
        event: &ReviewEvent,
        before: &CardSchedulingState,
        after: &CardSchedulingState,
        algorithm: &str,
    ) -> Result<Self> {
        Ok(Self {
            id: Uuid::new_v4(),
            card_id: event.card_id,
            user_id,
            quality: i16::from(event.quality.value()),
            reviewed_at: event.reviewed_at,
            interval_before: column_value("interval_before", before.interval)?,
            interval_after: column_value("interval_after", after.interval)?,
            ease_before: before.ease_factor,
            ease_after: after.ease_factor,
            algorithm: algorithm.to_string(),
        })
    }
}

// === API Request/Response Types ===

/// Query string of GET /api/reviews/session
#[derive(Debug, Default, Deserialize)]
pub struct ReviewSessionQuery {
    /// Comma-separated tag ids
    pub tags: Option<String>,
    pub limit: Option<usize>,
}

impl ReviewSessionQuery {
    /// Parsed tag filter, duplicates removed, request order kept
    pub fn tag_ids(&self) -> Result<Vec<Uuid>> {
        let mut ids: Vec<Uuid> = Vec::new();
        let Some(raw) = self.tags.as_deref() else {
            return Ok(ids);
        };

        for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let id = Uuid::parse_str(part)
                .map_err(|_| ApiError::BadRequest(format!("Invalid tag id: {}", part)))?;
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Ok(ids)
    }

    /// Session size, defaulted and clamped
    pub fn limit(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_SESSION_LIMIT)
            .clamp(1, MAX_SESSION_LIMIT)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReviewSessionResponse {
    pub cards: Vec<ReviewCard>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitReviewRequest {
    pub quality: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitReviewResponse {
    pub message: String,
    pub next_state: CardSchedulingState,
}
