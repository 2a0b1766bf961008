//! Test fixtures and factory functions for creating test data.

use chrono::{Duration, NaiveDate};
use serde_json::json;
use uuid::Uuid;

/// Card to seed directly into the database.
#[derive(Debug, Clone)]
pub struct CardSeed {
    pub front: String,
    pub back: String,
    pub ease_factor: f64,
    pub interval_days: i32,
    pub repetition_count: i32,
    pub next_review_date: NaiveDate,
    pub tag_ids: Vec<Uuid>,
}

/// A never-reviewed card due on `due`.
pub fn new_card(front: &str, due: NaiveDate) -> CardSeed {
    CardSeed {
        front: front.to_string(),
        back: format!("Answer to {}", front),
        ease_factor: 2.5,
        interval_days: 0,
        repetition_count: 0,
        next_review_date: due,
        tag_ids: Vec::new(),
    }
}

/// A card with an established review streak.
pub fn reviewed_card(
    front: &str,
    due: NaiveDate,
    interval_days: i32,
    ease_factor: f64,
    repetition_count: i32,
) -> CardSeed {
    CardSeed {
        interval_days,
        ease_factor,
        repetition_count,
        ..new_card(front, due)
    }
}

/// Attach tags to a seed.
pub fn tagged(mut card: CardSeed, tag_ids: &[Uuid]) -> CardSeed {
    card.tag_ids = tag_ids.to_vec();
    card
}

/// `today` shifted by `days`.
pub fn days_from(today: NaiveDate, days: i64) -> NaiveDate {
    today + Duration::days(days)
}

/// Body for POST /api/flashcards/:id/review.
pub fn submit_review_request(quality: i64) -> serde_json::Value {
    json!({ "quality": quality })
}

/// Query string for GET /api/reviews/session.
pub fn session_path(tag_ids: &[Uuid], limit: Option<usize>) -> String {
    let mut params = Vec::new();
    if !tag_ids.is_empty() {
        let joined = tag_ids
            .iter()
            .map(Uuid::to_string)
            .collect::<Vec<_>>()
            .join(",");
        params.push(format!("tags={}", joined));
    }
    if let Some(limit) = limit {
        params.push(format!("limit={}", limit));
    }

    if params.is_empty() {
        "/api/reviews/session".to_string()
    } else {
        format!("/api/reviews/session?{}", params.join("&"))
    }
}
