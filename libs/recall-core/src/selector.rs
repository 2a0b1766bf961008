//! Due-card selection.
//!
//! Storage backends only hand over a user's candidate cards in insertion
//! order; filtering, ordering and capping happen here so every store selects
//! the same way.

use std::collections::HashMap;
use std::future::Future;
use std::sync::RwLock;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, Result};
use crate::types::{CardSchedulingState, ReviewCard};

/// Parameters of one due-card lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DueQuery {
    /// Empty means "any tag".
    #[serde(default)]
    pub tag_ids: Vec<Uuid>,
    pub as_of: NaiveDate,
    pub limit: usize,
}

impl DueQuery {
    pub fn new(as_of: NaiveDate, limit: usize) -> Self {
        Self {
            tag_ids: Vec::new(),
            as_of,
            limit,
        }
    }

    pub fn with_tags(mut self, tag_ids: Vec<Uuid>) -> Self {
        self.tag_ids = tag_ids;
        self
    }

    /// Inclusive OR over the requested tags.
    fn matches_tags(&self, card_tags: &[Uuid]) -> bool {
        self.tag_ids.is_empty() || card_tags.iter().any(|tag| self.tag_ids.contains(tag))
    }
}

/// A card as kept by a store, with the tags it is associated with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCard {
    pub card: ReviewCard,
    #[serde(default)]
    pub tag_ids: Vec<Uuid>,
}

/// Card-storage collaborator for the selector.
pub trait CardStore: Send + Sync {
    type Error: Send;

    /// Cards owned by `user_id`, in insertion order.
    ///
    /// Stores may drop cards that are not due by `as_of`, but must not
    /// reorder what they return.
    fn candidate_cards(
        &self,
        user_id: Uuid,
        as_of: NaiveDate,
    ) -> impl Future<Output = std::result::Result<Vec<StoredCard>, Self::Error>> + Send;
}

/// Cards of `user_id` that are due for review, most overdue first.
pub async fn due_cards<S: CardStore>(
    store: &S,
    user_id: Uuid,
    query: &DueQuery,
) -> std::result::Result<Vec<ReviewCard>, S::Error> {
    let candidates = store.candidate_cards(user_id, query.as_of).await?;
    Ok(select_due(candidates, query))
}

/// Apply the due filter, the tag filter, the ordering and the cap.
pub fn select_due(candidates: Vec<StoredCard>, query: &DueQuery) -> Vec<ReviewCard> {
    let mut due: Vec<ReviewCard> = candidates
        .into_iter()
        .filter(|stored| stored.card.next_review_date <= query.as_of)
        .filter(|stored| query.matches_tags(&stored.tag_ids))
        .map(|stored| stored.card)
        .collect();

    // Stable: equal dates keep insertion order.
    due.sort_by_key(|card| card.next_review_date);
    due.truncate(query.limit);
    due
}

/// In-memory card store keyed by user.
#[derive(Debug, Default)]
pub struct MemoryCardStore {
    cards: RwLock<HashMap<Uuid, Vec<StoredCard>>>,
}

impl MemoryCardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a card for `user_id`.
    pub fn insert(&self, user_id: Uuid, card: StoredCard) -> Result<()> {
        let mut cards = self
            .cards
            .write()
            .map_err(|e| CoreError::Store(e.to_string()))?;
        cards.entry(user_id).or_default().push(card);
        Ok(())
    }

    /// Write a new scheduling state back onto the stored card.
    ///
    /// Returns false when the user has no card with that id.
    pub fn apply_schedule(&self, user_id: Uuid, state: &CardSchedulingState) -> Result<bool> {
        let mut cards = self
            .cards
            .write()
            .map_err(|e| CoreError::Store(e.to_string()))?;

        let Some(stored) = cards
            .get_mut(&user_id)
            .and_then(|cards| cards.iter_mut().find(|c| c.card.id == state.id))
        else {
            return Ok(false);
        };

        stored.card.interval = state.interval;
        stored.card.ease_factor = state.ease_factor;
        stored.card.next_review_date = state.next_review_date;
        Ok(true)
    }
}

impl CardStore for MemoryCardStore {
    type Error = CoreError;

    async fn candidate_cards(&self, user_id: Uuid, _as_of: NaiveDate) -> Result<Vec<StoredCard>> {
        let cards = self
            .cards
            .read()
            .map_err(|e| CoreError::Store(e.to_string()))?;
        Ok(cards.get(&user_id).cloned().unwrap_or_default())
    }
}
