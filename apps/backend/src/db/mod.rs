//! PostgreSQL database operations

use chrono::NaiveDate;
use recall_core::selector::CardStore;
use recall_core::SpacedRepetitionAlgorithm;
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;

/// Database wrapper with connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

/// Scheduling state before and after one processed review
#[derive(Debug, Clone)]
pub struct AppliedReview {
    pub before: CardSchedulingState,
    pub after: CardSchedulingState,
}

impl Database {
    /// Connect to PostgreSQL and create connection pool
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Create a pool that connects on first use
    pub fn connect_lazy(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_lazy(database_url)?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ApiError::Migration(e.to_string()))?;
        Ok(())
    }

    /// Get the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // === User Repository ===

    /// Get user by bearer token
    pub async fn get_user_by_token(&self, token: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, token, created_at, last_seen_at
            FROM users
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Update user last_seen_at timestamp
    pub async fn update_last_seen(&self, user_id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET last_seen_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // === Card Repository ===

    /// Get card owned by the user
    pub async fn get_card(&self, user_id: Uuid, card_id: Uuid) -> Result<Option<DbCard>> {
        let card = sqlx::query_as::<_, DbCard>(
            r#"
            SELECT id, user_id, front, back, ease_factor, interval_days,
                   repetition_count, next_review_date
            FROM cards
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(card_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(card)
    }

    /// Count how many of the given tags belong to the user
    pub async fn count_user_tags(&self, user_id: Uuid, tag_ids: &[Uuid]) -> Result<usize> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM tags
            WHERE user_id = $1 AND id = ANY($2)
            "#,
        )
        .bind(user_id)
        .bind(tag_ids)
        .fetch_one(&self.pool)
        .await?;

        Ok(count as usize)
    }

    // === Review Processing ===

    /// Schedule one review and persist the result atomically.
    ///
    /// The card row is locked for the duration of the transaction so two
    /// ratings for the same card cannot interleave. Returns `None` when the
    /// user owns no card with that id.
    pub async fn apply_review(
        &self,
        user_id: Uuid,
        event: &ReviewEvent,
        today: NaiveDate,
        algorithm: &dyn SpacedRepetitionAlgorithm,
    ) -> Result<Option<AppliedReview>> {
        let mut tx = self.pool.begin().await?;

        let card = sqlx::query_as::<_, DbCard>(
            r#"
            SELECT id, user_id, front, back, ease_factor, interval_days,
                   repetition_count, next_review_date
            FROM cards
            WHERE id = $1 AND user_id = $2
            FOR UPDATE
            "#,
        )
        .bind(event.card_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(card) = card else {
            return Ok(None);
        };

        let before = card.to_core_state()?;
        let after = algorithm.schedule(&before, event.quality, today);

        sqlx::query(
            r#"
            UPDATE cards
            SET ease_factor = $1, interval_days = $2, repetition_count = $3,
                next_review_date = $4, updated_at = NOW()
            WHERE id = $5
            "#,
        )
        .bind(after.ease_factor)
        .bind(column_value::<_, i32>("interval_days", after.interval)?)
        .bind(column_value::<_, i32>("repetition_count", after.repetition_count)?)
        .bind(after.next_review_date)
        .bind(after.id)
        .execute(&mut *tx)
        .await?;

        let record = DbReviewEvent::new(user_id, event, &before, &after, algorithm.name())?;
        sqlx::query(
            r#"
            INSERT INTO review_events (id, card_id, user_id, quality, reviewed_at,
                                       interval_before, interval_after, ease_before,
                                       ease_after, algorithm)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(record.id)
        .bind(record.card_id)
        .bind(record.user_id)
        .bind(record.quality)
        .bind(record.reviewed_at)
        .bind(record.interval_before)
        .bind(record.interval_after)
        .bind(record.ease_before)
        .bind(record.ease_after)
        .bind(&record.algorithm)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(AppliedReview { before, after }))
    }

    /// Review history for a card, oldest first
    pub async fn get_review_events(&self, card_id: Uuid) -> Result<Vec<DbReviewEvent>> {
        let events = sqlx::query_as::<_, DbReviewEvent>(
            r#"
            SELECT id, card_id, user_id, quality, reviewed_at, interval_before,
                   interval_after, ease_before, ease_after, algorithm
            FROM review_events
            WHERE card_id = $1
            ORDER BY reviewed_at, created_at
            "#,
        )
        .bind(card_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }
}

impl CardStore for Database {
    type Error = ApiError;

    /// Due cards of the user in insertion order, tags aggregated per card.
    async fn candidate_cards(&self, user_id: Uuid, as_of: NaiveDate) -> Result<Vec<StoredCard>> {
        let rows = sqlx::query_as::<_, DbDueCard>(
            r#"
            SELECT c.id, c.front, c.back, c.ease_factor, c.interval_days, c.next_review_date,
                   COALESCE(array_agg(ct.tag_id) FILTER (WHERE ct.tag_id IS NOT NULL), '{}') AS tag_ids
            FROM cards c
            LEFT JOIN card_tags ct ON ct.card_id = c.id
            WHERE c.user_id = $1 AND c.next_review_date <= $2
            GROUP BY c.id
            ORDER BY c.seq
            "#,
        )
        .bind(user_id)
        .bind(as_of)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(DbDueCard::into_stored_card).collect()
    }
}
