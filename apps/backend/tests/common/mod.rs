//! Common test utilities and fixtures for integration tests.
//!
//! This module provides shared test infrastructure including:
//! - TestContext for setting up test environment with database
//! - Helpers for seeding users, cards and tags
//!
//! # Requirements
//! Integration tests require a PostgreSQL database (set DATABASE_URL).

pub mod fixtures;

use std::sync::Arc;

use axum::Router;
use chrono::NaiveDate;
use uuid::Uuid;

use recall_backend::config::Config;
use recall_backend::db::Database;
use recall_backend::{build_router, AppState};

/// Test context containing database connection and router.
pub struct TestContext {
    pub db: Arc<Database>,
    pub config: Arc<Config>,
    app: Router,
}

impl TestContext {
    /// Create a new test context.
    ///
    /// # Panics
    /// Panics if DATABASE_URL is not set or database connection fails.
    pub async fn new() -> Self {
        let config = Config::from_env().expect("DATABASE_URL must be set for integration tests");

        let db = Database::connect(&config.database_url)
            .await
            .expect("Failed to connect to test database");

        db.run_migrations()
            .await
            .expect("Failed to run migrations");

        let db = Arc::new(db);
        let config = Arc::new(config);

        let app = build_router(AppState {
            db: db.clone(),
            config: config.clone(),
        });

        Self { db, config, app }
    }

    /// Get the router for use with axum-test.
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    /// Study day the server schedules against.
    pub fn today(&self) -> NaiveDate {
        self.config.today()
    }

    /// Create a test user and return its ID and token.
    pub async fn create_test_user(&self) -> (Uuid, String) {
        let token = Uuid::new_v4().to_string();
        let id: Uuid = sqlx::query_scalar("INSERT INTO users (token) VALUES ($1) RETURNING id")
            .bind(&token)
            .fetch_one(self.db.pool())
            .await
            .expect("Failed to create test user");
        (id, token)
    }

    /// Insert a card with explicit scheduling state.
    pub async fn create_card(&self, user_id: Uuid, card: &fixtures::CardSeed) -> Uuid {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO cards (user_id, front, back, ease_factor, interval_days,
                               repetition_count, next_review_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(&card.front)
        .bind(&card.back)
        .bind(card.ease_factor)
        .bind(card.interval_days)
        .bind(card.repetition_count)
        .bind(card.next_review_date)
        .fetch_one(self.db.pool())
        .await
        .expect("Failed to create card");

        for tag_id in &card.tag_ids {
            sqlx::query("INSERT INTO card_tags (card_id, tag_id) VALUES ($1, $2)")
                .bind(id)
                .bind(tag_id)
                .execute(self.db.pool())
                .await
                .expect("Failed to tag card");
        }

        id
    }

    /// Create a tag owned by the user.
    pub async fn create_tag(&self, user_id: Uuid, name: &str) -> Uuid {
        sqlx::query_scalar("INSERT INTO tags (user_id, name) VALUES ($1, $2) RETURNING id")
            .bind(user_id)
            .bind(name)
            .fetch_one(self.db.pool())
            .await
            .expect("Failed to create tag")
    }

    /// Format authorization header value.
    pub fn auth_header_value(token: &str) -> String {
        format!("Bearer {}", token)
    }

    /// Clean up test data for a user.
    ///
    /// Cards, tags and review events go with the user via ON DELETE CASCADE.
    pub async fn cleanup_user(&self, user_id: Uuid) {
        let _ = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(self.db.pool())
            .await;
    }
}
