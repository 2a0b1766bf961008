//! HTTP implementation of the review collaborators.

use recall_core::{Quality, ReviewCard};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::{ApiFailure, FetchOutcome, ReviewApi};
use crate::config::ClientConfig;

#[derive(Debug, Deserialize)]
struct SessionResponse {
    cards: Vec<ReviewCard>,
}

#[derive(Debug, Serialize)]
struct SubmitRequest {
    quality: u8,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Talks to the review backend over HTTP with bearer authentication.
///
/// Only transport failures are transient; any response the server sends
/// back with a non-success status is a rejection.
#[derive(Debug, Clone)]
pub struct HttpReviewApi {
    client: Client,
    backend_url: String,
    token: String,
    limit: usize,
}

impl HttpReviewApi {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            client: Client::new(),
            backend_url: config.backend_url.clone(),
            token: config.token.clone(),
            limit: config.session_limit,
        }
    }

    fn session_query(&self, tag_ids: &[Uuid]) -> Vec<(&'static str, String)> {
        let mut query = vec![("limit", self.limit.to_string())];
        if !tag_ids.is_empty() {
            let tags = tag_ids
                .iter()
                .map(Uuid::to_string)
                .collect::<Vec<_>>()
                .join(",");
            query.push(("tags", tags));
        }
        query
    }
}

/// Turn a non-success response into a rejection, preferring the server's
/// error message over the raw body.
async fn rejection(resp: Response) -> ApiFailure {
    let status = resp.status();
    let text = resp.text().await.unwrap_or_default();
    let reason = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.message)
        .unwrap_or_else(|_| {
            if text.is_empty() {
                status.to_string()
            } else {
                text
            }
        });
    ApiFailure::rejected(Some(status.as_u16()), reason)
}

impl ReviewApi for HttpReviewApi {
    async fn fetch_due(&self, tag_ids: &[Uuid]) -> Result<FetchOutcome, ApiFailure> {
        let url = format!("{}/api/reviews/session", self.backend_url);

        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .query(&self.session_query(tag_ids))
            .send()
            .await
            .map_err(|e| ApiFailure::Transient(e.to_string()))?;

        if resp.status() == StatusCode::NO_CONTENT {
            return Ok(FetchOutcome::NoneDue);
        }
        if !resp.status().is_success() {
            return Err(rejection(resp).await);
        }

        let body: SessionResponse = resp
            .json()
            .await
            .map_err(|e| ApiFailure::rejected(None, format!("Parse error: {e}")))?;

        tracing::debug!(count = body.cards.len(), "fetched due cards");
        if body.cards.is_empty() {
            Ok(FetchOutcome::NoneDue)
        } else {
            Ok(FetchOutcome::Cards(body.cards))
        }
    }

    async fn submit_rating(&self, card_id: Uuid, quality: Quality) -> Result<(), ApiFailure> {
        let url = format!("{}/api/flashcards/{}/review", self.backend_url, card_id);
        let request = SubmitRequest {
            quality: quality.value(),
        };

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .await
            .map_err(|e| ApiFailure::Transient(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(rejection(resp).await);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Path, Query};
    use axum::http::{HeaderMap, StatusCode as AxumStatus};
    use axum::response::IntoResponse;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::HashMap;

    const TOKEN: &str = "secret";

    fn card() -> ReviewCard {
        ReviewCard {
            id: Uuid::nil(),
            front: "2 + 2".to_string(),
            back: "4".to_string(),
            interval: 6,
            ease_factor: 2.36,
            next_review_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        }
    }

    fn authorized(headers: &HeaderMap) -> bool {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == format!("Bearer {TOKEN}"))
    }

    async fn session(
        headers: HeaderMap,
        Query(params): Query<HashMap<String, String>>,
    ) -> axum::response::Response {
        if !authorized(&headers) {
            return (
                AxumStatus::UNAUTHORIZED,
                Json(json!({ "error": "unauthorized", "message": "Unauthorized: bad token" })),
            )
                .into_response();
        }
        match params.get("tags").map(String::as_str) {
            Some("00000000-0000-0000-0000-000000000000") => AxumStatus::NO_CONTENT.into_response(),
            Some(_) => (
                AxumStatus::NOT_FOUND,
                Json(json!({ "error": "not_found", "message": "Not found: Tag not found" })),
            )
                .into_response(),
            None => {
                assert_eq!(params.get("limit").map(String::as_str), Some("20"));
                Json(json!({ "cards": [card()] })).into_response()
            }
        }
    }

    async fn review(
        Path(id): Path<Uuid>,
        Json(body): Json<serde_json::Value>,
    ) -> axum::response::Response {
        if id != Uuid::nil() {
            return (AxumStatus::NOT_FOUND, "no such card").into_response();
        }
        assert_eq!(body, json!({ "quality": 4 }));
        Json(json!({ "message": "Review processed successfully." })).into_response()
    }

    async fn spawn_backend() -> String {
        let app = Router::new()
            .route("/api/reviews/session", get(session))
            .route("/api/flashcards/:id/review", post(review));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn api(url: &str, token: &str) -> HttpReviewApi {
        HttpReviewApi::new(&ClientConfig::new(url, token).with_session_limit(20))
    }

    fn q(value: i64) -> Quality {
        Quality::new(value).unwrap()
    }

    #[tokio::test]
    async fn fetch_returns_cards() {
        let url = spawn_backend().await;
        let outcome = api(&url, TOKEN).fetch_due(&[]).await.unwrap();
        assert_eq!(outcome, FetchOutcome::Cards(vec![card()]));
    }

    #[tokio::test]
    async fn no_content_means_none_due() {
        let url = spawn_backend().await;
        let outcome = api(&url, TOKEN).fetch_due(&[Uuid::nil()]).await.unwrap();
        assert_eq!(outcome, FetchOutcome::NoneDue);
    }

    #[tokio::test]
    async fn error_status_is_rejected_with_server_message() {
        let url = spawn_backend().await;
        let err = api(&url, TOKEN)
            .fetch_due(&[Uuid::new_v4()])
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ApiFailure::rejected(Some(404), "Not found: Tag not found")
        );
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn bad_token_is_rejected() {
        let url = spawn_backend().await;
        let err = api(&url, "wrong").fetch_due(&[]).await.unwrap_err();
        assert!(matches!(err, ApiFailure::Rejected { status: Some(401), .. }));
    }

    #[tokio::test]
    async fn submit_posts_quality() {
        let url = spawn_backend().await;
        api(&url, TOKEN).submit_rating(Uuid::nil(), q(4)).await.unwrap();
    }

    #[tokio::test]
    async fn submit_rejection_falls_back_to_body_text() {
        let url = spawn_backend().await;
        let err = api(&url, TOKEN)
            .submit_rating(Uuid::new_v4(), q(4))
            .await
            .unwrap_err();
        assert_eq!(err, ApiFailure::rejected(Some(404), "no such card"));
    }

    #[tokio::test]
    async fn unreachable_backend_is_transient() {
        let api = api("http://127.0.0.1:1", TOKEN);
        assert!(api.fetch_due(&[]).await.unwrap_err().is_transient());
        assert!(api.submit_rating(Uuid::nil(), q(3)).await.unwrap_err().is_transient());
    }
}
