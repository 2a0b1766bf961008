//! Drives a review session against a stub backend over HTTP.

use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use recall_client::{
    ClientConfig, HttpReviewApi, Phase, RateOutcome, ReviewSession, StartOutcome,
};
use recall_core::ReviewCard;
use serde_json::{json, Value};
use uuid::Uuid;

#[derive(Clone, Default)]
struct Backend {
    cards: Arc<Vec<ReviewCard>>,
    reviews: Arc<Mutex<Vec<(Uuid, i64)>>>,
}

async fn session(State(backend): State<Backend>) -> axum::response::Response {
    if backend.cards.is_empty() {
        return StatusCode::NO_CONTENT.into_response();
    }
    Json(json!({ "cards": backend.cards.as_slice() })).into_response()
}

async fn review(
    State(backend): State<Backend>,
    Path(id): Path<Uuid>,
    Json(body): Json<Value>,
) -> axum::response::Response {
    let quality = body["quality"].as_i64().unwrap_or(-1);
    backend.reviews.lock().unwrap().push((id, quality));
    Json(json!({ "message": "Review processed successfully." })).into_response()
}

async fn spawn(backend: Backend) -> String {
    let app = Router::new()
        .route("/api/reviews/session", get(session))
        .route("/api/flashcards/:id/review", post(review))
        .with_state(backend);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn card(front: &str, due: u32) -> ReviewCard {
    ReviewCard {
        id: Uuid::new_v4(),
        front: front.to_string(),
        back: format!("back of {front}"),
        interval: 0,
        ease_factor: 2.5,
        next_review_date: NaiveDate::from_ymd_opt(2024, 6, due).unwrap(),
    }
}

#[tokio::test]
async fn complete_session_over_http() {
    let cards = vec![card("first", 1), card("second", 2), card("third", 3)];
    let backend = Backend {
        cards: Arc::new(cards.clone()),
        ..Backend::default()
    };
    let url = spawn(backend.clone()).await;

    let config = ClientConfig::new(url, "token");
    let (session, _notices) = ReviewSession::new(HttpReviewApi::new(&config), config.retry);

    assert_eq!(session.start_session(&[]).await, StartOutcome::Started { count: 3 });
    assert_eq!(session.state().queue(), cards.as_slice());

    let mut last = None;
    for quality in [5, 4, 2] {
        session.flip().await.unwrap();
        last = Some(session.rate(quality).await.unwrap());
    }

    let Some(RateOutcome::Completed(summary)) = last else {
        panic!("expected completion, got {last:?}");
    };
    assert_eq!(summary.total, 3);
    assert_eq!(session.state().phase(), Phase::Complete);

    let reviews = backend.reviews.lock().unwrap().clone();
    assert_eq!(
        reviews,
        vec![(cards[0].id, 5), (cards[1].id, 4), (cards[2].id, 2)]
    );
}

#[tokio::test]
async fn empty_backend_leaves_session_idle() {
    let url = spawn(Backend::default()).await;
    let config = ClientConfig::new(url, "token");
    let (session, mut notices) =
        ReviewSession::new(HttpReviewApi::new(&config), config.retry);

    assert_eq!(session.start_session(&[]).await, StartOutcome::NoneDue);
    assert_eq!(session.state().phase(), Phase::Idle);
    assert!(notices.try_recv().is_ok());
}
