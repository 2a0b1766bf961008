//! Review endpoints: due-card session and rating submission

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use recall_core::{due_cards, DueQuery, Sm2};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::AppState;

/// GET /api/reviews/session
///
/// 200 with the due cards, or 204 when nothing is due.
pub async fn session(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Query(query): Query<ReviewSessionQuery>,
) -> Result<Response> {
    let tag_ids = query.tag_ids()?;

    if !tag_ids.is_empty() {
        let known = state.db.count_user_tags(auth.user_id, &tag_ids).await?;
        if known != tag_ids.len() {
            return Err(ApiError::NotFound("Tag not found".to_string()));
        }
    }

    let due_query = DueQuery::new(state.config.today(), query.limit()).with_tags(tag_ids);
    let cards = due_cards(state.db.as_ref(), auth.user_id, &due_query).await?;

    tracing::debug!(
        user_id = %auth.user_id,
        as_of = %due_query.as_of,
        count = cards.len(),
        "review session requested"
    );

    if cards.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    Ok(Json(ReviewSessionResponse { cards }).into_response())
}

/// POST /api/flashcards/:id/review
pub async fn submit(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<SubmitReviewRequest>, JsonRejection>,
) -> Result<Json<SubmitReviewResponse>> {
    let card_id = Uuid::parse_str(&id)
        .map_err(|_| ApiError::BadRequest("Invalid flashcard id".to_string()))?;

    let Json(payload) =
        payload.map_err(|e| ApiError::BadRequest(format!("Malformed JSON body: {}", e)))?;

    let quality = Quality::new(payload.quality)?;
    let event = ReviewEvent::new(card_id, quality);

    let applied = state
        .db
        .apply_review(auth.user_id, &event, state.config.today(), &Sm2::default())
        .await?
        .ok_or_else(|| ApiError::NotFound("Flashcard not found".to_string()))?;

    tracing::info!(
        card_id = %card_id,
        quality = quality.value(),
        interval_before = applied.before.interval,
        interval_after = applied.after.interval,
        "review processed"
    );

    Ok(Json(SubmitReviewResponse {
        message: "Review processed successfully.".to_string(),
        next_state: applied.after,
    }))
}
