// src/handlers/attempt.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError, models::attempt::SubmitAttemptRequest, state::AppState, utils::jwt::Claims,
};

/// Submits a guess against a challenge (today's, unless an explicit
/// challenge id is given). Returns the recorded attempt with its
/// per-letter coloring and points.
pub async fn submit_attempt(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<SubmitAttemptRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::Validation(validation_errors.to_string()));
    }

    let user_id = claims.user_id()?;
    let attempt = state
        .attempts
        .submit(&payload.guessed_word, user_id, payload.challenge_id)
        .await?;

    Ok((StatusCode::CREATED, Json(attempt)))
}

/// Lists the authenticated user's attempts for a challenge, ordered by
/// attempt number.
pub async fn list_attempts(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(challenge_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let attempts = state.attempts.list(challenge_id, user_id).await?;
    Ok(Json(attempts))
}
