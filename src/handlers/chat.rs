// src/handlers/chat.rs
//
// Bot-facing surface of the chat game. Identified by opaque chat/user ids
// from the messaging platform, not by JWT accounts.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::chat::{ChatGuessRequest, ChatScore},
    state::AppState,
};

/// Current progress for a (chat, user) pair. Creates the session and the
/// chat's target word lazily.
pub async fn get_progress(
    State(state): State<AppState>,
    Path((chat_id, user_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let progress = state.chat.progress(&chat_id, &user_id).await?;
    Ok(Json(progress))
}

/// Submits one guess for a (chat, user) pair and returns the updated
/// progress.
pub async fn post_guess(
    State(state): State<AppState>,
    Path((chat_id, user_id)): Path<(String, String)>,
    Json(payload): Json<ChatGuessRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::Validation(validation_errors.to_string()));
    }

    let progress = state
        .chat
        .submit_guess(&chat_id, &user_id, &payload.word)
        .await?;
    Ok(Json(progress))
}

/// Retrieves the top scores for a chat.
pub async fn get_scores(
    State(pool): State<PgPool>,
    Path(chat_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let scores = sqlx::query_as::<_, ChatScore>(
        "SELECT chat_id, user_id, score FROM chat_scores \
         WHERE chat_id = $1 ORDER BY score DESC LIMIT 10",
    )
    .bind(chat_id)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch chat scores: {:?}", e);
        AppError::from(e)
    })?;

    Ok(Json(scores))
}
