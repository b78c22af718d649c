// src/handlers/challenge.rs

use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::challenge::{
        CreateBatchChallengeRequest, CreateClassChallengeRequest, CreateStudentChallengeRequest,
        HistoryQuery,
    },
    state::AppState,
    utils::jwt::Claims,
};

/// Creates a class-wide challenge. Teacher only.
pub async fn create_class_challenge(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateClassChallengeRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::Validation(validation_errors.to_string()));
    }

    let teacher_id = claims.user_id()?;
    let challenge = state
        .challenges
        .create_class_challenge(teacher_id, payload)
        .await?;

    Ok((StatusCode::CREATED, Json(challenge)))
}

/// Creates an individual challenge for one student. Teacher only.
pub async fn create_student_challenge(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateStudentChallengeRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::Validation(validation_errors.to_string()));
    }

    let teacher_id = claims.user_id()?;
    let challenge = state
        .challenges
        .create_student_challenge(teacher_id, payload)
        .await?;

    Ok((StatusCode::CREATED, Json(challenge)))
}

/// Creates one individual challenge per student of a class. Teacher only.
pub async fn create_batch_challenges(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateBatchChallengeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let teacher_id = claims.user_id()?;
    let challenges = state
        .challenges
        .create_batch_challenges(teacher_id, payload)
        .await?;

    Ok((StatusCode::CREATED, Json(challenges)))
}

/// Today's challenge for the authenticated user (individual beats class).
pub async fn today_challenge(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let challenge = state.challenges.today(user_id).await?;
    Ok(Json(challenge))
}

/// The authenticated user's challenge history for a date range.
pub async fn challenge_history(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let challenges = state.challenges.history(user_id, query).await?;
    Ok(Json(challenges))
}
