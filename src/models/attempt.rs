// src/models/attempt.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use validator::Validate;

use crate::game::evaluator::GuessResult;

/// Represents the 'attempts' table in the database.
/// One row per guess submission; immutable after creation.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Attempt {
    pub id: i64,
    pub user_id: i64,
    pub challenge_id: i64,

    /// 1-based, contiguous per (challenge, user), capped at 6.
    pub attempt_number: i32,

    pub guessed_word: String,

    /// Per-letter classification, stored as JSONB.
    pub result: Json<GuessResult>,

    pub points: i32,

    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Insertable attempt record.
#[derive(Debug, Clone)]
pub struct NewAttempt {
    pub user_id: i64,
    pub challenge_id: i64,
    pub attempt_number: i32,
    pub guessed_word: String,
    pub result: GuessResult,
    pub points: i32,
}

/// DTO for submitting a guess. Without `challenge_id` the attempt goes
/// against today's challenge for the submitter.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitAttemptRequest {
    #[validate(length(min = 1, max = 50))]
    pub guessed_word: String,
    pub challenge_id: Option<i64>,
}
