// src/models/challenge.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::error::AppError;

/// Lifecycle status of a daily challenge.
///
/// Transitions only move forward: `Active -> Completed` on a correct guess,
/// `Active -> Expired` when attempts run out. Both end states are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeStatus {
    Active,
    Completed,
    Expired,
}

impl ChallengeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengeStatus::Active => "active",
            ChallengeStatus::Completed => "completed",
            ChallengeStatus::Expired => "expired",
        }
    }
}

impl TryFrom<String> for ChallengeStatus {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "active" => Ok(ChallengeStatus::Active),
            "completed" => Ok(ChallengeStatus::Completed),
            "expired" => Ok(ChallengeStatus::Expired),
            other => Err(AppError::InternalServerError(format!(
                "Unknown challenge status '{}' in database",
                other
            ))),
        }
    }
}

/// Represents the 'daily_challenges' table in the database.
/// Exactly one of `class_id` / `user_id` is set: a challenge belongs either
/// to a whole class or to a single student.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Challenge {
    pub id: i64,

    pub date: NaiveDate,

    /// The target word, uppercase. Never serialized: the word must not
    /// leak to clients while the challenge is being played.
    #[serde(skip)]
    pub word: String,

    pub dictionary_id: Option<i64>,
    pub class_id: Option<i64>,
    pub user_id: Option<i64>,

    #[sqlx(try_from = "String")]
    pub status: ChallengeStatus,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// A pending status change produced by the attempt lifecycle.
///
/// Challenges are not mutated in place; the lifecycle computes this event
/// and the store applies it in the same transaction as the attempt insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChallengeTransition {
    pub challenge_id: i64,
    pub to: ChallengeStatus,
}

impl Challenge {
    /// Computes the terminal transition for this challenge.
    /// Fails when the challenge is not active: there is no way out of
    /// `Completed` or `Expired`.
    pub fn close(&self, correct: bool) -> Result<ChallengeTransition, AppError> {
        if self.status != ChallengeStatus::Active {
            return Err(AppError::InvalidState(
                "Challenge is not active".to_string(),
            ));
        }
        let to = if correct {
            ChallengeStatus::Completed
        } else {
            ChallengeStatus::Expired
        };
        Ok(ChallengeTransition {
            challenge_id: self.id,
            to,
        })
    }
}

/// Insertable challenge record. Built through the scoped constructors so
/// that `class_id` and `user_id` can never both be set.
#[derive(Debug, Clone)]
pub struct NewChallenge {
    pub date: NaiveDate,
    pub word: String,
    pub dictionary_id: Option<i64>,
    pub class_id: Option<i64>,
    pub user_id: Option<i64>,
}

impl NewChallenge {
    pub fn for_class(date: NaiveDate, word: String, dictionary_id: Option<i64>, class_id: i64) -> Self {
        Self {
            date,
            word,
            dictionary_id,
            class_id: Some(class_id),
            user_id: None,
        }
    }

    pub fn for_student(date: NaiveDate, word: String, dictionary_id: Option<i64>, user_id: i64) -> Self {
        Self {
            date,
            word,
            dictionary_id,
            class_id: None,
            user_id: Some(user_id),
        }
    }
}

/// DTO for creating a class-wide challenge.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateClassChallengeRequest {
    pub class_id: i64,
    pub date: Option<NaiveDate>,
    pub dictionary_id: Option<i64>,
    #[validate(length(min = 5, max = 5))]
    pub word: Option<String>,
}

/// DTO for creating an individual student challenge.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateStudentChallengeRequest {
    pub student_id: i64,
    pub date: Option<NaiveDate>,
    pub dictionary_id: i64,
    #[validate(length(min = 5, max = 5))]
    pub word: Option<String>,
}

/// DTO for creating one individual challenge per student of a class.
#[derive(Debug, Deserialize)]
pub struct CreateBatchChallengeRequest {
    pub class_id: i64,
    pub date: Option<NaiveDate>,
    pub dictionary_id: i64,
}

/// Query parameters for the challenge history listing.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub limit: Option<i64>,
}
