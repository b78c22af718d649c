// src/models/chat.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use validator::Validate;

use crate::game::evaluator::GuessResult;

/// Accumulated state of one player's game in a chat: every prior guess
/// result plus whether the word has been found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub won: bool,
    pub tries: Vec<GuessResult>,
}

impl Progress {
    pub fn empty() -> Self {
        Self {
            won: false,
            tries: Vec::new(),
        }
    }
}

/// Represents the 'chat_users' table: one row per (chat, user) session.
/// Created lazily on first interaction, wiped in bulk on word rotation.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ChatUser {
    pub chat_id: String,
    pub user_id: String,
    pub progress: Json<Progress>,
}

impl ChatUser {
    pub fn new(chat_id: String, user_id: String) -> Self {
        Self {
            chat_id,
            user_id,
            progress: Json(Progress::empty()),
        }
    }
}

/// Represents the 'chat_scores' table. Scores survive word rotation.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ChatScore {
    pub chat_id: String,
    pub user_id: String,
    pub score: i64,
}

/// DTO for a chat guess submission.
#[derive(Debug, Deserialize, Validate)]
pub struct ChatGuessRequest {
    #[validate(length(min = 1, max = 50))]
    pub word: String,
}
