// src/store/mod.rs
//
// Trait seams for every external collaborator the game core consumes.
// `pg` holds the Postgres implementations used by the running server;
// `memory` holds in-memory implementations used by the test suite.

pub mod memory;
pub mod pg;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{
    error::AppError,
    models::{
        attempt::{Attempt, NewAttempt},
        challenge::{Challenge, ChallengeTransition, NewChallenge},
        chat::ChatUser,
        class::Class,
        user::{NewUser, User},
    },
};

#[async_trait]
pub trait ChallengeStore: Send + Sync {
    async fn by_id(&self, id: i64) -> Result<Option<Challenge>, AppError>;

    async fn by_date_and_user(
        &self,
        date: NaiveDate,
        user_id: i64,
    ) -> Result<Option<Challenge>, AppError>;

    /// Class-wide challenge for the date: class-scoped rows only, never
    /// rows that also carry an individual user binding.
    async fn class_challenge(
        &self,
        date: NaiveDate,
        class_id: i64,
    ) -> Result<Option<Challenge>, AppError>;

    async fn insert(&self, new: NewChallenge) -> Result<Challenge, AppError>;

    async fn history(
        &self,
        user_id: i64,
        start: NaiveDate,
        end: NaiveDate,
        limit: i64,
    ) -> Result<Vec<Challenge>, AppError>;
}

#[async_trait]
pub trait AttemptStore: Send + Sync {
    async fn count(&self, challenge_id: i64, user_id: i64) -> Result<i64, AppError>;

    /// Attempts for one (challenge, user), ordered by attempt_number.
    async fn list(&self, challenge_id: i64, user_id: i64) -> Result<Vec<Attempt>, AppError>;

    /// Inserts the attempt and applies the challenge transition (if any)
    /// in one transaction. A duplicate attempt_number from a racing
    /// submission fails the insert with `Conflict`.
    async fn record(
        &self,
        new: NewAttempt,
        transition: Option<ChallengeTransition>,
    ) -> Result<Attempt, AppError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    /// Lookup by login or email, for authentication.
    async fn by_identity(&self, identity: &str) -> Result<Option<User>, AppError>;

    async fn insert(&self, new: NewUser) -> Result<User, AppError>;

    async fn students_of_class(&self, class_id: i64) -> Result<Vec<User>, AppError>;
}

#[async_trait]
pub trait ClassStore: Send + Sync {
    async fn by_id(&self, id: i64) -> Result<Option<Class>, AppError>;
}

/// Injectable word supply for challenge creation, so tests can hand out
/// deterministic words.
#[async_trait]
pub trait WordSource: Send + Sync {
    /// A random word from the dictionary; `Validation` when it is empty.
    async fn random_word(&self, dictionary_id: i64) -> Result<String, AppError>;
}

/// Downstream ranking collaborator, notified after a completing attempt.
/// Fire-and-forget: failures are the implementation's problem, never the
/// lifecycle's.
#[async_trait]
pub trait RankingNotifier: Send + Sync {
    async fn attempt_completed(
        &self,
        user_id: i64,
        challenge_id: i64,
        points: i32,
        is_completed: bool,
    );
}

#[async_trait]
pub trait ChatStore: Send + Sync {
    async fn chat_user(&self, chat_id: &str, user_id: &str)
    -> Result<Option<ChatUser>, AppError>;

    async fn put_chat_user(&self, user: &ChatUser) -> Result<(), AppError>;

    async fn target_word(&self, chat_id: &str) -> Result<Option<String>, AppError>;

    /// Sets the chat's target word only when none exists yet.
    async fn init_target_word(&self, chat_id: &str, word: &str) -> Result<(), AppError>;

    /// Atomically wipes every member's progress for the chat and installs
    /// the new target word. Concurrent readers see either the fully-old or
    /// the fully-new state, never a mix.
    async fn rotate(&self, chat_id: &str, new_word: &str) -> Result<(), AppError>;

    /// Every chat that currently has a target word.
    async fn chat_ids(&self) -> Result<Vec<String>, AppError>;
}

/// External score keeper for the chat variant.
#[async_trait]
pub trait ScoreSink: Send + Sync {
    async fn increment(&self, chat_id: &str, user_id: &str, delta: i64) -> Result<(), AppError>;
}

/// Supplies fresh target words for chat rotation.
pub trait ChatWordSource: Send + Sync {
    fn new_word(&self) -> String;
}

/// Default ranking notifier: logs the outcome tuple the downstream
/// ranking consumer needs.
pub struct LogRankingNotifier;

#[async_trait]
impl RankingNotifier for LogRankingNotifier {
    async fn attempt_completed(
        &self,
        user_id: i64,
        challenge_id: i64,
        points: i32,
        is_completed: bool,
    ) {
        tracing::info!(
            user_id,
            challenge_id,
            points,
            is_completed,
            "challenge attempt completed"
        );
    }
}

/// Built-in word list for chat rotation.
pub struct BuiltinChatWords;

const CHAT_WORDS: &[&str] = &["FRUIT", "JUICE", "BRAVE", "FIGHT"];

impl ChatWordSource for BuiltinChatWords {
    fn new_word(&self) -> String {
        use rand::seq::IndexedRandom;

        let mut rng = rand::rng();
        CHAT_WORDS
            .choose(&mut rng)
            .copied()
            .unwrap_or(CHAT_WORDS[0])
            .to_string()
    }
}
