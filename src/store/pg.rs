// src/store/pg.rs
//
// Postgres implementations of the store traits. Queries are runtime-checked
// (`query_as` + binds) so the crate builds without a live database.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, types::Json};

use crate::{
    error::AppError,
    models::{
        attempt::{Attempt, NewAttempt},
        challenge::{Challenge, ChallengeTransition, NewChallenge},
        chat::ChatUser,
        class::Class,
        user::{NewUser, User},
    },
    store::{
        AttemptStore, ChallengeStore, ChatStore, ClassStore, ScoreSink, UserStore, WordSource,
    },
};

const CHALLENGE_COLUMNS: &str =
    "id, date, word, dictionary_id, class_id, user_id, status, created_at, updated_at";

#[derive(Clone)]
pub struct PgChallengeStore {
    pool: PgPool,
}

impl PgChallengeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChallengeStore for PgChallengeStore {
    async fn by_id(&self, id: i64) -> Result<Option<Challenge>, AppError> {
        let challenge = sqlx::query_as::<_, Challenge>(&format!(
            "SELECT {CHALLENGE_COLUMNS} FROM daily_challenges WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(challenge)
    }

    async fn by_date_and_user(
        &self,
        date: NaiveDate,
        user_id: i64,
    ) -> Result<Option<Challenge>, AppError> {
        let challenge = sqlx::query_as::<_, Challenge>(&format!(
            "SELECT {CHALLENGE_COLUMNS} FROM daily_challenges WHERE date = $1 AND user_id = $2"
        ))
        .bind(date)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(challenge)
    }

    async fn class_challenge(
        &self,
        date: NaiveDate,
        class_id: i64,
    ) -> Result<Option<Challenge>, AppError> {
        let challenge = sqlx::query_as::<_, Challenge>(&format!(
            "SELECT {CHALLENGE_COLUMNS} FROM daily_challenges \
             WHERE date = $1 AND class_id = $2 AND user_id IS NULL"
        ))
        .bind(date)
        .bind(class_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(challenge)
    }

    async fn insert(&self, new: NewChallenge) -> Result<Challenge, AppError> {
        let challenge = sqlx::query_as::<_, Challenge>(&format!(
            "INSERT INTO daily_challenges (date, word, dictionary_id, class_id, user_id, status) \
             VALUES ($1, $2, $3, $4, $5, 'active') \
             RETURNING {CHALLENGE_COLUMNS}"
        ))
        .bind(new.date)
        .bind(&new.word)
        .bind(new.dictionary_id)
        .bind(new.class_id)
        .bind(new.user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(challenge)
    }

    async fn history(
        &self,
        user_id: i64,
        start: NaiveDate,
        end: NaiveDate,
        limit: i64,
    ) -> Result<Vec<Challenge>, AppError> {
        let challenges = sqlx::query_as::<_, Challenge>(&format!(
            "SELECT {CHALLENGE_COLUMNS} FROM daily_challenges \
             WHERE user_id = $1 AND date BETWEEN $2 AND $3 \
             ORDER BY date DESC LIMIT $4"
        ))
        .bind(user_id)
        .bind(start)
        .bind(end)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(challenges)
    }
}

const ATTEMPT_COLUMNS: &str =
    "id, user_id, challenge_id, attempt_number, guessed_word, result, points, \
     completed_at, created_at";

#[derive(Clone)]
pub struct PgAttemptStore {
    pool: PgPool,
}

impl PgAttemptStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttemptStore for PgAttemptStore {
    async fn count(&self, challenge_id: i64, user_id: i64) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM attempts WHERE challenge_id = $1 AND user_id = $2",
        )
        .bind(challenge_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn list(&self, challenge_id: i64, user_id: i64) -> Result<Vec<Attempt>, AppError> {
        let attempts = sqlx::query_as::<_, Attempt>(&format!(
            "SELECT {ATTEMPT_COLUMNS} FROM attempts \
             WHERE challenge_id = $1 AND user_id = $2 \
             ORDER BY attempt_number ASC"
        ))
        .bind(challenge_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(attempts)
    }

    async fn record(
        &self,
        new: NewAttempt,
        transition: Option<ChallengeTransition>,
    ) -> Result<Attempt, AppError> {
        let mut tx = self.pool.begin().await?;

        let attempt = sqlx::query_as::<_, Attempt>(&format!(
            "INSERT INTO attempts \
             (user_id, challenge_id, attempt_number, guessed_word, result, points, completed_at) \
             VALUES ($1, $2, $3, $4, $5, $6, NOW()) \
             RETURNING {ATTEMPT_COLUMNS}"
        ))
        .bind(new.user_id)
        .bind(new.challenge_id)
        .bind(new.attempt_number)
        .bind(&new.guessed_word)
        .bind(Json(&new.result))
        .bind(new.points)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(t) = transition {
            sqlx::query(
                "UPDATE daily_challenges SET status = $1, updated_at = NOW() WHERE id = $2",
            )
            .bind(t.to.as_str())
            .bind(t.challenge_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(attempt)
    }
}

const USER_COLUMNS: &str =
    "id, email, login, first_name, last_name, role, password_hash, class_id, created_at";

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn by_identity(&self, identity: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE login = $1 OR email = $1"
        ))
        .bind(identity)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn insert(&self, new: NewUser) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users \
             (email, login, first_name, last_name, role, password_hash, class_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&new.email)
        .bind(&new.login)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(new.role.as_str())
        .bind(&new.password_hash)
        .bind(new.class_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn students_of_class(&self, class_id: i64) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE class_id = $1 AND role = 'student'"
        ))
        .bind(class_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }
}

#[derive(Clone)]
pub struct PgClassStore {
    pool: PgPool,
}

impl PgClassStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClassStore for PgClassStore {
    async fn by_id(&self, id: i64) -> Result<Option<Class>, AppError> {
        let class = sqlx::query_as::<_, Class>(
            "SELECT id, teacher_id, name, invitation_code, active_dictionary_id, created_at \
             FROM classes WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(class)
    }
}

/// Random dictionary draw: let the database shuffle.
#[derive(Clone)]
pub struct PgWordSource {
    pool: PgPool,
}

impl PgWordSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WordSource for PgWordSource {
    async fn random_word(&self, dictionary_id: i64) -> Result<String, AppError> {
        let word = sqlx::query_scalar::<_, String>(
            "SELECT word FROM dictionary_words WHERE dictionary_id = $1 \
             ORDER BY RANDOM() LIMIT 1",
        )
        .bind(dictionary_id)
        .fetch_optional(&self.pool)
        .await?;

        word.map(|w| w.to_uppercase())
            .ok_or_else(|| AppError::Validation("Dictionary is empty".to_string()))
    }
}

#[derive(Clone)]
pub struct PgChatStore {
    pool: PgPool,
}

impl PgChatStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChatStore for PgChatStore {
    async fn chat_user(
        &self,
        chat_id: &str,
        user_id: &str,
    ) -> Result<Option<ChatUser>, AppError> {
        let user = sqlx::query_as::<_, ChatUser>(
            "SELECT chat_id, user_id, progress FROM chat_users \
             WHERE chat_id = $1 AND user_id = $2",
        )
        .bind(chat_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn put_chat_user(&self, user: &ChatUser) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO chat_users (chat_id, user_id, progress) VALUES ($1, $2, $3) \
             ON CONFLICT (chat_id, user_id) \
             DO UPDATE SET progress = EXCLUDED.progress, updated_at = NOW()",
        )
        .bind(&user.chat_id)
        .bind(&user.user_id)
        .bind(&user.progress)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn target_word(&self, chat_id: &str) -> Result<Option<String>, AppError> {
        let word =
            sqlx::query_scalar::<_, String>("SELECT word FROM chat_words WHERE chat_id = $1")
                .bind(chat_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(word)
    }

    async fn init_target_word(&self, chat_id: &str, word: &str) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO chat_words (chat_id, word) VALUES ($1, $2) \
             ON CONFLICT (chat_id) DO NOTHING",
        )
        .bind(chat_id)
        .bind(word)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    // The Postgres transaction is what makes rotation atomic: a reader
    // never sees the new word next to pre-rotation progress.
    async fn rotate(&self, chat_id: &str, new_word: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM chat_users WHERE chat_id = $1")
            .bind(chat_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO chat_words (chat_id, word) VALUES ($1, $2) \
             ON CONFLICT (chat_id) DO UPDATE SET word = EXCLUDED.word, updated_at = NOW()",
        )
        .bind(chat_id)
        .bind(new_word)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn chat_ids(&self) -> Result<Vec<String>, AppError> {
        let ids = sqlx::query_scalar::<_, String>("SELECT chat_id FROM chat_words")
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }
}

/// Score keeper backed by the 'chat_scores' table, which rotation leaves
/// alone.
#[derive(Clone)]
pub struct PgScoreSink {
    pool: PgPool,
}

impl PgScoreSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScoreSink for PgScoreSink {
    async fn increment(&self, chat_id: &str, user_id: &str, delta: i64) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO chat_scores (chat_id, user_id, score) VALUES ($1, $2, $3) \
             ON CONFLICT (chat_id, user_id) \
             DO UPDATE SET score = chat_scores.score + EXCLUDED.score, updated_at = NOW()",
        )
        .bind(chat_id)
        .bind(user_id)
        .bind(delta)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
