// src/store/memory.rs
//
// In-memory store implementations. The game services are exercised against
// these in the test suite, so the core logic runs without Postgres.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::types::Json;

use crate::{
    error::AppError,
    models::{
        attempt::{Attempt, NewAttempt},
        challenge::{Challenge, ChallengeStatus, ChallengeTransition, NewChallenge},
        chat::ChatUser,
        class::Class,
        user::{NewUser, User},
    },
    store::{
        AttemptStore, ChallengeStore, ChatStore, ChatWordSource, ClassStore, RankingNotifier,
        ScoreSink, UserStore, WordSource,
    },
};

#[derive(Default)]
struct Tables {
    next_id: i64,
    challenges: HashMap<i64, Challenge>,
    attempts: Vec<Attempt>,
    users: HashMap<i64, User>,
    classes: HashMap<i64, Class>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// One shared in-memory "database" covering challenges, attempts, users
/// and classes.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, user: User) {
        let mut t = self.tables.lock().unwrap();
        t.users.insert(user.id, user);
    }

    pub fn add_class(&self, class: Class) {
        let mut t = self.tables.lock().unwrap();
        t.classes.insert(class.id, class);
    }

    pub fn challenge_status(&self, id: i64) -> Option<ChallengeStatus> {
        let t = self.tables.lock().unwrap();
        t.challenges.get(&id).map(|c| c.status)
    }
}

#[async_trait]
impl ChallengeStore for MemoryStore {
    async fn by_id(&self, id: i64) -> Result<Option<Challenge>, AppError> {
        let t = self.tables.lock().unwrap();
        Ok(t.challenges.get(&id).cloned())
    }

    async fn by_date_and_user(
        &self,
        date: NaiveDate,
        user_id: i64,
    ) -> Result<Option<Challenge>, AppError> {
        let t = self.tables.lock().unwrap();
        Ok(t.challenges
            .values()
            .find(|c| c.date == date && c.user_id == Some(user_id))
            .cloned())
    }

    async fn class_challenge(
        &self,
        date: NaiveDate,
        class_id: i64,
    ) -> Result<Option<Challenge>, AppError> {
        let t = self.tables.lock().unwrap();
        Ok(t.challenges
            .values()
            .find(|c| c.date == date && c.class_id == Some(class_id) && c.user_id.is_none())
            .cloned())
    }

    async fn insert(&self, new: NewChallenge) -> Result<Challenge, AppError> {
        let mut t = self.tables.lock().unwrap();
        let duplicate = t.challenges.values().any(|c| {
            c.date == new.date
                && match new.user_id {
                    Some(user_id) => c.user_id == Some(user_id),
                    None => c.user_id.is_none() && c.class_id == new.class_id,
                }
        });
        if duplicate {
            return Err(AppError::Conflict(
                "Challenge already exists for this date".to_string(),
            ));
        }
        let id = t.next_id();
        let challenge = Challenge {
            id,
            date: new.date,
            word: new.word,
            dictionary_id: new.dictionary_id,
            class_id: new.class_id,
            user_id: new.user_id,
            status: ChallengeStatus::Active,
            created_at: Some(Utc::now()),
            updated_at: Some(Utc::now()),
        };
        t.challenges.insert(id, challenge.clone());
        Ok(challenge)
    }

    async fn history(
        &self,
        user_id: i64,
        start: NaiveDate,
        end: NaiveDate,
        limit: i64,
    ) -> Result<Vec<Challenge>, AppError> {
        let t = self.tables.lock().unwrap();
        let mut challenges: Vec<Challenge> = t
            .challenges
            .values()
            .filter(|c| c.user_id == Some(user_id) && c.date >= start && c.date <= end)
            .cloned()
            .collect();
        challenges.sort_by(|a, b| b.date.cmp(&a.date));
        challenges.truncate(limit as usize);
        Ok(challenges)
    }
}

#[async_trait]
impl AttemptStore for MemoryStore {
    async fn count(&self, challenge_id: i64, user_id: i64) -> Result<i64, AppError> {
        let t = self.tables.lock().unwrap();
        Ok(t.attempts
            .iter()
            .filter(|a| a.challenge_id == challenge_id && a.user_id == user_id)
            .count() as i64)
    }

    async fn list(&self, challenge_id: i64, user_id: i64) -> Result<Vec<Attempt>, AppError> {
        let t = self.tables.lock().unwrap();
        let mut attempts: Vec<Attempt> = t
            .attempts
            .iter()
            .filter(|a| a.challenge_id == challenge_id && a.user_id == user_id)
            .cloned()
            .collect();
        attempts.sort_by_key(|a| a.attempt_number);
        Ok(attempts)
    }

    async fn record(
        &self,
        new: NewAttempt,
        transition: Option<ChallengeTransition>,
    ) -> Result<Attempt, AppError> {
        let mut t = self.tables.lock().unwrap();

        // Same guarantee the unique index gives in Postgres.
        let duplicate = t.attempts.iter().any(|a| {
            a.challenge_id == new.challenge_id
                && a.user_id == new.user_id
                && a.attempt_number == new.attempt_number
        });
        if duplicate {
            return Err(AppError::Conflict(
                "Attempt already recorded for this number".to_string(),
            ));
        }

        let id = t.next_id();
        let attempt = Attempt {
            id,
            user_id: new.user_id,
            challenge_id: new.challenge_id,
            attempt_number: new.attempt_number,
            guessed_word: new.guessed_word,
            result: Json(new.result),
            points: new.points,
            completed_at: Some(Utc::now()),
            created_at: Some(Utc::now()),
        };
        t.attempts.push(attempt.clone());

        if let Some(tr) = transition {
            if let Some(challenge) = t.challenges.get_mut(&tr.challenge_id) {
                challenge.status = tr.to;
                challenge.updated_at = Some(Utc::now());
            }
        }

        Ok(attempt)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let t = self.tables.lock().unwrap();
        Ok(t.users.get(&id).cloned())
    }

    async fn by_identity(&self, identity: &str) -> Result<Option<User>, AppError> {
        let t = self.tables.lock().unwrap();
        Ok(t.users
            .values()
            .find(|u| {
                u.login.as_deref() == Some(identity) || u.email.as_deref() == Some(identity)
            })
            .cloned())
    }

    async fn insert(&self, new: NewUser) -> Result<User, AppError> {
        let mut t = self.tables.lock().unwrap();
        let id = t.next_id();
        let user = User {
            id,
            email: new.email,
            login: new.login,
            first_name: new.first_name,
            last_name: new.last_name,
            role: new.role,
            password_hash: new.password_hash,
            class_id: new.class_id,
            created_at: Some(Utc::now()),
        };
        t.users.insert(id, user.clone());
        Ok(user)
    }

    async fn students_of_class(&self, class_id: i64) -> Result<Vec<User>, AppError> {
        let t = self.tables.lock().unwrap();
        let mut students: Vec<User> = t
            .users
            .values()
            .filter(|u| u.class_id == Some(class_id) && u.role == crate::models::user::Role::Student)
            .cloned()
            .collect();
        students.sort_by_key(|u| u.id);
        Ok(students)
    }
}

#[async_trait]
impl ClassStore for MemoryStore {
    async fn by_id(&self, id: i64) -> Result<Option<Class>, AppError> {
        let t = self.tables.lock().unwrap();
        Ok(t.classes.get(&id).cloned())
    }
}

/// Word source handing out one fixed word, for deterministic tests.
pub struct FixedWordSource(pub String);

#[async_trait]
impl WordSource for FixedWordSource {
    async fn random_word(&self, _dictionary_id: i64) -> Result<String, AppError> {
        Ok(self.0.to_uppercase())
    }
}

/// Chat word source cycling through a fixed list.
pub struct CyclingChatWords {
    words: Vec<String>,
    next: Mutex<usize>,
}

impl CyclingChatWords {
    pub fn new(words: Vec<String>) -> Self {
        Self {
            words,
            next: Mutex::new(0),
        }
    }
}

impl ChatWordSource for CyclingChatWords {
    fn new_word(&self) -> String {
        let mut next = self.next.lock().unwrap();
        let word = self.words[*next % self.words.len()].clone();
        *next += 1;
        word.to_uppercase()
    }
}

/// Ranking notifier that records every outcome tuple it receives.
#[derive(Default)]
pub struct RecordingRankingNotifier {
    pub events: Mutex<Vec<(i64, i64, i32, bool)>>,
}

#[async_trait]
impl RankingNotifier for RecordingRankingNotifier {
    async fn attempt_completed(
        &self,
        user_id: i64,
        challenge_id: i64,
        points: i32,
        is_completed: bool,
    ) {
        self.events
            .lock()
            .unwrap()
            .push((user_id, challenge_id, points, is_completed));
    }
}

/// In-memory chat store mirroring the Postgres one; `rotate` holds the
/// single lock across both writes, so it is atomic the same way.
#[derive(Default)]
pub struct MemoryChatStore {
    inner: Mutex<ChatTables>,
}

#[derive(Default)]
struct ChatTables {
    users: HashMap<(String, String), ChatUser>,
    words: HashMap<String, String>,
}

#[async_trait]
impl ChatStore for MemoryChatStore {
    async fn chat_user(
        &self,
        chat_id: &str,
        user_id: &str,
    ) -> Result<Option<ChatUser>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .users
            .get(&(chat_id.to_string(), user_id.to_string()))
            .cloned())
    }

    async fn put_chat_user(&self, user: &ChatUser) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .users
            .insert((user.chat_id.clone(), user.user_id.clone()), user.clone());
        Ok(())
    }

    async fn target_word(&self, chat_id: &str) -> Result<Option<String>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.words.get(chat_id).cloned())
    }

    async fn init_target_word(&self, chat_id: &str, word: &str) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .words
            .entry(chat_id.to_string())
            .or_insert_with(|| word.to_string());
        Ok(())
    }

    async fn rotate(&self, chat_id: &str, new_word: &str) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();
        inner.users.retain(|(chat, _), _| chat != chat_id);
        inner.words.insert(chat_id.to_string(), new_word.to_string());
        Ok(())
    }

    async fn chat_ids(&self) -> Result<Vec<String>, AppError> {
        let inner = self.inner.lock().unwrap();
        let mut ids: Vec<String> = inner.words.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

/// Score sink that records every increment.
#[derive(Default)]
pub struct RecordingScoreSink {
    pub deltas: Mutex<Vec<(String, String, i64)>>,
}

impl RecordingScoreSink {
    pub fn total(&self, chat_id: &str, user_id: &str) -> i64 {
        self.deltas
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, u, _)| c == chat_id && u == user_id)
            .map(|(_, _, d)| d)
            .sum()
    }
}

#[async_trait]
impl ScoreSink for RecordingScoreSink {
    async fn increment(&self, chat_id: &str, user_id: &str, delta: i64) -> Result<(), AppError> {
        self.deltas
            .lock()
            .unwrap()
            .push((chat_id.to_string(), user_id.to_string(), delta));
        Ok(())
    }
}
