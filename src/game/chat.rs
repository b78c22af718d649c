// src/game/chat.rs

use std::sync::Arc;
use std::time::Duration;

use crate::{
    error::AppError,
    game::evaluator,
    models::chat::{ChatUser, Progress},
    store::{ChatStore, ChatWordSource, ScoreSink},
};

/// Prior tries allowed before a guess is rejected. Deliberately one less
/// than the daily game's cap of 6: the chat variant is the harder game,
/// matching its original tuning.
pub const MAX_TRIES: usize = 5;

/// The chat game: lightweight per-(chat, user) progress over a per-chat
/// rotating target word. No challenge or attempt entities.
#[derive(Clone)]
pub struct ChatGameService {
    store: Arc<dyn ChatStore>,
    scores: Arc<dyn ScoreSink>,
    words: Arc<dyn ChatWordSource>,
}

impl ChatGameService {
    pub fn new(
        store: Arc<dyn ChatStore>,
        scores: Arc<dyn ScoreSink>,
        words: Arc<dyn ChatWordSource>,
    ) -> Self {
        Self {
            store,
            scores,
            words,
        }
    }

    /// Current progress for a (chat, user) pair, lazily creating both the
    /// session and the chat's target word on first contact.
    pub async fn progress(&self, chat_id: &str, user_id: &str) -> Result<Progress, AppError> {
        let (user, _target) = self.ensure_session(chat_id, user_id).await?;
        Ok(user.progress.0)
    }

    pub async fn submit_guess(
        &self,
        chat_id: &str,
        user_id: &str,
        raw_word: &str,
    ) -> Result<Progress, AppError> {
        let (mut user, target) = self.ensure_session(chat_id, user_id).await?;
        let progress = &mut user.progress.0;

        if progress.won {
            return Err(AppError::InvalidState("User already won".to_string()));
        }
        if progress.tries.len() >= MAX_TRIES {
            return Err(AppError::LimitExceeded("User already lost".to_string()));
        }

        let guessed = raw_word.trim().to_uppercase();
        let result = evaluator::evaluate(&guessed, &target.to_uppercase())?;

        progress.won = result.is_correct;
        progress.tries.push(result);

        if progress.won {
            // Earlier wins pay more; failures here must not lose the guess.
            let delta = 6 - progress.tries.len() as i64;
            if let Err(e) = self.scores.increment(chat_id, user_id, delta).await {
                tracing::warn!("Failed to increment score for {}:{}: {}", chat_id, user_id, e);
            }
        }

        let updated = user.progress.0.clone();
        self.store.put_chat_user(&user).await?;
        Ok(updated)
    }

    /// Installs a fresh word for the chat and wipes all member progress,
    /// atomically.
    pub async fn rotate_chat(&self, chat_id: &str) -> Result<(), AppError> {
        let word = self.words.new_word();
        self.store.rotate(chat_id, &word).await?;
        tracing::info!("Word rotated for chat {}", chat_id);
        Ok(())
    }

    /// Rotates every known chat and returns the number of chats rotated.
    /// One failing chat must not block the rest of the sweep; the task
    /// picks the stragglers up on its next tick.
    pub async fn rotate_all(&self) -> Result<usize, AppError> {
        let chats = self.store.chat_ids().await?;
        let mut rotated = 0;
        for chat_id in chats {
            match self.rotate_chat(&chat_id).await {
                Ok(()) => rotated += 1,
                Err(e) => {
                    tracing::error!("Failed to rotate word for chat {}: {}", chat_id, e);
                }
            }
        }
        Ok(rotated)
    }

    async fn ensure_session(
        &self,
        chat_id: &str,
        user_id: &str,
    ) -> Result<(ChatUser, String), AppError> {
        let target = match self.store.target_word(chat_id).await? {
            Some(word) => word,
            None => {
                self.store
                    .init_target_word(chat_id, &self.words.new_word())
                    .await?;
                // Re-read: a concurrent initializer may have won the race.
                self.store.target_word(chat_id).await?.ok_or_else(|| {
                    AppError::InternalServerError(format!(
                        "Target word missing for chat {} after init",
                        chat_id
                    ))
                })?
            }
        };

        let user = match self.store.chat_user(chat_id, user_id).await? {
            Some(user) => user,
            None => {
                let user = ChatUser::new(chat_id.to_string(), user_id.to_string());
                self.store.put_chat_user(&user).await?;
                user
            }
        };

        Ok((user, target))
    }
}

/// Background rotation driver: periodically refreshes every chat's word.
pub async fn run_rotation(service: ChatGameService, period: Duration) {
    let mut interval = tokio::time::interval(period);
    // The first tick fires immediately; skip it so a fresh deploy does not
    // wipe everyone's morning progress.
    interval.tick().await;

    loop {
        interval.tick().await;
        tracing::info!("Starting word rotation");
        match service.rotate_all().await {
            Ok(count) => tracing::info!("Finished word rotation for {} chats", count),
            Err(e) => tracing::error!("Word rotation failed: {}", e),
        }
    }
}
