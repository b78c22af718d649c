// src/game/attempts.rs

use std::sync::Arc;

use crate::{
    error::AppError,
    game::{
        challenges::ChallengeService,
        evaluator::{self, WORD_LENGTH},
    },
    models::{
        attempt::{Attempt, NewAttempt},
        challenge::{Challenge, ChallengeStatus},
    },
    store::{AttemptStore, ChallengeStore, RankingNotifier, UserStore},
};

/// A challenge allows at most this many attempts per user; the 6th always
/// settles it one way or the other.
pub const MAX_ATTEMPTS: i32 = 6;

/// Points awarded for a correct guess, keyed by attempt number.
pub fn points_for(attempt_number: i32, is_correct: bool) -> i32 {
    if !is_correct {
        return 0;
    }
    match attempt_number {
        1 => 100,
        2 => 80,
        3 => 60,
        4 => 40,
        5 => 20,
        6 => 10,
        _ => 0,
    }
}

/// The attempt lifecycle: validates a submission, scores it, numbers it,
/// and settles the challenge when it ends.
#[derive(Clone)]
pub struct AttemptService {
    challenges: Arc<dyn ChallengeStore>,
    attempts: Arc<dyn AttemptStore>,
    users: Arc<dyn UserStore>,
    resolver: ChallengeService,
    ranking: Arc<dyn RankingNotifier>,
}

impl AttemptService {
    pub fn new(
        challenges: Arc<dyn ChallengeStore>,
        attempts: Arc<dyn AttemptStore>,
        users: Arc<dyn UserStore>,
        resolver: ChallengeService,
        ranking: Arc<dyn RankingNotifier>,
    ) -> Self {
        Self {
            challenges,
            attempts,
            users,
            resolver,
            ranking,
        }
    }

    /// Submits one guess. Without an explicit challenge id the guess goes
    /// against today's challenge for the user.
    pub async fn submit(
        &self,
        guessed_word: &str,
        user_id: i64,
        challenge_id: Option<i64>,
    ) -> Result<Attempt, AppError> {
        let challenge = match challenge_id {
            Some(id) => self
                .challenges
                .by_id(id)
                .await?
                .ok_or_else(|| AppError::NotFound("Challenge not found".to_string()))?,
            None => self.resolver.today(user_id).await?,
        };

        self.authorize(&challenge, user_id).await?;

        // Cap before status: the 7th submission reports the exhausted cap,
        // not the (already expired) challenge state.
        let prior = self.attempts.count(challenge.id, user_id).await?;
        if prior >= MAX_ATTEMPTS as i64 {
            return Err(AppError::LimitExceeded(
                "Maximum attempts reached".to_string(),
            ));
        }

        if challenge.status != ChallengeStatus::Active {
            return Err(AppError::InvalidState(
                "Challenge is not active".to_string(),
            ));
        }

        let guessed = evaluator::normalize_word(guessed_word, WORD_LENGTH)?;
        let target = challenge.word.to_uppercase();

        let attempt_number = (prior + 1) as i32;
        let result = evaluator::evaluate(&guessed, &target)?;
        let is_correct = result.is_correct;
        let points = points_for(attempt_number, is_correct);

        let is_completed = is_correct || attempt_number >= MAX_ATTEMPTS;
        let transition = if is_completed {
            Some(challenge.close(is_correct)?)
        } else {
            None
        };

        let attempt = self
            .attempts
            .record(
                NewAttempt {
                    user_id,
                    challenge_id: challenge.id,
                    attempt_number,
                    guessed_word: guessed,
                    result,
                    points,
                },
                transition,
            )
            .await?;

        if is_completed {
            // Fire-and-forget hand-off to the ranking consumer.
            self.ranking
                .attempt_completed(user_id, challenge.id, points, is_completed)
                .await;
        }

        Ok(attempt)
    }

    /// Attempts for one (challenge, user), ordered by attempt number.
    pub async fn list(&self, challenge_id: i64, user_id: i64) -> Result<Vec<Attempt>, AppError> {
        let challenge = self
            .challenges
            .by_id(challenge_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Challenge not found".to_string()))?;

        if let Some(owner) = challenge.user_id {
            if owner != user_id {
                return Err(AppError::Forbidden(
                    "You don't have permission to view attempts for this challenge".to_string(),
                ));
            }
        }

        self.attempts.list(challenge_id, user_id).await
    }

    async fn authorize(&self, challenge: &Challenge, user_id: i64) -> Result<(), AppError> {
        if let Some(owner) = challenge.user_id {
            if owner != user_id {
                return Err(AppError::Forbidden(
                    "You don't have permission to make attempts for this challenge".to_string(),
                ));
            }
            return Ok(());
        }

        if let Some(class_id) = challenge.class_id {
            let user = self
                .users
                .by_id(user_id)
                .await?
                .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
            if user.class_id != Some(class_id) {
                return Err(AppError::Forbidden(
                    "You don't have permission to make attempts for this challenge".to_string(),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_schedule() {
        assert_eq!(points_for(1, true), 100);
        assert_eq!(points_for(2, true), 80);
        assert_eq!(points_for(3, true), 60);
        assert_eq!(points_for(4, true), 40);
        assert_eq!(points_for(5, true), 20);
        assert_eq!(points_for(6, true), 10);
        assert_eq!(points_for(7, true), 0);
    }

    #[test]
    fn incorrect_guesses_never_score() {
        for n in 1..=6 {
            assert_eq!(points_for(n, false), 0);
        }
    }
}
