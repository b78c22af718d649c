// src/game/challenges.rs

use std::sync::Arc;

use chrono::{Days, Utc};

use crate::{
    error::AppError,
    game::evaluator::{WORD_LENGTH, normalize_word},
    models::{
        challenge::{
            Challenge, CreateBatchChallengeRequest, CreateClassChallengeRequest,
            CreateStudentChallengeRequest, HistoryQuery, NewChallenge,
        },
        user::Role,
    },
    store::{ChallengeStore, ClassStore, UserStore, WordSource},
};

const DEFAULT_HISTORY_DAYS: u64 = 30;
const DEFAULT_HISTORY_LIMIT: i64 = 30;

/// Challenge resolution and creation.
///
/// Resolution precedence: an individual challenge dated today beats the
/// class challenge dated today, always.
#[derive(Clone)]
pub struct ChallengeService {
    challenges: Arc<dyn ChallengeStore>,
    users: Arc<dyn UserStore>,
    classes: Arc<dyn ClassStore>,
    words: Arc<dyn WordSource>,
}

impl ChallengeService {
    pub fn new(
        challenges: Arc<dyn ChallengeStore>,
        users: Arc<dyn UserStore>,
        classes: Arc<dyn ClassStore>,
        words: Arc<dyn WordSource>,
    ) -> Self {
        Self {
            challenges,
            users,
            classes,
            words,
        }
    }

    /// Today's challenge for the user: their own first, then their class's.
    pub async fn today(&self, user_id: i64) -> Result<Challenge, AppError> {
        let today = Utc::now().date_naive();

        if let Some(individual) = self.challenges.by_date_and_user(today, user_id).await? {
            return Ok(individual);
        }

        let user = self
            .users
            .by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if let Some(class_id) = user.class_id {
            if let Some(class_challenge) =
                self.challenges.class_challenge(today, class_id).await?
            {
                return Ok(class_challenge);
            }
        }

        Err(AppError::NotFound(
            "Challenge not found for today".to_string(),
        ))
    }

    pub async fn create_class_challenge(
        &self,
        teacher_id: i64,
        req: CreateClassChallengeRequest,
    ) -> Result<Challenge, AppError> {
        let class = self
            .classes
            .by_id(req.class_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Class not found".to_string()))?;

        if class.teacher_id != teacher_id {
            return Err(AppError::Forbidden(
                "You don't have permission to create challenges for this class".to_string(),
            ));
        }

        let date = req.date.unwrap_or_else(|| Utc::now().date_naive());
        let dictionary_id = req
            .dictionary_id
            .or(class.active_dictionary_id)
            .ok_or_else(|| AppError::Validation("Dictionary ID is required".to_string()))?;

        if self
            .challenges
            .class_challenge(date, req.class_id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "Challenge already exists for this class on this date".to_string(),
            ));
        }

        let word = self.resolve_word(req.word, dictionary_id).await?;
        self.challenges
            .insert(NewChallenge::for_class(
                date,
                word,
                Some(dictionary_id),
                req.class_id,
            ))
            .await
    }

    pub async fn create_student_challenge(
        &self,
        teacher_id: i64,
        req: CreateStudentChallengeRequest,
    ) -> Result<Challenge, AppError> {
        let student = self
            .users
            .by_id(req.student_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Student not found".to_string()))?;

        if student.role != Role::Student {
            return Err(AppError::Validation("User is not a student".to_string()));
        }

        // The teacher must own the student's class (if any).
        if let Some(class_id) = student.class_id {
            let class = self
                .classes
                .by_id(class_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Class not found".to_string()))?;
            if class.teacher_id != teacher_id {
                return Err(AppError::Forbidden(
                    "You don't have permission to create challenges for this student".to_string(),
                ));
            }
        }

        let date = req.date.unwrap_or_else(|| Utc::now().date_naive());

        if self
            .challenges
            .by_date_and_user(date, req.student_id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "Challenge already exists for this student on this date".to_string(),
            ));
        }

        let word = self.resolve_word(req.word, req.dictionary_id).await?;
        self.challenges
            .insert(NewChallenge::for_student(
                date,
                word,
                Some(req.dictionary_id),
                req.student_id,
            ))
            .await
    }

    /// One individual challenge per student of the class, each with its own
    /// random word. Students who already have a challenge that day are
    /// skipped, not failed.
    pub async fn create_batch_challenges(
        &self,
        teacher_id: i64,
        req: CreateBatchChallengeRequest,
    ) -> Result<Vec<Challenge>, AppError> {
        let class = self
            .classes
            .by_id(req.class_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Class not found".to_string()))?;

        if class.teacher_id != teacher_id {
            return Err(AppError::Forbidden(
                "You don't have permission to create challenges for this class".to_string(),
            ));
        }

        let students = self.users.students_of_class(req.class_id).await?;
        if students.is_empty() {
            return Err(AppError::Validation(
                "No students found in this class".to_string(),
            ));
        }

        let date = req.date.unwrap_or_else(|| Utc::now().date_naive());
        let mut created = Vec::new();

        for student in students {
            if self
                .challenges
                .by_date_and_user(date, student.id)
                .await?
                .is_some()
            {
                continue;
            }

            let word = self.words.random_word(req.dictionary_id).await?;
            let challenge = self
                .challenges
                .insert(NewChallenge::for_student(
                    date,
                    word,
                    Some(req.dictionary_id),
                    student.id,
                ))
                .await?;
            created.push(challenge);
        }

        Ok(created)
    }

    pub async fn history(
        &self,
        user_id: i64,
        query: HistoryQuery,
    ) -> Result<Vec<Challenge>, AppError> {
        let today = Utc::now().date_naive();
        let start = query.start_date.unwrap_or_else(|| {
            today
                .checked_sub_days(Days::new(DEFAULT_HISTORY_DAYS))
                .unwrap_or(today)
        });
        let end = query.end_date.unwrap_or(today);
        let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT).clamp(1, 100);

        self.challenges.history(user_id, start, end, limit).await
    }

    async fn resolve_word(
        &self,
        explicit: Option<String>,
        dictionary_id: i64,
    ) -> Result<String, AppError> {
        match explicit {
            Some(word) => normalize_word(&word, WORD_LENGTH),
            None => self.words.random_word(dictionary_id).await,
        }
    }
}
