// tests/lifecycle_tests.rs
//
// Attempt lifecycle and daily resolution, exercised over the in-memory
// stores so no database is needed.

use std::sync::Arc;

use chrono::{Days, Utc};
use wordle_backend::error::AppError;
use wordle_backend::game::attempts::AttemptService;
use wordle_backend::game::challenges::ChallengeService;
use wordle_backend::game::evaluator;
use wordle_backend::models::attempt::NewAttempt;
use wordle_backend::models::challenge::{
    Challenge, ChallengeStatus, CreateBatchChallengeRequest, CreateClassChallengeRequest,
    HistoryQuery, NewChallenge,
};
use wordle_backend::models::class::Class;
use wordle_backend::models::user::{Role, User};
use wordle_backend::store::memory::{FixedWordSource, MemoryStore, RecordingRankingNotifier};
use wordle_backend::store::{AttemptStore, ChallengeStore};

struct Harness {
    store: Arc<MemoryStore>,
    ranking: Arc<RecordingRankingNotifier>,
    challenges: ChallengeService,
    attempts: AttemptService,
}

fn harness(dictionary_word: &str) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let ranking = Arc::new(RecordingRankingNotifier::default());
    let challenges = ChallengeService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        Arc::new(FixedWordSource(dictionary_word.to_string())),
    );
    let attempts = AttemptService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        challenges.clone(),
        ranking.clone(),
    );
    Harness {
        store,
        ranking,
        challenges,
        attempts,
    }
}

fn student(id: i64, class_id: Option<i64>) -> User {
    User {
        id,
        email: None,
        login: Some(format!("student{}", id)),
        first_name: "Student".to_string(),
        last_name: "Test".to_string(),
        role: Role::Student,
        password_hash: "hash".to_string(),
        class_id,
        created_at: None,
    }
}

fn class(id: i64, teacher_id: i64) -> Class {
    Class {
        id,
        teacher_id,
        name: format!("Class {}", id),
        invitation_code: format!("code-{}", id),
        active_dictionary_id: None,
        created_at: None,
    }
}

async fn seed_student_challenge(h: &Harness, user_id: i64, word: &str) -> Challenge {
    h.store.add_user(student(user_id, None));
    h.store
        .insert(NewChallenge::for_student(
            Utc::now().date_naive(),
            word.to_string(),
            None,
            user_id,
        ))
        .await
        .unwrap()
}

#[tokio::test]
async fn winning_on_the_third_attempt_scores_sixty() {
    let h = harness("RIVER");
    let challenge = seed_student_challenge(&h, 1, "RIVER").await;

    let first = h.attempts.submit("TABLE", 1, Some(challenge.id)).await.unwrap();
    assert_eq!(first.attempt_number, 1);
    assert_eq!(first.points, 0);
    assert!(!first.result.0.is_correct);

    let second = h.attempts.submit("RIVAL", 1, Some(challenge.id)).await.unwrap();
    assert_eq!(second.attempt_number, 2);
    assert_eq!(second.points, 0);

    let third = h.attempts.submit("RIVER", 1, Some(challenge.id)).await.unwrap();
    assert_eq!(third.attempt_number, 3);
    assert_eq!(third.points, 60);
    assert!(third.result.0.is_correct);

    assert_eq!(
        h.store.challenge_status(challenge.id),
        Some(ChallengeStatus::Completed)
    );

    // Further guesses hit the settled challenge, not the attempt cap.
    let err = h.attempts.submit("RIVER", 1, Some(challenge.id)).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)), "{:?}", err);

    // The ranking collaborator got exactly one completion tuple.
    let events = h.ranking.events.lock().unwrap().clone();
    assert_eq!(events, vec![(1, challenge.id, 60, true)]);
}

#[tokio::test]
async fn six_wrong_guesses_expire_the_challenge() {
    let h = harness("RIVER");
    let challenge = seed_student_challenge(&h, 1, "RIVER").await;

    for n in 1..=6 {
        let attempt = h.attempts.submit("TABLE", 1, Some(challenge.id)).await.unwrap();
        assert_eq!(attempt.attempt_number, n);
        assert_eq!(attempt.points, 0);
    }

    assert_eq!(
        h.store.challenge_status(challenge.id),
        Some(ChallengeStatus::Expired)
    );

    // The 7th submission onward reports the exhausted cap.
    let err = h.attempts.submit("TABLE", 1, Some(challenge.id)).await.unwrap_err();
    assert!(matches!(err, AppError::LimitExceeded(_)), "{:?}", err);

    let events = h.ranking.events.lock().unwrap().clone();
    assert_eq!(events, vec![(1, challenge.id, 0, true)]);
}

#[tokio::test]
async fn the_sixth_correct_guess_completes_with_ten_points() {
    let h = harness("RIVER");
    let challenge = seed_student_challenge(&h, 1, "RIVER").await;

    for _ in 0..5 {
        h.attempts.submit("TABLE", 1, Some(challenge.id)).await.unwrap();
    }
    let sixth = h.attempts.submit("RIVER", 1, Some(challenge.id)).await.unwrap();
    assert_eq!(sixth.attempt_number, 6);
    assert_eq!(sixth.points, 10);
    assert_eq!(
        h.store.challenge_status(challenge.id),
        Some(ChallengeStatus::Completed)
    );
}

#[tokio::test]
async fn guesses_are_case_insensitive() {
    let h = harness("RIVER");
    let challenge = seed_student_challenge(&h, 1, "river").await;

    let attempt = h.attempts.submit("river", 1, Some(challenge.id)).await.unwrap();
    assert!(attempt.result.0.is_correct);
    assert_eq!(attempt.guessed_word, "RIVER");
}

#[tokio::test]
async fn wrong_length_guess_is_rejected_without_consuming_an_attempt() {
    let h = harness("RIVER");
    let challenge = seed_student_challenge(&h, 1, "RIVER").await;

    let err = h.attempts.submit("RIV", 1, Some(challenge.id)).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)), "{:?}", err);

    let attempt = h.attempts.submit("RIVER", 1, Some(challenge.id)).await.unwrap();
    assert_eq!(attempt.attempt_number, 1);
    assert_eq!(attempt.points, 100);
}

#[tokio::test]
async fn another_users_individual_challenge_is_forbidden() {
    let h = harness("RIVER");
    let challenge = seed_student_challenge(&h, 1, "RIVER").await;
    h.store.add_user(student(2, None));

    let err = h.attempts.submit("RIVER", 2, Some(challenge.id)).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)), "{:?}", err);
}

#[tokio::test]
async fn class_challenges_require_membership() {
    let h = harness("RIVER");
    h.store.add_user(student(1, Some(10)));
    h.store.add_user(student(2, Some(11)));
    let challenge = h
        .store
        .insert(NewChallenge::for_class(
            Utc::now().date_naive(),
            "RIVER".to_string(),
            None,
            10,
        ))
        .await
        .unwrap();

    let member = h.attempts.submit("RIVER", 1, Some(challenge.id)).await.unwrap();
    assert!(member.result.0.is_correct);

    let err = h.attempts.submit("RIVER", 2, Some(challenge.id)).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)), "{:?}", err);
}

#[tokio::test]
async fn individual_challenge_beats_class_challenge_today() {
    let h = harness("RIVER");
    h.store.add_user(student(1, Some(10)));
    let today = Utc::now().date_naive();
    h.store
        .insert(NewChallenge::for_class(today, "GRAPE".to_string(), None, 10))
        .await
        .unwrap();
    let individual = h
        .store
        .insert(NewChallenge::for_student(today, "RIVER".to_string(), None, 1))
        .await
        .unwrap();

    let resolved = h.challenges.today(1).await.unwrap();
    assert_eq!(resolved.id, individual.id);
    assert_eq!(resolved.user_id, Some(1));
}

#[tokio::test]
async fn class_challenge_is_the_fallback() {
    let h = harness("RIVER");
    h.store.add_user(student(1, Some(10)));
    let class_challenge = h
        .store
        .insert(NewChallenge::for_class(
            Utc::now().date_naive(),
            "GRAPE".to_string(),
            None,
            10,
        ))
        .await
        .unwrap();

    let resolved = h.challenges.today(1).await.unwrap();
    assert_eq!(resolved.id, class_challenge.id);

    // An unattached user has nothing to resolve.
    h.store.add_user(student(2, None));
    let err = h.challenges.today(2).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "{:?}", err);
}

#[tokio::test]
async fn submitting_without_an_id_uses_todays_challenge() {
    let h = harness("RIVER");
    let challenge = seed_student_challenge(&h, 1, "RIVER").await;

    let attempt = h.attempts.submit("RIVER", 1, None).await.unwrap();
    assert_eq!(attempt.challenge_id, challenge.id);
    assert_eq!(attempt.points, 100);
}

#[tokio::test]
async fn attempts_list_is_ordered_and_scoped() {
    let h = harness("RIVER");
    let challenge = seed_student_challenge(&h, 1, "RIVER").await;
    h.store.add_user(student(2, None));

    h.attempts.submit("TABLE", 1, Some(challenge.id)).await.unwrap();
    h.attempts.submit("RIVAL", 1, Some(challenge.id)).await.unwrap();

    let listed = h.attempts.list(challenge.id, 1).await.unwrap();
    let numbers: Vec<i32> = listed.iter().map(|a| a.attempt_number).collect();
    assert_eq!(numbers, vec![1, 2]);

    let err = h.attempts.list(challenge.id, 2).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)), "{:?}", err);

    let err = h.attempts.list(999, 1).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "{:?}", err);
}

#[tokio::test]
async fn racing_submissions_cannot_share_an_attempt_number() {
    let h = harness("RIVER");
    let challenge = seed_student_challenge(&h, 1, "RIVER").await;

    // Two submissions that both counted 0 prior attempts try to record
    // attempt number 1; the store must reject the loser.
    let result = evaluator::evaluate("TABLE", "RIVER").unwrap();
    let new = NewAttempt {
        user_id: 1,
        challenge_id: challenge.id,
        attempt_number: 1,
        guessed_word: "TABLE".to_string(),
        result,
        points: 0,
    };
    h.store.record(new.clone(), None).await.unwrap();

    let err = h.store.record(new, None).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)), "{:?}", err);

    // Numbering stays intact: exactly one attempt on record.
    let listed = h.attempts.list(challenge.id, 1).await.unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn history_defaults_to_the_last_thirty_days() {
    let h = harness("RIVER");
    h.store.add_user(student(1, None));
    let today = Utc::now().date_naive();
    for days_ago in [0u64, 10, 40] {
        let date = today.checked_sub_days(Days::new(days_ago)).unwrap();
        h.store
            .insert(NewChallenge::for_student(date, "RIVER".to_string(), None, 1))
            .await
            .unwrap();
    }

    // Without explicit bounds, the 40-day-old challenge falls outside the
    // default window.
    let recent = h
        .challenges
        .history(
            1,
            HistoryQuery {
                start_date: None,
                end_date: None,
                limit: None,
            },
        )
        .await
        .unwrap();
    let dates: Vec<_> = recent.iter().map(|c| c.date).collect();
    assert_eq!(
        dates,
        vec![
            today,
            today.checked_sub_days(Days::new(10)).unwrap()
        ]
    );

    // The limit is clamped into 1..=100, so 0 still yields one entry.
    let capped = h
        .challenges
        .history(
            1,
            HistoryQuery {
                start_date: None,
                end_date: None,
                limit: Some(0),
            },
        )
        .await
        .unwrap();
    assert_eq!(capped.len(), 1);
    assert_eq!(capped[0].date, today);
}

#[tokio::test]
async fn class_challenge_creation_draws_a_word_and_rejects_duplicates() {
    let h = harness("GRAPE");
    h.store.add_class(class(10, 5));

    let created = h
        .challenges
        .create_class_challenge(
            5,
            CreateClassChallengeRequest {
                class_id: 10,
                date: None,
                dictionary_id: Some(3),
                word: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(created.word, "GRAPE");
    assert_eq!(created.class_id, Some(10));
    assert_eq!(created.user_id, None);

    let err = h
        .challenges
        .create_class_challenge(
            5,
            CreateClassChallengeRequest {
                class_id: 10,
                date: None,
                dictionary_id: Some(3),
                word: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)), "{:?}", err);

    // Another teacher cannot touch this class.
    let err = h
        .challenges
        .create_class_challenge(
            6,
            CreateClassChallengeRequest {
                class_id: 10,
                date: None,
                dictionary_id: Some(3),
                word: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)), "{:?}", err);
}

#[tokio::test]
async fn batch_creation_skips_students_who_already_have_one() {
    let h = harness("GRAPE");
    h.store.add_class(class(10, 5));
    h.store.add_user(student(1, Some(10)));
    h.store.add_user(student(2, Some(10)));
    h.store
        .insert(NewChallenge::for_student(
            Utc::now().date_naive(),
            "RIVER".to_string(),
            None,
            1,
        ))
        .await
        .unwrap();

    let created = h
        .challenges
        .create_batch_challenges(
            5,
            CreateBatchChallengeRequest {
                class_id: 10,
                date: None,
                dictionary_id: 3,
            },
        )
        .await
        .unwrap();

    assert_eq!(created.len(), 1);
    assert_eq!(created[0].user_id, Some(2));
    assert_eq!(created[0].word, "GRAPE");
}
