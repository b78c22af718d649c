// tests/chat_tests.rs
//
// Chat game engine: lazy session creation, bounded tries, scoring and
// atomic word rotation, over the in-memory chat store.

use std::sync::Arc;

use async_trait::async_trait;
use wordle_backend::error::AppError;
use wordle_backend::game::chat::{ChatGameService, MAX_TRIES};
use wordle_backend::models::chat::ChatUser;
use wordle_backend::store::ChatStore;
use wordle_backend::store::memory::{CyclingChatWords, MemoryChatStore, RecordingScoreSink};

struct Harness {
    store: Arc<MemoryChatStore>,
    scores: Arc<RecordingScoreSink>,
    chat: ChatGameService,
}

fn harness(words: &[&str]) -> Harness {
    let store = Arc::new(MemoryChatStore::default());
    let scores = Arc::new(RecordingScoreSink::default());
    let chat = ChatGameService::new(
        store.clone(),
        scores.clone(),
        Arc::new(CyclingChatWords::new(
            words.iter().map(|w| w.to_string()).collect(),
        )),
    );
    Harness {
        store,
        scores,
        chat,
    }
}

#[tokio::test]
async fn first_contact_creates_session_and_target_word() {
    let h = harness(&["GRAPE"]);

    let progress = h.chat.progress("chat-1", "alice").await.unwrap();
    assert!(!progress.won);
    assert!(progress.tries.is_empty());

    // Word and session now exist in the store.
    assert_eq!(
        h.store.target_word("chat-1").await.unwrap().as_deref(),
        Some("GRAPE")
    );
    assert!(h.store.chat_user("chat-1", "alice").await.unwrap().is_some());
}

#[tokio::test]
async fn winning_on_the_second_try_scores_four() {
    let h = harness(&["GRAPE"]);

    let progress = h.chat.submit_guess("chat-1", "alice", "fruit").await.unwrap();
    assert!(!progress.won);
    assert_eq!(progress.tries.len(), 1);

    let progress = h.chat.submit_guess("chat-1", "alice", "grape").await.unwrap();
    assert!(progress.won);
    assert_eq!(progress.tries.len(), 2);
    assert!(progress.tries[1].is_correct);

    assert_eq!(h.scores.total("chat-1", "alice"), 4);
}

#[tokio::test]
async fn no_more_guesses_after_winning() {
    let h = harness(&["GRAPE"]);
    h.chat.submit_guess("chat-1", "alice", "GRAPE").await.unwrap();

    let err = h.chat.submit_guess("chat-1", "alice", "FRUIT").await.unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)), "{:?}", err);

    // Only the winning delta was recorded.
    assert_eq!(h.scores.total("chat-1", "alice"), 5);
}

#[tokio::test]
async fn the_sixth_guess_is_rejected() {
    let h = harness(&["GRAPE"]);

    for n in 1..=MAX_TRIES {
        let progress = h.chat.submit_guess("chat-1", "alice", "FRUIT").await.unwrap();
        assert_eq!(progress.tries.len(), n);
        assert!(!progress.won);
    }

    let err = h.chat.submit_guess("chat-1", "alice", "GRAPE").await.unwrap_err();
    assert!(matches!(err, AppError::LimitExceeded(_)), "{:?}", err);
    assert_eq!(h.scores.total("chat-1", "alice"), 0);
}

#[tokio::test]
async fn guess_length_must_match_the_target() {
    let h = harness(&["GRAPE"]);

    let err = h.chat.submit_guess("chat-1", "alice", "GO").await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)), "{:?}", err);

    // The failed guess did not consume a try.
    let progress = h.chat.progress("chat-1", "alice").await.unwrap();
    assert!(progress.tries.is_empty());
}

#[tokio::test]
async fn players_in_the_same_chat_progress_independently() {
    let h = harness(&["GRAPE"]);

    h.chat.submit_guess("chat-1", "alice", "FRUIT").await.unwrap();
    h.chat.submit_guess("chat-1", "alice", "BRAVE").await.unwrap();
    let bob = h.chat.submit_guess("chat-1", "bob", "GRAPE").await.unwrap();

    assert!(bob.won);
    assert_eq!(bob.tries.len(), 1);
    let alice = h.chat.progress("chat-1", "alice").await.unwrap();
    assert_eq!(alice.tries.len(), 2);
    assert!(!alice.won);
}

#[tokio::test]
async fn rotation_swaps_the_word_and_clears_progress() {
    let h = harness(&["GRAPE", "FRUIT"]);

    h.chat.submit_guess("chat-1", "alice", "BRAVE").await.unwrap();
    h.chat.submit_guess("chat-1", "bob", "GRAPE").await.unwrap();

    h.chat.rotate_chat("chat-1").await.unwrap();

    assert_eq!(
        h.store.target_word("chat-1").await.unwrap().as_deref(),
        Some("FRUIT")
    );

    // Everyone starts over, including yesterday's winner.
    let alice = h.chat.progress("chat-1", "alice").await.unwrap();
    assert!(alice.tries.is_empty());
    let bob = h.chat.progress("chat-1", "bob").await.unwrap();
    assert!(!bob.won);

    // The old word no longer wins; the new one does.
    let progress = h.chat.submit_guess("chat-1", "bob", "GRAPE").await.unwrap();
    assert!(!progress.won);
    let progress = h.chat.submit_guess("chat-1", "bob", "FRUIT").await.unwrap();
    assert!(progress.won);

    // Scores outlive rotation.
    assert_eq!(h.scores.total("chat-1", "bob"), 5 + 4);
}

#[tokio::test]
async fn rotate_all_touches_every_known_chat() {
    let h = harness(&["GRAPE", "FRUIT", "BRAVE"]);

    h.chat.progress("chat-1", "alice").await.unwrap();
    h.chat.progress("chat-2", "bob").await.unwrap();

    let rotated = h.chat.rotate_all().await.unwrap();
    assert_eq!(rotated, 2);

    // Both chats got fresh words from the source.
    let w1 = h.store.target_word("chat-1").await.unwrap().unwrap();
    let w2 = h.store.target_word("chat-2").await.unwrap().unwrap();
    assert_ne!(w1, "GRAPE");
    assert_ne!(w2, "FRUIT");
}

/// Delegates to a `MemoryChatStore`, except that rotating one designated
/// chat always fails.
struct FailingRotationStore {
    inner: MemoryChatStore,
    broken_chat: String,
}

#[async_trait]
impl ChatStore for FailingRotationStore {
    async fn chat_user(
        &self,
        chat_id: &str,
        user_id: &str,
    ) -> Result<Option<ChatUser>, AppError> {
        self.inner.chat_user(chat_id, user_id).await
    }

    async fn put_chat_user(&self, user: &ChatUser) -> Result<(), AppError> {
        self.inner.put_chat_user(user).await
    }

    async fn target_word(&self, chat_id: &str) -> Result<Option<String>, AppError> {
        self.inner.target_word(chat_id).await
    }

    async fn init_target_word(&self, chat_id: &str, word: &str) -> Result<(), AppError> {
        self.inner.init_target_word(chat_id, word).await
    }

    async fn rotate(&self, chat_id: &str, new_word: &str) -> Result<(), AppError> {
        if chat_id == self.broken_chat {
            return Err(AppError::InternalServerError(
                "rotation unavailable".to_string(),
            ));
        }
        self.inner.rotate(chat_id, new_word).await
    }

    async fn chat_ids(&self) -> Result<Vec<String>, AppError> {
        self.inner.chat_ids().await
    }
}

#[tokio::test]
async fn a_failing_chat_does_not_block_the_rotation_sweep() {
    let store = Arc::new(FailingRotationStore {
        inner: MemoryChatStore::default(),
        broken_chat: "chat-1".to_string(),
    });
    let chat = ChatGameService::new(
        store.clone(),
        Arc::new(RecordingScoreSink::default()),
        Arc::new(CyclingChatWords::new(vec![
            "GRAPE".to_string(),
            "FRUIT".to_string(),
            "BRAVE".to_string(),
            "JUICE".to_string(),
        ])),
    );

    chat.progress("chat-1", "alice").await.unwrap();
    chat.progress("chat-2", "bob").await.unwrap();

    // chat-1 fails to rotate; chat-2 must still get its fresh word.
    let rotated = chat.rotate_all().await.unwrap();
    assert_eq!(rotated, 1);

    assert_eq!(
        store.target_word("chat-1").await.unwrap().as_deref(),
        Some("GRAPE")
    );
    let w2 = store.target_word("chat-2").await.unwrap().unwrap();
    assert_ne!(w2, "FRUIT");
}
