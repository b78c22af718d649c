// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::{
    config::Config,
    game::{attempts::AttemptService, challenges::ChallengeService, chat::ChatGameService},
    store::{
        BuiltinChatWords, LogRankingNotifier, UserStore,
        pg::{
            PgAttemptStore, PgChallengeStore, PgChatStore, PgClassStore, PgScoreSink, PgUserStore,
            PgWordSource,
        },
    },
};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub users: Arc<dyn UserStore>,
    pub challenges: ChallengeService,
    pub attempts: AttemptService,
    pub chat: ChatGameService,
}

impl AppState {
    /// Wires the Postgres stores into the game services.
    pub fn new(pool: PgPool, config: Config) -> Self {
        let challenge_store = Arc::new(PgChallengeStore::new(pool.clone()));
        let attempt_store = Arc::new(PgAttemptStore::new(pool.clone()));
        let user_store: Arc<dyn UserStore> = Arc::new(PgUserStore::new(pool.clone()));
        let class_store = Arc::new(PgClassStore::new(pool.clone()));
        let word_source = Arc::new(PgWordSource::new(pool.clone()));

        let challenges = ChallengeService::new(
            challenge_store.clone(),
            user_store.clone(),
            class_store,
            word_source,
        );

        let attempts = AttemptService::new(
            challenge_store,
            attempt_store,
            user_store.clone(),
            challenges.clone(),
            Arc::new(LogRankingNotifier),
        );

        let chat = ChatGameService::new(
            Arc::new(PgChatStore::new(pool.clone())),
            Arc::new(PgScoreSink::new(pool.clone())),
            Arc::new(BuiltinChatWords),
        );

        Self {
            pool,
            config,
            users: user_store,
            challenges,
            attempts,
            chat,
        }
    }
}

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
