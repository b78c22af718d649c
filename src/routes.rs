// src/routes.rs

use axum::{
    Router, http::Method, middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{attempt, auth, challenge, chat},
    state::AppState,
    utils::jwt::{auth_middleware, teacher_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, challenges, attempts, chat game).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (pool, config, game services).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let challenge_routes = Router::new()
        .route("/today", get(challenge::today_challenge))
        .route("/history", get(challenge::challenge_history))
        .route("/{id}/attempts", get(attempt::list_attempts))
        // Creation requires the Teacher role on top of authentication.
        .merge(
            Router::new()
                .route("/class", post(challenge::create_class_challenge))
                .route("/student", post(challenge::create_student_challenge))
                .route("/class/batch", post(challenge::create_batch_challenges))
                .layer(middleware::from_fn(teacher_middleware)),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let attempt_routes = Router::new()
        .route("/", post(attempt::submit_attempt))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Bot-facing chat game: keyed by platform ids, no JWT.
    let chat_routes = Router::new()
        .route(
            "/{chat_id}/{user_id}/attempts",
            get(chat::get_progress).post(chat::post_guess),
        )
        .route("/{chat_id}/scores", get(chat::get_scores));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/challenges", challenge_routes)
        .nest("/api/attempts", attempt_routes)
        .nest("/api/game", chat_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
