// src/main.rs

use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use wordle_backend::config::Config;
use wordle_backend::game::chat::run_rotation;
use wordle_backend::models::user::{NewUser, Role};
use wordle_backend::routes;
use wordle_backend::state::AppState;
use wordle_backend::utils::hash::hash_password;

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    // Initialize Database Pool with Retry
    let mut retry_count = 0;
    let pool = loop {
        match PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
        {
            Ok(pool) => break pool,
            Err(e) => {
                retry_count += 1;
                if retry_count > 5 {
                    panic!("Failed to connect to database after 5 retries: {}", e);
                }
                tracing::warn!(
                    "Database not ready, retrying in 2s... (Attempt {})",
                    retry_count
                );
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    };

    tracing::info!("Database connected...");

    // Run Migrations Automatically
    tracing::info!("Running migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations applied successfully.");

    // Create AppState (wires the Postgres stores into the game services)
    let state = AppState::new(pool.clone(), config.clone());

    // Seed Teacher Account
    if let Err(e) = seed_teacher(&state, &config).await {
        tracing::error!("Failed to seed teacher account: {:?}", e);
    }

    // Scheduled chat word rotation
    let rotation_period = Duration::from_secs(config.word_rotation_secs);
    tokio::spawn(run_rotation(state.chat.clone(), rotation_period));

    // Create the Axum application router
    let app = routes::create_router(state);

    // Bind to the listening address
    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();

    // Start the server
    axum::serve(listener, app).await.unwrap();
}

async fn seed_teacher(state: &AppState, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    if let (Some(login), Some(password)) = (&config.teacher_login, &config.teacher_password) {
        if state.users.by_identity(login).await?.is_none() {
            tracing::info!("Seeding teacher account: {}", login);
            let password_hash = hash_password(password)?;

            state
                .users
                .insert(NewUser {
                    email: None,
                    login: Some(login.clone()),
                    first_name: "Teacher".to_string(),
                    last_name: "Account".to_string(),
                    role: Role::Teacher,
                    password_hash,
                    class_id: None,
                })
                .await?;
            tracing::info!("Teacher account created successfully.");
        }
    }
    Ok(())
}
