// src/config.rs

use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub rust_log: String,

    /// Seconds between chat word rotations. The rotation task replaces
    /// every chat's target word and wipes member progress.
    pub word_rotation_secs: u64,

    /// Optional initial teacher account seeded at startup.
    pub teacher_login: Option<String>,
    pub teacher_password: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(86400);

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let word_rotation_secs = env::var("WORD_ROTATION_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(86400);

        let teacher_login = env::var("TEACHER_LOGIN").ok();
        let teacher_password = env::var("TEACHER_PASSWORD").ok();

        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            word_rotation_secs,
            teacher_login,
            teacher_password,
        }
    }
}
