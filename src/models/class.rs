// src/models/class.rs

use serde::Serialize;
use sqlx::FromRow;

/// Represents the 'classes' table in the database.
/// A class groups students under one teacher and may carry a default
/// dictionary used when a challenge is created without an explicit one.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Class {
    pub id: i64,
    pub teacher_id: i64,
    pub name: String,
    pub invitation_code: String,
    pub active_dictionary_id: Option<i64>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}
