//! Outbox entries for side effects that must eventually happen

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Kind of the completion side effect (revenue record + loyalty accrual)
pub const COMPLETION_KIND: &str = "completion";

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OutboxEntry {
    pub id: i32,
    pub appointment_id: i32,
    pub kind: String,
    /// pending, done or dead
    pub status: String,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub next_attempt_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}
