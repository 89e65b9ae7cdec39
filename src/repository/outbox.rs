//! Appointment outbox

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::{error::AppResult, models::outbox::OutboxEntry};

#[derive(Clone)]
pub struct OutboxRepository {
    pool: Pool<Postgres>,
}

impl OutboxRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Pending entry of an appointment, if not yet processed
    pub async fn pending_for(&self, appointment_id: i32, kind: &str) -> AppResult<Option<OutboxEntry>> {
        let row = sqlx::query_as::<_, OutboxEntry>(
            "SELECT * FROM appointment_outbox WHERE appointment_id = $1 AND kind = $2 AND status = 'pending'",
        )
        .bind(appointment_id)
        .bind(kind)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Pending entries whose next attempt is due, oldest first
    pub async fn due(&self, now: DateTime<Utc>, limit: i64) -> AppResult<Vec<OutboxEntry>> {
        let rows = sqlx::query_as::<_, OutboxEntry>(
            r#"
            SELECT * FROM appointment_outbox
            WHERE status = 'pending' AND next_attempt_at <= $1
            ORDER BY next_attempt_at, id
            LIMIT $2
            "#,
        )
        .bind(now)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Claim an entry for processing by pushing its next attempt out.
    ///
    /// Returns false when another worker claimed it first.
    pub async fn claim(&self, id: i32, lease_until: DateTime<Utc>) -> AppResult<bool> {
        let claimed = sqlx::query(
            r#"
            UPDATE appointment_outbox SET next_attempt_at = $2
            WHERE id = $1 AND status = 'pending' AND next_attempt_at <= NOW()
            "#,
        )
        .bind(id)
        .bind(lease_until)
        .execute(&self.pool)
        .await?
        .rows_affected();
        Ok(claimed > 0)
    }

    pub async fn mark_done(&self, id: i32) -> AppResult<()> {
        sqlx::query(
            "UPDATE appointment_outbox SET status = 'done', processed_at = NOW(), last_error = NULL WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Record a failed attempt; `retry_at` None dead-letters the entry
    pub async fn mark_failed(&self, id: i32, error: &str, retry_at: Option<DateTime<Utc>>) -> AppResult<()> {
        match retry_at {
            Some(at) => {
                sqlx::query(
                    r#"
                    UPDATE appointment_outbox
                    SET attempts = attempts + 1, last_error = $2, next_attempt_at = $3
                    WHERE id = $1
                    "#,
                )
                .bind(id)
                .bind(error)
                .bind(at)
                .execute(&self.pool)
                .await?;
            }
            None => {
                sqlx::query(
                    r#"
                    UPDATE appointment_outbox
                    SET attempts = attempts + 1, last_error = $2, status = 'dead', processed_at = NOW()
                    WHERE id = $1
                    "#,
                )
                .bind(id)
                .bind(error)
                .execute(&self.pool)
                .await?;
            }
        }
        Ok(())
    }
}
