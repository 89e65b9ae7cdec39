//! Loyalty programs and point accrual

use sqlx::{Pool, Postgres};

use crate::{error::AppResult, models::loyalty::LoyaltyProgram};

#[derive(Clone)]
pub struct LoyaltyRepository {
    pool: Pool<Postgres>,
}

impl LoyaltyRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Active programs of the establishment that list `service_id`
    pub async fn programs_for_service(&self, establishment_id: i32, service_id: i32) -> AppResult<Vec<LoyaltyProgram>> {
        let rows = sqlx::query_as::<_, LoyaltyProgram>(
            r#"
            SELECT id, establishment_id, name, points_per_service, eligible_service_ids, is_active
            FROM loyalty_programs
            WHERE establishment_id = $1 AND is_active AND $2 = ANY(eligible_service_ids)
            ORDER BY id
            "#,
        )
        .bind(establishment_id)
        .bind(service_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Credit points for one appointment under one program.
    ///
    /// The ledger row and the balance change commit together; returns false
    /// when the appointment was already credited under this program.
    pub async fn accrue(
        &self,
        program: &LoyaltyProgram,
        client_id: i32,
        appointment_id: i32,
        description: &str,
    ) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO loyalty_point_transactions (client_id, program_id, appointment_id, points, description)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (program_id, appointment_id) DO NOTHING
            "#,
        )
        .bind(client_id)
        .bind(program.id)
        .bind(appointment_id)
        .bind(program.points_per_service)
        .bind(description)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if inserted == 0 {
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO client_loyalty_points (client_id, program_id, points)
            VALUES ($1, $2, $3)
            ON CONFLICT (client_id, program_id)
            DO UPDATE SET points = client_loyalty_points.points + EXCLUDED.points, updated_at = NOW()
            "#,
        )
        .bind(client_id)
        .bind(program.id)
        .bind(program.points_per_service)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }
}
