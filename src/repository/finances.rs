//! Revenue records

use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::finance::{NewTransaction, Transaction},
};

#[derive(Clone)]
pub struct FinancesRepository {
    pool: Pool<Postgres>,
}

impl FinancesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Insert the revenue record of a completed appointment.
    ///
    /// Returns None when the appointment already has one.
    pub async fn insert_completed_service(&self, data: &NewTransaction) -> AppResult<Option<Transaction>> {
        let row = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions (
                establishment_id, appointment_id, amount, transaction_type,
                category, payment_method, description, transaction_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (appointment_id) WHERE category = 'completed_service' DO NOTHING
            RETURNING *
            "#,
        )
        .bind(data.establishment_id)
        .bind(data.appointment_id)
        .bind(data.amount)
        .bind(data.transaction_type)
        .bind(&data.category)
        .bind(&data.payment_method)
        .bind(&data.description)
        .bind(data.transaction_date)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
