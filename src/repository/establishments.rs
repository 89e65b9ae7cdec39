//! Establishments, their plans and webhook subscriptions

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{establishment::WebhookSubscription, Establishment, EstablishmentPlan},
};

#[derive(Clone)]
pub struct EstablishmentsRepository {
    pool: Pool<Postgres>,
}

impl EstablishmentsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Establishment> {
        sqlx::query_as::<_, Establishment>(
            "SELECT id, name, contact_email, timezone, plan_id FROM establishments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Establishment {} not found", id)))
    }

    /// Subscription plan of an establishment; None when it has no plan
    pub async fn get_plan(&self, establishment_id: i32) -> AppResult<Option<EstablishmentPlan>> {
        let plan = sqlx::query_as::<_, EstablishmentPlan>(
            r#"
            SELECT p.id, p.name, p.max_monthly_appointments,
                   p.has_financial_module, p.has_inventory_module, p.has_commission_module
            FROM plans p
            JOIN establishments e ON e.plan_id = p.id
            WHERE e.id = $1
            "#,
        )
        .bind(establishment_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(plan)
    }

    /// Active webhooks of an establishment listening to `event_name`
    pub async fn webhooks_for(&self, establishment_id: i32, event_name: &str) -> AppResult<Vec<WebhookSubscription>> {
        let rows = sqlx::query_as::<_, WebhookSubscription>(
            r#"
            SELECT id, establishment_id, event_name, url, is_active
            FROM webhook_subscriptions
            WHERE establishment_id = $1 AND event_name = $2 AND is_active
            "#,
        )
        .bind(establishment_id)
        .bind(event_name)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Database round-trip for readiness checks
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
