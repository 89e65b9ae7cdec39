//! Services, staff and clients of an establishment

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{Client, SalonService, Staff},
};

#[derive(Clone)]
pub struct CatalogRepository {
    pool: Pool<Postgres>,
}

impl CatalogRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Service of the establishment, if any
    pub async fn find_service(&self, establishment_id: i32, id: i32) -> AppResult<Option<SalonService>> {
        let row = sqlx::query_as::<_, SalonService>(
            "SELECT id, establishment_id, name, duration_minutes, price FROM services WHERE id = $1 AND establishment_id = $2",
        )
        .bind(id)
        .bind(establishment_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Service by ID regardless of establishment (background work)
    pub async fn find_service_by_id(&self, id: i32) -> AppResult<Option<SalonService>> {
        let row = sqlx::query_as::<_, SalonService>(
            "SELECT id, establishment_id, name, duration_minutes, price FROM services WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_staff(&self, establishment_id: i32, id: i32) -> AppResult<Staff> {
        sqlx::query_as::<_, Staff>(
            r#"
            SELECT id, establishment_id, name, email, commission_rate, salary_amount, is_active
            FROM staff
            WHERE id = $1 AND establishment_id = $2
            "#,
        )
        .bind(id)
        .bind(establishment_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Staff member {} not found", id)))
    }

    pub async fn get_client(&self, establishment_id: i32, id: i32) -> AppResult<Client> {
        sqlx::query_as::<_, Client>(
            "SELECT id, establishment_id, name, phone, email FROM clients WHERE id = $1 AND establishment_id = $2",
        )
        .bind(id)
        .bind(establishment_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Client {} not found", id)))
    }
}
