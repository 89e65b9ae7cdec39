//! Establishment catalog: services offered, staff and clients

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// A service offered by an establishment (haircut, manicure, ...)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct SalonService {
    pub id: i32,
    pub establishment_id: i32,
    pub name: String,
    /// Duration in minutes, drives slot length and end time
    pub duration_minutes: i32,
    /// Price charged when the appointment is completed
    pub price: Decimal,
}

/// A service provider
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Staff {
    pub id: i32,
    pub establishment_id: i32,
    pub name: String,
    pub email: Option<String>,
    /// Percent of completed-service revenue (0 = fixed salary only)
    pub commission_rate: Decimal,
    pub salary_amount: Decimal,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Client {
    pub id: i32,
    pub establishment_id: i32,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}
