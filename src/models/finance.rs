//! Financial transactions created by completed appointments

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::enums::TransactionType;

/// Category of the revenue record written when an appointment is completed
pub const COMPLETED_SERVICE_CATEGORY: &str = "completed_service";

/// Payment method used when none was recorded
pub const DEFAULT_PAYMENT_METHOD: &str = "cash";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Transaction {
    pub id: i32,
    pub establishment_id: i32,
    pub appointment_id: Option<i32>,
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    pub category: String,
    pub payment_method: String,
    pub description: Option<String>,
    pub transaction_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub establishment_id: i32,
    pub appointment_id: Option<i32>,
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    pub category: String,
    pub payment_method: String,
    pub description: Option<String>,
    pub transaction_date: NaiveDate,
}
