//! Quota and commission report types

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Monthly appointment quota for an establishment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuotaStatus {
    pub can_create: bool,
    pub current_count: i64,
    /// None means unlimited
    pub max_count: Option<i64>,
}

/// Commission query
#[derive(Debug, Deserialize, ToSchema)]
pub struct CommissionRequest {
    /// Required for admins; staff members always get their own report
    pub staff_id: Option<i32>,
    /// Start date (YYYY-MM-DD), inclusive
    pub start_date: String,
    /// End date (YYYY-MM-DD), inclusive
    pub end_date: String,
}

/// A completed appointment counted in a commission report
#[derive(Debug, Clone, FromRow)]
pub struct CompletedServiceRow {
    pub appointment_id: i32,
    pub start_at: DateTime<Utc>,
    pub client_name: String,
    pub service_name: String,
    pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CommissionLine {
    pub appointment_id: i32,
    pub date: NaiveDate,
    pub client_name: String,
    pub service_name: String,
    pub price: Decimal,
    pub commission: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CommissionReport {
    pub staff_id: i32,
    pub staff_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub fixed_salary: Decimal,
    pub commission_rate: Decimal,
    pub total_services: i64,
    pub total_service_value: Decimal,
    pub commission_value: Decimal,
    pub total_payable: Decimal,
    pub items: Vec<CommissionLine>,
    /// Set when the staff member earns commission but completed nothing
    pub message: Option<String>,
}
