//! Establishment (tenant) and subscription plan

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Establishment {
    pub id: i32,
    pub name: String,
    /// Address receiving new-appointment emails
    pub contact_email: Option<String>,
    /// IANA zone name, e.g. "America/Sao_Paulo"
    pub timezone: String,
    pub plan_id: Option<i32>,
}

impl Establishment {
    /// The establishment's zone, or `fallback` when the stored name is unknown
    pub fn tz(&self, fallback: Tz) -> Tz {
        self.timezone.parse().unwrap_or_else(|_| {
            tracing::warn!(
                "Establishment {} has unknown timezone '{}', using {}",
                self.id,
                self.timezone,
                fallback
            );
            fallback
        })
    }
}

/// Subscription plan limits (read-only here)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct EstablishmentPlan {
    pub id: i32,
    pub name: String,
    /// None means unlimited
    pub max_monthly_appointments: Option<i32>,
    pub has_financial_module: bool,
    pub has_inventory_module: bool,
    pub has_commission_module: bool,
}

/// Outbound webhook registered by an establishment for one event name
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WebhookSubscription {
    pub id: i32,
    pub establishment_id: i32,
    pub event_name: String,
    pub url: String,
    pub is_active: bool,
}
