//! Appointment model and related request/response types

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::AppointmentStatus;

/// Appointment record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Appointment {
    pub id: i32,
    pub establishment_id: i32,
    pub client_id: i32,
    pub staff_id: i32,
    pub service_id: i32,
    pub start_at: DateTime<Utc>,
    /// Last occupied minute: `start_at + duration - 1 minute`
    pub end_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Appointment joined with the names shown in listings and notifications
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AppointmentDetails {
    pub id: i32,
    pub establishment_id: i32,
    pub client_id: i32,
    pub client_name: String,
    pub staff_id: i32,
    pub staff_name: String,
    pub service_id: i32,
    pub service_name: String,
    pub price: Decimal,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
}

/// Create appointment request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateAppointment {
    #[validate(range(min = 1))]
    pub client_id: i32,
    #[validate(range(min = 1))]
    pub service_id: i32,
    #[validate(range(min = 1))]
    pub staff_id: i32,
    /// Date (YYYY-MM-DD)
    pub date: Option<String>,
    /// Time of day (HH:MM)
    pub time: Option<String>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

/// Update appointment request; absent fields keep their current value
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateAppointment {
    #[validate(range(min = 1))]
    pub client_id: Option<i32>,
    #[validate(range(min = 1))]
    pub service_id: Option<i32>,
    #[validate(range(min = 1))]
    pub staff_id: Option<i32>,
    /// Date (YYYY-MM-DD)
    pub date: Option<String>,
    /// Time of day (HH:MM)
    pub time: Option<String>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

/// Status change request
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateAppointmentStatus {
    /// New status; Portuguese synonyms are accepted
    pub status: AppointmentStatus,
}

/// Query parameters for listing appointments
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct AppointmentQuery {
    /// Month filter (YYYY-MM), in the establishment's timezone
    pub month: Option<String>,
    /// Status filter; synonyms are accepted
    pub status: Option<String>,
    /// Page number (1-based)
    pub page: Option<i64>,
    /// Items per page
    pub per_page: Option<i64>,
}

/// Validated booking data, ready to be written
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub establishment_id: i32,
    pub client_id: i32,
    pub staff_id: i32,
    pub service_id: i32,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub notes: Option<String>,
}

/// Notification row written alongside a new appointment
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub title: String,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Availability
// ---------------------------------------------------------------------------

/// Query parameters for available slots
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct AvailabilityQuery {
    pub staff_id: Option<i32>,
    /// Date (YYYY-MM-DD)
    pub date: String,
    pub service_id: i32,
}

/// A candidate start time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TimeSlot {
    /// Time of day (HH:MM)
    pub time: String,
    pub available: bool,
    pub is_past: bool,
    pub is_booked: bool,
}

/// Working window actually offered on a day
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WorkingWindow {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

/// Available slots for a day
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AvailabilityResponse {
    pub date: NaiveDate,
    pub is_closed: bool,
    /// Why there are no slots, when closed
    pub reason: Option<String>,
    pub working_hours: Option<WorkingWindow>,
    pub duration_minutes: i32,
    pub slots: Vec<TimeSlot>,
}

/// Paginated appointment listing
#[derive(Serialize, ToSchema)]
pub struct AppointmentPage {
    pub items: Vec<AppointmentDetails>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}
