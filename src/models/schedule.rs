//! Schedule models (business hours, staff working hours, staff leave)

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::enums::VacationType;

// ---------------------------------------------------------------------------
// BusinessHours
// ---------------------------------------------------------------------------

/// Opening hours of an establishment for one weekday
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BusinessHours {
    pub id: i32,
    pub establishment_id: i32,
    /// Day of week (0=Sunday, 6=Saturday)
    pub day_of_week: i16,
    pub open_time: NaiveTime,
    pub close_time: NaiveTime,
    pub is_open: bool,
    pub is_holiday: bool,
}

/// One weekday of a business hours update
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpsertBusinessHours {
    /// Day of week (0=Sunday, 6=Saturday)
    pub day_of_week: i16,
    /// Opening time (HH:MM)
    pub open_time: String,
    /// Closing time (HH:MM)
    pub close_time: String,
    pub is_open: bool,
    #[serde(default)]
    pub is_holiday: bool,
}

// ---------------------------------------------------------------------------
// StaffWorkingHours
// ---------------------------------------------------------------------------

/// Working hours of a staff member for one weekday
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct StaffWorkingHours {
    pub id: i32,
    pub staff_id: i32,
    /// Day of week (0=Sunday, 6=Saturday)
    pub day_of_week: i16,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_available: bool,
}

/// One weekday of a working hours update
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpsertStaffWorkingHours {
    /// Day of week (0=Sunday, 6=Saturday)
    pub day_of_week: i16,
    /// Start time (HH:MM)
    pub start_time: String,
    /// End time (HH:MM)
    pub end_time: String,
    pub is_available: bool,
}

// ---------------------------------------------------------------------------
// StaffVacation
// ---------------------------------------------------------------------------

/// A leave period; both dates are inclusive
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct StaffVacation {
    pub id: i32,
    pub staff_id: i32,
    pub establishment_id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub vacation_type: VacationType,
    pub reason: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl StaffVacation {
    /// Whether this leave blocks bookings on `date`
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.is_active && self.start_date <= date && date <= self.end_date
    }
}

/// Create leave request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateStaffVacation {
    /// Start date (YYYY-MM-DD)
    pub start_date: String,
    /// End date (YYYY-MM-DD), inclusive
    pub end_date: String,
    /// vacation, sick_leave or time_off
    pub vacation_type: VacationType,
    pub reason: Option<String>,
}
