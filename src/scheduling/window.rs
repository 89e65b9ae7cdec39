//! Working-window resolution for one calendar day
//!
//! The window offered for booking is the establishment's business hours,
//! narrowed to the staff member's working hours when a staff member is
//! given.

use chrono::{NaiveDate, NaiveTime};

use super::calendar::{minute_of_day, weekday_index};
use crate::models::{
    enums::VacationType,
    schedule::{BusinessHours, StaffVacation, StaffWorkingHours},
};

/// Staff data for the day being resolved
#[derive(Debug, Clone, Copy)]
pub struct StaffDay<'a> {
    pub working_hours: &'a [StaffWorkingHours],
    pub vacations: &'a [StaffVacation],
    /// Deactivated staff members take no bookings on any day
    pub is_active: bool,
}

/// Why a day offers no booking window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosedReason {
    /// No business hours row for the weekday, or the row is marked closed
    BusinessClosed,
    Holiday,
    StaffInactive,
    StaffNotWorking,
    StaffOnLeave(VacationType),
    /// Business and staff hours do not intersect
    EmptyWindow,
}

impl std::fmt::Display for ClosedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClosedReason::BusinessClosed => write!(f, "The establishment is closed on this day"),
            ClosedReason::Holiday => write!(f, "The establishment is closed for a holiday"),
            ClosedReason::StaffInactive => write!(f, "The staff member is inactive"),
            ClosedReason::StaffNotWorking => write!(f, "The staff member does not work on this day"),
            ClosedReason::StaffOnLeave(kind) => write!(f, "The staff member is on leave ({})", kind),
            ClosedReason::EmptyWindow => {
                write!(f, "Staff working hours do not overlap business hours")
            }
        }
    }
}

/// Bookable window of a day, in minutes since midnight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub business_open: NaiveTime,
    pub business_close: NaiveTime,
    /// Effective open: later of business and staff opening
    pub open: NaiveTime,
    /// Effective close: earlier of business and staff closing
    pub close: NaiveTime,
}

impl DayWindow {
    pub fn open_minute(&self) -> i64 {
        minute_of_day(self.open)
    }

    pub fn close_minute(&self) -> i64 {
        minute_of_day(self.close)
    }
}

/// Business hours row for the date's weekday, if the establishment opens
pub fn business_day(
    date: NaiveDate,
    business_hours: &[BusinessHours],
) -> Result<&BusinessHours, ClosedReason> {
    let weekday = weekday_index(date);
    let row = business_hours
        .iter()
        .find(|b| b.day_of_week == weekday)
        .ok_or(ClosedReason::BusinessClosed)?;

    if !row.is_open {
        return Err(ClosedReason::BusinessClosed);
    }
    if row.is_holiday {
        return Err(ClosedReason::Holiday);
    }
    Ok(row)
}

/// Staff working hours for the date, if the staff member is active, works
/// that weekday and is not on leave
pub fn staff_day<'a>(
    date: NaiveDate,
    staff: StaffDay<'a>,
) -> Result<&'a StaffWorkingHours, ClosedReason> {
    if !staff.is_active {
        return Err(ClosedReason::StaffInactive);
    }
    let weekday = weekday_index(date);
    let row = staff
        .working_hours
        .iter()
        .find(|w| w.day_of_week == weekday && w.is_available)
        .ok_or(ClosedReason::StaffNotWorking)?;

    if let Some(leave) = staff.vacations.iter().find(|v| v.covers(date)) {
        return Err(ClosedReason::StaffOnLeave(leave.vacation_type));
    }
    Ok(row)
}

/// Resolve the bookable window of `date`
pub fn resolve_window(
    date: NaiveDate,
    business_hours: &[BusinessHours],
    staff: Option<StaffDay<'_>>,
) -> Result<DayWindow, ClosedReason> {
    let business = business_day(date, business_hours)?;

    let (open, close) = match staff {
        Some(staff) => {
            let hours = staff_day(date, staff)?;
            (
                business.open_time.max(hours.start_time),
                business.close_time.min(hours.end_time),
            )
        }
        None => (business.open_time, business.close_time),
    };

    if open >= close {
        return Err(ClosedReason::EmptyWindow);
    }

    Ok(DayWindow {
        business_open: business.open_time,
        business_close: business.close_time,
        open,
        close,
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::Utc;

    pub fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    /// Open on the given weekdays between `open` and `close`
    pub fn business(days: &[i16], open: NaiveTime, close: NaiveTime) -> Vec<BusinessHours> {
        days.iter()
            .map(|&d| BusinessHours {
                id: d as i32 + 1,
                establishment_id: 1,
                day_of_week: d,
                open_time: open,
                close_time: close,
                is_open: true,
                is_holiday: false,
            })
            .collect()
    }

    pub fn working(days: &[i16], start: NaiveTime, end: NaiveTime) -> Vec<StaffWorkingHours> {
        days.iter()
            .map(|&d| StaffWorkingHours {
                id: d as i32 + 1,
                staff_id: 1,
                day_of_week: d,
                start_time: start,
                end_time: end,
                is_available: true,
            })
            .collect()
    }

    pub fn leave(start: NaiveDate, end: NaiveDate, kind: VacationType) -> StaffVacation {
        StaffVacation {
            id: 1,
            staff_id: 1,
            establishment_id: 1,
            start_date: start,
            end_date: end,
            vacation_type: kind,
            reason: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}
