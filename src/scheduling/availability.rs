//! Available slot computation

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;

use super::{
    calendar::{local_instant, minute_of_day, time_from_minutes},
    conflict::{find_conflict, Occupied},
    window::{resolve_window, DayWindow, StaffDay},
};
use crate::models::{
    appointment::{AvailabilityResponse, TimeSlot, WorkingWindow},
    schedule::BusinessHours,
};

/// Everything slot evaluation needs besides the schedule rows
#[derive(Debug, Clone, Copy)]
pub struct SlotContext {
    pub date: NaiveDate,
    /// Establishment timezone; "past" is judged against its wall clock
    pub tz: Tz,
    pub now: DateTime<Utc>,
    pub duration_minutes: i32,
    pub step_minutes: i64,
}

/// Outcome of checking one start time against a resolved window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotVerdict {
    pub start: DateTime<Utc>,
    pub is_past: bool,
    pub is_booked: bool,
    pub would_exceed_closing_time: bool,
}

impl SlotVerdict {
    pub fn available(&self) -> bool {
        !self.is_past && !self.is_booked && !self.would_exceed_closing_time
    }
}

/// Check one start time. Returns None when the local time does not exist
/// (DST gap).
pub fn evaluate_start(
    window: &DayWindow,
    ctx: &SlotContext,
    time: NaiveTime,
    booked: &[Occupied],
    exclude: Option<i32>,
) -> Option<SlotVerdict> {
    let start = local_instant(ctx.tz, ctx.date, time)?;
    let end_minute = minute_of_day(time) + ctx.duration_minutes as i64;

    Some(SlotVerdict {
        start,
        is_past: start <= ctx.now,
        is_booked: find_conflict(booked, start, ctx.duration_minutes, exclude).is_some(),
        would_exceed_closing_time: end_minute > window.close_minute(),
    })
}

/// Slots of a resolved window. Starts whose service would run past the
/// close are not offered at all.
pub fn build_slots(window: &DayWindow, ctx: &SlotContext, booked: &[Occupied]) -> Vec<TimeSlot> {
    let step = ctx.step_minutes.max(1);
    let mut slots = Vec::new();
    let mut minute = window.open_minute();

    while minute < window.close_minute() {
        let Some(time) = time_from_minutes(minute) else {
            break;
        };
        minute += step;

        let Some(verdict) = evaluate_start(window, ctx, time, booked, None) else {
            continue;
        };
        if verdict.would_exceed_closing_time {
            continue;
        }

        slots.push(TimeSlot {
            time: time.format("%H:%M").to_string(),
            available: verdict.available(),
            is_past: verdict.is_past,
            is_booked: verdict.is_booked,
        });
    }

    slots
}

/// Available slots for a day.
///
/// `booked` holds the appointments of the staff member on that day (or of
/// the whole establishment when no staff member is given).
pub fn compute_availability(
    ctx: &SlotContext,
    business_hours: &[BusinessHours],
    staff: Option<StaffDay<'_>>,
    booked: &[Occupied],
) -> AvailabilityResponse {
    match resolve_window(ctx.date, business_hours, staff) {
        Ok(window) => AvailabilityResponse {
            date: ctx.date,
            is_closed: false,
            reason: None,
            working_hours: Some(WorkingWindow {
                open: window.open,
                close: window.close,
            }),
            duration_minutes: ctx.duration_minutes,
            slots: build_slots(&window, ctx, booked),
        },
        Err(reason) => AvailabilityResponse {
            date: ctx.date,
            is_closed: true,
            reason: Some(reason.to_string()),
            working_hours: None,
            duration_minutes: ctx.duration_minutes,
            slots: Vec::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use crate::scheduling::window::fixtures::*;
    use super::*;
    use crate::models::enums::VacationType;
    use chrono::TimeZone;
    use chrono_tz::America::Sao_Paulo;

    const WEEKDAYS: [i16; 5] = [1, 2, 3, 4, 5];

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 8).unwrap()
    }

    fn ctx(date: NaiveDate, now: DateTime<Utc>, duration: i32) -> SlotContext {
        SlotContext {
            date,
            tz: Sao_Paulo,
            now,
            duration_minutes: duration,
            step_minutes: 10,
        }
    }

    fn long_ago() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_staff_close_bounds_last_slot() {
        let b = business(&WEEKDAYS, hm(9, 0), hm(18, 0));
        let s = working(&WEEKDAYS, hm(9, 0), hm(17, 0));
        let staff = StaffDay { working_hours: &s, vacations: &[], is_active: true };

        let result = compute_availability(&ctx(monday(), long_ago(), 60), &b, Some(staff), &[]);

        assert!(!result.is_closed);
        assert_eq!(result.slots.first().unwrap().time, "09:00");
        assert_eq!(result.slots.last().unwrap().time, "16:00");
        // 09:00 .. 16:00 in 10 minute steps
        assert_eq!(result.slots.len(), 43);
        assert!(result.slots.iter().all(|s| s.available));
    }

    #[test]
    fn test_vacation_yields_no_slots() {
        let all_days = [0, 1, 2, 3, 4, 5, 6];
        let b = business(&all_days, hm(8, 0), hm(20, 0));
        let s = working(&all_days, hm(8, 0), hm(20, 0));
        let from = NaiveDate::from_ymd_opt(2025, 9, 10).unwrap();
        let to = NaiveDate::from_ymd_opt(2025, 9, 15).unwrap();
        let v = vec![leave(from, to, VacationType::Vacation)];
        let staff = StaffDay { working_hours: &s, vacations: &v, is_active: true };

        for day in from.iter_days().take_while(|d| *d <= to) {
            for duration in [15, 30, 60, 180] {
                let result = compute_availability(&ctx(day, long_ago(), duration), &b, Some(staff), &[]);
                assert!(result.is_closed);
                assert!(result.slots.is_empty());
                assert!(result.reason.unwrap().contains("vacation"));
            }
        }
    }

    #[test]
    fn test_booked_slots_are_flagged() {
        let b = business(&WEEKDAYS, hm(9, 0), hm(12, 0));
        // 10:00 local = 13:00 UTC
        let booked = vec![Occupied {
            appointment_id: 1,
            start: Utc.with_ymd_and_hms(2025, 9, 8, 13, 0, 0).unwrap(),
            duration_minutes: 30,
        }];

        let result = compute_availability(&ctx(monday(), long_ago(), 30), &b, None, &booked);
        let by_time = |t: &str| result.slots.iter().find(|s| s.time == t).unwrap().clone();

        assert!(by_time("09:30").available);
        assert!(by_time("09:40").is_booked);
        assert!(by_time("10:00").is_booked);
        assert!(by_time("10:20").is_booked);
        assert!(by_time("10:30").available);
    }

    #[test]
    fn test_past_slots_use_establishment_zone() {
        let b = business(&WEEKDAYS, hm(9, 0), hm(12, 0));
        // 13:05 UTC is 10:05 in São Paulo
        let now = Utc.with_ymd_and_hms(2025, 9, 8, 13, 5, 0).unwrap();
        let result = compute_availability(&ctx(monday(), now, 30), &b, None, &[]);
        let by_time = |t: &str| result.slots.iter().find(|s| s.time == t).unwrap().clone();

        assert!(by_time("10:00").is_past);
        assert!(!by_time("10:00").available);
        assert!(!by_time("10:10").is_past);
        assert!(by_time("10:10").available);
    }

    #[test]
    fn test_closed_day_has_reason() {
        let b = business(&WEEKDAYS, hm(9, 0), hm(18, 0));
        let sunday = NaiveDate::from_ymd_opt(2025, 9, 7).unwrap();
        let result = compute_availability(&ctx(sunday, long_ago(), 30), &b, None, &[]);
        assert!(result.is_closed);
        assert!(result.slots.is_empty());
        assert!(result.working_hours.is_none());
        assert!(result.reason.is_some());
    }

    #[test]
    fn test_service_longer_than_window() {
        let b = business(&WEEKDAYS, hm(9, 0), hm(10, 0));
        let result = compute_availability(&ctx(monday(), long_ago(), 90), &b, None, &[]);
        assert!(!result.is_closed);
        assert!(result.slots.is_empty());
    }
}
