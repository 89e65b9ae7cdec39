//! Booking validation
//!
//! Applies the same window and slot rules as the availability walk to a
//! single requested start time, reporting the first rule it breaks.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use super::{
    availability::{evaluate_start, SlotContext},
    calendar::{local_instant, minute_of_day, time_from_minutes},
    conflict::{find_conflict, Occupied},
    quota::ensure_quota,
    window::{business_day, staff_day, DayWindow, StaffDay},
    ClosedReason,
};
use crate::{
    error::BookingRejection,
    models::{report::QuotaStatus, schedule::BusinessHours},
};

/// Parse the date and time fields of a booking request
pub fn parse_date_time(
    date: Option<&str>,
    time: Option<&str>,
) -> Result<(NaiveDate, NaiveTime), BookingRejection> {
    let (date, time) = match (date.map(str::trim), time.map(str::trim)) {
        (Some(d), Some(t)) if !d.is_empty() && !t.is_empty() => (d, t),
        _ => return Err(BookingRejection::MissingDateTime),
    };

    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| BookingRejection::InvalidDateTime)?;
    let time = NaiveTime::parse_from_str(time, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M:%S"))
        .map_err(|_| BookingRejection::InvalidDateTime)?;

    // Bookings are minute-aligned
    let time = time_from_minutes(minute_of_day(time)).ok_or(BookingRejection::InvalidDateTime)?;

    Ok((date, time))
}

fn hhmm(t: NaiveTime) -> String {
    t.format("%H:%M").to_string()
}

/// Validate a booking at `time` on `ctx.date` and return its start instant.
///
/// Checks run in a fixed order: past, establishment open, business hours,
/// closing time, staff working day, staff leave, staff hours, conflicts.
/// The monthly quota is checked by the caller under lock.
pub fn validate_booking(
    ctx: &SlotContext,
    time: NaiveTime,
    business_hours: &[BusinessHours],
    staff: StaffDay<'_>,
    booked: &[Occupied],
    exclude: Option<i32>,
) -> Result<DateTime<Utc>, BookingRejection> {
    let start_minute = minute_of_day(time);
    let end_minute = start_minute + ctx.duration_minutes as i64;

    let business = business_day(ctx.date, business_hours)
        .map_err(|_| BookingRejection::ClosedOnWeekday);

    let business_window = match business {
        Ok(b) => DayWindow {
            business_open: b.open_time,
            business_close: b.close_time,
            open: b.open_time,
            close: b.close_time,
        },
        Err(rejection) => {
            // Past-date still wins over a closed weekday
            if is_past(ctx, time)? {
                return Err(BookingRejection::PastDate);
            }
            return Err(rejection);
        }
    };

    // A local time inside a DST gap is not a valid instant
    let verdict = evaluate_start(&business_window, ctx, time, &[], exclude)
        .ok_or(BookingRejection::InvalidDateTime)?;
    if verdict.is_past {
        return Err(BookingRejection::PastDate);
    }

    if start_minute < business_window.open_minute() || start_minute >= business_window.close_minute() {
        return Err(BookingRejection::OutsideBusinessHours {
            open: hhmm(business_window.open),
            close: hhmm(business_window.close),
        });
    }
    if verdict.would_exceed_closing_time {
        return Err(BookingRejection::EndsAfterClosing {
            close: hhmm(business_window.close),
        });
    }

    let hours = staff_day(ctx.date, staff).map_err(|reason| match reason {
        ClosedReason::StaffInactive => BookingRejection::StaffInactive,
        ClosedReason::StaffOnLeave(kind) => BookingRejection::StaffOnLeave(kind),
        _ => BookingRejection::StaffNotWorking,
    })?;

    let open = business_window.open.max(hours.start_time);
    let close = business_window.close.min(hours.end_time);
    if start_minute < minute_of_day(open) || end_minute > minute_of_day(close) {
        return Err(BookingRejection::OutsideStaffHours {
            start: hhmm(hours.start_time),
            end: hhmm(hours.end_time),
        });
    }

    let staff_window = DayWindow {
        open,
        close,
        ..business_window
    };
    let verdict = evaluate_start(&staff_window, ctx, time, booked, exclude)
        .ok_or(BookingRejection::InvalidDateTime)?;
    if verdict.is_booked {
        return Err(BookingRejection::SlotConflict);
    }

    Ok(verdict.start)
}

/// Check that a cancelled appointment can hold its slot again: nobody took
/// it in the meantime and the monthly quota still has room.
pub fn validate_revival(
    appointment: &Occupied,
    booked: &[Occupied],
    quota: QuotaStatus,
) -> Result<(), BookingRejection> {
    let taken = find_conflict(
        booked,
        appointment.start,
        appointment.duration_minutes,
        Some(appointment.appointment_id),
    );
    if taken.is_some() {
        return Err(BookingRejection::SlotConflict);
    }
    ensure_quota(quota)
}

/// Whether the requested time is already past, for days with no window
fn is_past(ctx: &SlotContext, time: NaiveTime) -> Result<bool, BookingRejection> {
    let start = local_instant(ctx.tz, ctx.date, time)
        .ok_or(BookingRejection::InvalidDateTime)?;
    Ok(start <= ctx.now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::enums::VacationType,
        scheduling::{availability::compute_availability, quota::evaluate_quota, window::fixtures::*},
    };
    use chrono::TimeZone;
    use chrono_tz::America::Sao_Paulo;

    const WEEKDAYS: [i16; 5] = [1, 2, 3, 4, 5];

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 8).unwrap()
    }

    fn ctx(now: DateTime<Utc>, duration: i32) -> SlotContext {
        SlotContext {
            date: monday(),
            tz: Sao_Paulo,
            now,
            duration_minutes: duration,
            step_minutes: 10,
        }
    }

    fn long_ago() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    /// 09:00 local on 2025-09-08 plus `minutes`
    fn local(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 8, 12, 0, 0).unwrap() + chrono::Duration::minutes(minutes)
    }

    #[test]
    fn test_parse_date_time() {
        assert_eq!(
            parse_date_time(Some("2025-09-08"), Some("09:30")),
            Ok((monday(), hm(9, 30)))
        );
        assert_eq!(
            parse_date_time(Some("2025-09-08"), Some("09:30:45")),
            Ok((monday(), hm(9, 30)))
        );
        assert_eq!(parse_date_time(None, Some("09:30")), Err(BookingRejection::MissingDateTime));
        assert_eq!(parse_date_time(Some("2025-09-08"), Some(" ")), Err(BookingRejection::MissingDateTime));
        assert_eq!(parse_date_time(Some("08/09/2025"), Some("09:30")), Err(BookingRejection::InvalidDateTime));
        assert_eq!(parse_date_time(Some("2025-09-08"), Some("25:00")), Err(BookingRejection::InvalidDateTime));
    }

    #[test]
    fn test_rejections_in_order() {
        let b = business(&WEEKDAYS, hm(9, 0), hm(18, 0));
        let s = working(&WEEKDAYS, hm(9, 0), hm(17, 0));
        let staff = StaffDay { working_hours: &s, vacations: &[], is_active: true };
        let c = ctx(long_ago(), 60);

        assert_eq!(
            validate_booking(&c, hm(8, 0), &b, staff, &[], None),
            Err(BookingRejection::OutsideBusinessHours { open: "09:00".into(), close: "18:00".into() })
        );
        assert_eq!(
            validate_booking(&c, hm(17, 30), &b, staff, &[], None),
            Err(BookingRejection::EndsAfterClosing { close: "18:00".into() })
        );
        assert_eq!(
            validate_booking(&c, hm(16, 30), &b, staff, &[], None),
            Err(BookingRejection::OutsideStaffHours { start: "09:00".into(), end: "17:00".into() })
        );
        assert_eq!(validate_booking(&c, hm(16, 0), &b, staff, &[], None), Ok(local(7 * 60)));

        let past = ctx(Utc.with_ymd_and_hms(2025, 9, 9, 0, 0, 0).unwrap(), 60);
        assert_eq!(
            validate_booking(&past, hm(10, 0), &b, staff, &[], None),
            Err(BookingRejection::PastDate)
        );
    }

    #[test]
    fn test_closed_weekday_and_leave() {
        let b = business(&[2, 3], hm(9, 0), hm(18, 0));
        let s = working(&WEEKDAYS, hm(9, 0), hm(17, 0));
        let staff = StaffDay { working_hours: &s, vacations: &[], is_active: true };
        assert_eq!(
            validate_booking(&ctx(long_ago(), 30), hm(10, 0), &b, staff, &[], None),
            Err(BookingRejection::ClosedOnWeekday)
        );

        let b = business(&WEEKDAYS, hm(9, 0), hm(18, 0));
        let v = vec![leave(monday(), monday(), VacationType::TimeOff)];
        let staff = StaffDay { working_hours: &s, vacations: &v, is_active: true };
        assert_eq!(
            validate_booking(&ctx(long_ago(), 30), hm(10, 0), &b, staff, &[], None),
            Err(BookingRejection::StaffOnLeave(VacationType::TimeOff))
        );

        let s = working(&[2], hm(9, 0), hm(17, 0));
        let staff = StaffDay { working_hours: &s, vacations: &[], is_active: true };
        assert_eq!(
            validate_booking(&ctx(long_ago(), 30), hm(10, 0), &b, staff, &[], None),
            Err(BookingRejection::StaffNotWorking)
        );
    }

    #[test]
    fn test_back_to_back_boundary() {
        let b = business(&WEEKDAYS, hm(9, 0), hm(18, 0));
        let s = working(&WEEKDAYS, hm(9, 0), hm(18, 0));
        let staff = StaffDay { working_hours: &s, vacations: &[], is_active: true };
        // Existing 09:00-09:30 local
        let booked = vec![Occupied { appointment_id: 1, start: local(0), duration_minutes: 30 }];
        let c = ctx(long_ago(), 30);

        assert_eq!(validate_booking(&c, hm(9, 30), &b, staff, &booked, None), Ok(local(30)));
        assert_eq!(
            validate_booking(&c, hm(9, 29), &b, staff, &booked, None),
            Err(BookingRejection::SlotConflict)
        );
        // Editing the booked appointment itself
        assert_eq!(validate_booking(&c, hm(9, 10), &b, staff, &booked, Some(1)), Ok(local(10)));
    }

    #[test]
    fn test_offered_slots_are_bookable_and_others_rejected() {
        let b = business(&WEEKDAYS, hm(9, 0), hm(18, 0));
        let s = working(&WEEKDAYS, hm(9, 0), hm(17, 0));
        let staff = StaffDay { working_hours: &s, vacations: &[], is_active: true };
        let booked = vec![
            Occupied { appointment_id: 1, start: local(60), duration_minutes: 45 },
            Occupied { appointment_id: 2, start: local(300), duration_minutes: 30 },
        ];
        // 10:32 local: morning slots are past
        let now = local(92);

        for duration in [20, 45, 60] {
            let c = ctx(now, duration);
            let result = compute_availability(&c, &b, Some(staff), &booked);
            assert!(!result.slots.is_empty());

            for slot in &result.slots {
                let time = NaiveTime::parse_from_str(&slot.time, "%H:%M").unwrap();
                let outcome = validate_booking(&c, time, &b, staff, &booked, None);
                if slot.available {
                    assert!(outcome.is_ok(), "{} should be bookable", slot.time);
                } else if slot.is_past {
                    assert_eq!(outcome, Err(BookingRejection::PastDate));
                } else {
                    assert!(slot.is_booked);
                    assert_eq!(outcome, Err(BookingRejection::SlotConflict));
                }
            }

            // Starts that are never offered are never accepted either
            let offered: Vec<&str> = result.slots.iter().map(|s| s.time.as_str()).collect();
            for minute in (9 * 60..18 * 60).step_by(10) {
                let time = NaiveTime::from_hms_opt(minute / 60, minute % 60, 0).unwrap();
                let label = time.format("%H:%M").to_string();
                if !offered.contains(&label.as_str()) {
                    assert!(validate_booking(&c, time, &b, staff, &booked, None).is_err());
                }
            }
        }
    }

    #[test]
    fn test_inactive_staff_is_rejected_like_availability_reports() {
        let b = business(&WEEKDAYS, hm(9, 0), hm(18, 0));
        let s = working(&WEEKDAYS, hm(9, 0), hm(17, 0));
        let staff = StaffDay { working_hours: &s, vacations: &[], is_active: false };
        let c = ctx(long_ago(), 30);

        let listing = compute_availability(&c, &b, Some(staff), &[]);
        assert!(listing.is_closed);
        assert!(listing.slots.is_empty());
        assert_eq!(listing.reason.as_deref(), Some("The staff member is inactive"));

        assert_eq!(
            validate_booking(&c, hm(10, 0), &b, staff, &[], None),
            Err(BookingRejection::StaffInactive)
        );
    }

    #[test]
    fn test_revival_rejected_when_slot_was_rebooked() {
        // Cancelled appointment 1 at 10:00 local, rebooked by appointment 2
        let cancelled = Occupied { appointment_id: 1, start: local(60), duration_minutes: 30 };
        let rebooked = vec![Occupied { appointment_id: 2, start: local(60), duration_minutes: 30 }];
        let room = evaluate_quota(1, Some(10));

        assert_eq!(
            validate_revival(&cancelled, &rebooked, room),
            Err(BookingRejection::SlotConflict)
        );

        // Overlapping the tail end also conflicts; back-to-back does not
        let later = vec![Occupied { appointment_id: 2, start: local(89), duration_minutes: 30 }];
        assert_eq!(validate_revival(&cancelled, &later, room), Err(BookingRejection::SlotConflict));
        let adjacent = vec![Occupied { appointment_id: 2, start: local(90), duration_minutes: 30 }];
        assert_eq!(validate_revival(&cancelled, &adjacent, room), Ok(()));
    }

    #[test]
    fn test_revival_ignores_itself_and_checks_quota() {
        let appointment = Occupied { appointment_id: 1, start: local(60), duration_minutes: 30 };
        let booked = vec![appointment];

        assert_eq!(validate_revival(&appointment, &booked, evaluate_quota(4, Some(10))), Ok(()));
        assert_eq!(
            validate_revival(&appointment, &[], evaluate_quota(10, Some(10))),
            Err(BookingRejection::QuotaExceeded { current: 10, max: 10 })
        );
    }
}
