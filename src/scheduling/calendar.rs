//! Calendar helpers bound to an establishment's timezone

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Day of week with 0=Sunday .. 6=Saturday
pub fn weekday_index(date: NaiveDate) -> i16 {
    date.weekday().num_days_from_sunday() as i16
}

/// Minutes since midnight
pub fn minute_of_day(time: NaiveTime) -> i64 {
    use chrono::Timelike;
    (time.hour() * 60 + time.minute()) as i64
}

/// Time of day for a minute count; None past the end of the day
pub fn time_from_minutes(minutes: i64) -> Option<NaiveTime> {
    if !(0..24 * 60).contains(&minutes) {
        return None;
    }
    NaiveTime::from_hms_opt((minutes / 60) as u32, (minutes % 60) as u32, 0)
}

/// The instant of a local wall-clock time, or None when the time falls in
/// a DST gap. Ambiguous times resolve to the earlier instant.
pub fn local_instant(tz: Tz, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Like `local_instant`, but a time inside a DST gap moves forward to the
/// first instant after the gap.
pub fn local_instant_lenient(tz: Tz, local: NaiveDateTime) -> DateTime<Utc> {
    let mut candidate = local;
    for _ in 0..4 {
        if let Some(dt) = tz.from_local_datetime(&candidate).earliest() {
            return dt.with_timezone(&Utc);
        }
        candidate += Duration::minutes(30);
    }
    // No zone has a gap longer than two hours
    Utc.from_utc_datetime(&local)
}

/// `[start, end)` instants covering one local calendar day
pub fn day_bounds(tz: Tz, date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = local_instant_lenient(tz, date.and_time(NaiveTime::MIN));
    let next = date.succ_opt().unwrap_or(date);
    let end = local_instant_lenient(tz, next.and_time(NaiveTime::MIN));
    (start, end)
}

/// `[start, end)` instants covering an inclusive range of local days
pub fn range_bounds(tz: Tz, first: NaiveDate, last: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let (start, _) = day_bounds(tz, first);
    let (_, end) = day_bounds(tz, last);
    (start, end)
}

/// First day of the month containing `date`
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// `[start, end)` instants covering the local calendar month of `date`
pub fn month_bounds(tz: Tz, date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let first = month_start(date);
    let next_first = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    }
    .unwrap_or(first);
    (
        local_instant_lenient(tz, first.and_time(NaiveTime::MIN)),
        local_instant_lenient(tz, next_first.and_time(NaiveTime::MIN)),
    )
}

/// Parse a `YYYY-MM` month into its first day
pub fn parse_month(month: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", month.trim()), "%Y-%m-%d").ok()
}

/// Today's date in the zone
pub fn local_today(tz: Tz, now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}
