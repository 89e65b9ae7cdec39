//! Monthly appointment quota

use chrono::NaiveDate;

use super::calendar::month_start;
use crate::{error::BookingRejection, models::report::QuotaStatus};

/// Compare the month's appointment count against the plan limit.
/// A missing limit means unlimited.
pub fn evaluate_quota(current_count: i64, max_monthly: Option<i32>) -> QuotaStatus {
    let max_count = max_monthly.map(i64::from);
    QuotaStatus {
        can_create: max_count.map_or(true, |max| current_count < max),
        current_count,
        max_count,
    }
}

/// Reject a booking once the limit is reached
pub fn ensure_quota(status: QuotaStatus) -> Result<(), BookingRejection> {
    if status.can_create {
        return Ok(());
    }
    Err(BookingRejection::QuotaExceeded {
        current: status.current_count,
        max: status.max_count.unwrap_or_default(),
    })
}

/// Whether moving a booking from local date `from` to `to` brings it into
/// the month starting at `month`, where it was not counted before
pub fn moves_into_month(from: NaiveDate, to: NaiveDate, month: NaiveDate) -> bool {
    month_start(to) == month && month_start(from) != month
}
