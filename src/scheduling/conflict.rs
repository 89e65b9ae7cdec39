//! Staff double-booking detection
//!
//! An appointment occupies the closed interval
//! `[start, start + duration - 1 minute]`. Both the existing and the
//! proposed appointment use that convention, so an appointment ending at
//! 10:00 and one starting at 10:00 do not conflict.

use chrono::{DateTime, Duration, Utc};

use crate::models::Appointment;

/// Time held by an existing appointment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occupied {
    pub appointment_id: i32,
    pub start: DateTime<Utc>,
    pub duration_minutes: i32,
}

impl Occupied {
    pub fn end(&self) -> DateTime<Utc> {
        occupied_end(self.start, self.duration_minutes)
    }

    /// Appointments that still hold their slot (cancelled ones are skipped)
    pub fn from_appointments<'a, I>(appointments: I) -> Vec<Occupied>
    where
        I: IntoIterator<Item = &'a Appointment>,
    {
        appointments
            .into_iter()
            .filter(|a| a.status.occupies_slot())
            .map(|a| Occupied {
                appointment_id: a.id,
                start: a.start_at,
                duration_minutes: a.duration_minutes,
            })
            .collect()
    }
}

/// Last occupied minute of an appointment
pub fn occupied_end(start: DateTime<Utc>, duration_minutes: i32) -> DateTime<Utc> {
    start + Duration::minutes(duration_minutes as i64) - Duration::minutes(1)
}

/// Closed-interval overlap test
pub fn overlaps(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start <= b_end && a_end >= b_start
}

/// First existing appointment overlapping the proposed one.
///
/// `exclude` is the appointment being edited, which never conflicts with
/// itself.
pub fn find_conflict(
    existing: &[Occupied],
    start: DateTime<Utc>,
    duration_minutes: i32,
    exclude: Option<i32>,
) -> Option<&Occupied> {
    let end = occupied_end(start, duration_minutes);
    existing
        .iter()
        .filter(|o| Some(o.appointment_id) != exclude)
        .find(|o| overlaps(start, end, o.start, o.end()))
}
