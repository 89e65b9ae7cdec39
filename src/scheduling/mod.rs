//! Scheduling engine
//!
//! Pure temporal rules behind booking: working-window resolution,
//! slot enumeration, conflict detection, quota and commission arithmetic.
//! Nothing in here touches the database; services load the rows and hand
//! them over.

pub mod availability;
pub mod booking;
pub mod calendar;
pub mod commission;
pub mod conflict;
pub mod lifecycle;
pub mod quota;
pub mod window;

pub use availability::{compute_availability, SlotContext};
pub use booking::{parse_date_time, validate_booking, validate_revival};
pub use conflict::{find_conflict, occupied_end, Occupied};
pub use window::{ClosedReason, DayWindow, StaffDay};
pub use commission::build_commission_report;
pub use lifecycle::{reclaims_slot, triggers_completion};
pub use quota::{ensure_quota, evaluate_quota, moves_into_month};
