//! Data models for the salon server

pub mod appointment;
pub mod catalog;
pub mod enums;
pub mod establishment;
pub mod finance;
pub mod loyalty;
pub mod outbox;
pub mod report;
pub mod schedule;
pub mod user;

// Re-export commonly used types
pub use appointment::{Appointment, AppointmentDetails};
pub use catalog::{Client, SalonService, Staff};
pub use enums::{AppointmentStatus, Role, TransactionType, VacationType};
pub use establishment::{Establishment, EstablishmentPlan};
pub use schedule::{BusinessHours, StaffVacation, StaffWorkingHours};
pub use user::UserClaims;
