//! Error types for the salon server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::models::enums::VacationType;

/// Stable numeric error codes returned to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    NotAuthorized = 2,
    DbFailure = 3,
    NotFound = 4,
    BadValue = 5,
    ServiceNotFound = 10,
    MissingDateTime = 11,
    InvalidDateTime = 12,
    PastDate = 13,
    ClosedOnWeekday = 14,
    OutsideBusinessHours = 15,
    EndsAfterClosing = 16,
    StaffNotWorking = 17,
    StaffOnLeave = 18,
    OutsideStaffHours = 19,
    SlotConflict = 20,
    QuotaExceeded = 21,
    StaffInactive = 23,
}

/// Why a booking request (create or update) was refused.
///
/// One variant per validation rule, so callers can tell them apart.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingRejection {
    #[error("Service not found")]
    ServiceNotFound,

    #[error("Date and time are required")]
    MissingDateTime,

    #[error("Invalid date or time format (expected YYYY-MM-DD and HH:MM)")]
    InvalidDateTime,

    #[error("Cannot book an appointment in the past")]
    PastDate,

    #[error("The establishment is closed on this day")]
    ClosedOnWeekday,

    #[error("Requested time is outside business hours ({open} - {close})")]
    OutsideBusinessHours { open: String, close: String },

    #[error("The service would end after closing time ({close})")]
    EndsAfterClosing { close: String },

    #[error("The staff member is inactive")]
    StaffInactive,

    #[error("The staff member does not work on this day")]
    StaffNotWorking,

    #[error("The staff member is on leave ({0})")]
    StaffOnLeave(VacationType),

    #[error("Requested time is outside the staff member's working hours ({start} - {end})")]
    OutsideStaffHours { start: String, end: String },

    #[error("The staff member already has an appointment at this time")]
    SlotConflict,

    #[error("Monthly appointment limit reached ({current}/{max})")]
    QuotaExceeded { current: i64, max: i64 },
}

impl BookingRejection {
    pub fn code(&self) -> ErrorCode {
        match self {
            BookingRejection::ServiceNotFound => ErrorCode::ServiceNotFound,
            BookingRejection::MissingDateTime => ErrorCode::MissingDateTime,
            BookingRejection::InvalidDateTime => ErrorCode::InvalidDateTime,
            BookingRejection::PastDate => ErrorCode::PastDate,
            BookingRejection::ClosedOnWeekday => ErrorCode::ClosedOnWeekday,
            BookingRejection::OutsideBusinessHours { .. } => ErrorCode::OutsideBusinessHours,
            BookingRejection::EndsAfterClosing { .. } => ErrorCode::EndsAfterClosing,
            BookingRejection::StaffInactive => ErrorCode::StaffInactive,
            BookingRejection::StaffNotWorking => ErrorCode::StaffNotWorking,
            BookingRejection::StaffOnLeave(_) => ErrorCode::StaffOnLeave,
            BookingRejection::OutsideStaffHours { .. } => ErrorCode::OutsideStaffHours,
            BookingRejection::SlotConflict => ErrorCode::SlotConflict,
            BookingRejection::QuotaExceeded { .. } => ErrorCode::QuotaExceeded,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            BookingRejection::ServiceNotFound => StatusCode::NOT_FOUND,
            BookingRejection::MissingDateTime | BookingRejection::InvalidDateTime => {
                StatusCode::BAD_REQUEST
            }
            BookingRejection::SlotConflict => StatusCode::CONFLICT,
            _ => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Booking rejected: {0}")]
    Booking(#[from] BookingRejection),
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Authentication(msg) => {
                (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthorized, msg.clone())
            }
            AppError::Authorization(msg) => {
                (StatusCode::FORBIDDEN, ErrorCode::NotAuthorized, msg.clone())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorCode::NotFound, msg.clone()),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DbFailure,
                    format!("Database error: {}", e),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    format!("Internal server error: {}", msg),
                )
            }
            AppError::Booking(rejection) => {
                (rejection.status(), rejection.code(), rejection.to_string())
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_rejection_status_mapping() {
        let resp = AppError::from(BookingRejection::SlotConflict).into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let resp = AppError::from(BookingRejection::InvalidDateTime).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = AppError::from(BookingRejection::QuotaExceeded { current: 3, max: 3 })
            .into_response();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let resp = AppError::from(BookingRejection::StaffInactive).into_response();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(BookingRejection::StaffInactive.code(), ErrorCode::StaffInactive);
    }

    #[test]
    fn test_booking_rejection_messages_are_specific() {
        assert_eq!(
            BookingRejection::QuotaExceeded { current: 10, max: 10 }.to_string(),
            "Monthly appointment limit reached (10/10)"
        );
        assert_eq!(
            BookingRejection::StaffOnLeave(VacationType::SickLeave).to_string(),
            "The staff member is on leave (sick leave)"
        );
        assert_ne!(
            BookingRejection::PastDate.to_string(),
            BookingRejection::ClosedOnWeekday.to_string()
        );
    }
}
