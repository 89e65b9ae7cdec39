//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{appointments, availability, commission, health, quota, schedules};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Salon API",
        version = "1.0.0",
        description = "Appointment scheduling REST API for multi-tenant salons",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Appointments
        appointments::list_appointments,
        appointments::get_appointment,
        appointments::create_appointment,
        appointments::update_appointment,
        appointments::update_appointment_status,
        appointments::delete_appointment,
        availability::available_slots,
        quota::get_quota,
        // Staff
        commission::commission_report,
        // Schedules
        schedules::get_business_hours,
        schedules::update_business_hours,
        schedules::get_staff_hours,
        schedules::update_staff_hours,
        schedules::list_vacations,
        schedules::create_vacation,
        schedules::delete_vacation,
    ),
    components(
        schemas(
            // Appointments
            crate::models::appointment::Appointment,
            crate::models::appointment::AppointmentDetails,
            crate::models::appointment::AppointmentPage,
            crate::models::appointment::CreateAppointment,
            crate::models::appointment::UpdateAppointment,
            crate::models::appointment::UpdateAppointmentStatus,
            crate::models::enums::AppointmentStatus,
            // Availability
            crate::models::appointment::AvailabilityResponse,
            crate::models::appointment::TimeSlot,
            crate::models::appointment::WorkingWindow,
            // Reports
            crate::models::report::QuotaStatus,
            crate::models::report::CommissionRequest,
            crate::models::report::CommissionReport,
            crate::models::report::CommissionLine,
            // Schedules
            crate::models::schedule::BusinessHours,
            crate::models::schedule::UpsertBusinessHours,
            crate::models::schedule::StaffWorkingHours,
            crate::models::schedule::UpsertStaffWorkingHours,
            crate::models::schedule::StaffVacation,
            crate::models::schedule::CreateStaffVacation,
            crate::models::enums::VacationType,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "appointments", description = "Booking, availability and quota"),
        (name = "staff", description = "Staff reports"),
        (name = "schedules", description = "Business hours, working hours and leave")
    )
)]
pub struct ApiDoc;

/// Swagger UI serving the generated document
pub fn create_openapi_router() -> Router {
    Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_static_routes_before_ids() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/appointments/available-slots"));
        assert!(paths.contains_key("/appointments/quota"));
        assert!(paths.contains_key("/appointments/{id}/status"));
        assert!(paths.contains_key("/staff/commission"));
    }
}
