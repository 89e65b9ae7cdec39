//! Business hours, staff working hours and staff leave endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::schedule::{
        BusinessHours, CreateStaffVacation, StaffVacation, StaffWorkingHours, UpsertBusinessHours,
        UpsertStaffWorkingHours,
    },
};

use super::AuthenticatedUser;

/// Weekly opening hours of the establishment
#[utoipa::path(
    get,
    path = "/business-hours",
    tag = "schedules",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Business hours by weekday", body = Vec<BusinessHours>)
    )
)]
pub async fn get_business_hours(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<BusinessHours>>> {
    let hours = state.services.schedules.business_hours(&claims).await?;
    Ok(Json(hours))
}

/// Replace opening hours for the given weekdays
#[utoipa::path(
    put,
    path = "/business-hours",
    tag = "schedules",
    security(("bearer_auth" = [])),
    request_body = Vec<UpsertBusinessHours>,
    responses(
        (status = 200, description = "Business hours updated", body = Vec<BusinessHours>),
        (status = 400, description = "Invalid weekday or times", body = crate::error::ErrorResponse),
        (status = 403, description = "Admin rights required", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_business_hours(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(days): Json<Vec<UpsertBusinessHours>>,
) -> AppResult<Json<Vec<BusinessHours>>> {
    let hours = state.services.schedules.set_business_hours(&claims, days).await?;
    Ok(Json(hours))
}

/// Weekly working hours of a staff member
#[utoipa::path(
    get,
    path = "/staff/{id}/working-hours",
    tag = "schedules",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Staff ID")),
    responses(
        (status = 200, description = "Working hours by weekday", body = Vec<StaffWorkingHours>),
        (status = 404, description = "Staff member not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_staff_hours(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<StaffWorkingHours>>> {
    let hours = state.services.schedules.staff_hours(&claims, id).await?;
    Ok(Json(hours))
}

/// Replace working hours of a staff member for the given weekdays
#[utoipa::path(
    put,
    path = "/staff/{id}/working-hours",
    tag = "schedules",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Staff ID")),
    request_body = Vec<UpsertStaffWorkingHours>,
    responses(
        (status = 200, description = "Working hours updated", body = Vec<StaffWorkingHours>),
        (status = 400, description = "Invalid weekday or times", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_staff_hours(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(days): Json<Vec<UpsertStaffWorkingHours>>,
) -> AppResult<Json<Vec<StaffWorkingHours>>> {
    let hours = state.services.schedules.set_staff_hours(&claims, id, days).await?;
    Ok(Json(hours))
}

/// Leave periods of a staff member
#[utoipa::path(
    get,
    path = "/staff/{id}/vacations",
    tag = "schedules",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Staff ID")),
    responses(
        (status = 200, description = "Active leave periods", body = Vec<StaffVacation>)
    )
)]
pub async fn list_vacations(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<StaffVacation>>> {
    let vacations = state.services.schedules.vacations(&claims, id).await?;
    Ok(Json(vacations))
}

/// Record a leave period
#[utoipa::path(
    post,
    path = "/staff/{id}/vacations",
    tag = "schedules",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Staff ID")),
    request_body = CreateStaffVacation,
    responses(
        (status = 201, description = "Leave recorded", body = StaffVacation),
        (status = 400, description = "Invalid date range", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_vacation(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<CreateStaffVacation>,
) -> AppResult<(StatusCode, Json<StaffVacation>)> {
    let vacation = state.services.schedules.create_vacation(&claims, id, data).await?;
    Ok((StatusCode::CREATED, Json(vacation)))
}

/// Cancel a leave period
#[utoipa::path(
    delete,
    path = "/staff/vacations/{id}",
    tag = "schedules",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Leave ID")),
    responses(
        (status = 204, description = "Leave cancelled"),
        (status = 404, description = "Leave not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_vacation(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.schedules.delete_vacation(&claims, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
