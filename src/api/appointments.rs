//! Appointment endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::appointment::{
        AppointmentDetails, AppointmentPage, AppointmentQuery, CreateAppointment, UpdateAppointment,
        UpdateAppointmentStatus,
    },
};

use super::{validated, AuthenticatedUser};

/// List appointments of the caller's establishment
#[utoipa::path(
    get,
    path = "/appointments",
    tag = "appointments",
    security(("bearer_auth" = [])),
    params(AppointmentQuery),
    responses(
        (status = 200, description = "Appointments page", body = AppointmentPage),
        (status = 400, description = "Invalid month or status filter", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_appointments(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<AppointmentQuery>,
) -> AppResult<Json<AppointmentPage>> {
    let page = state.services.appointments.list(&claims, &query).await?;
    Ok(Json(page))
}

/// Get an appointment with client, staff and service names
#[utoipa::path(
    get,
    path = "/appointments/{id}",
    tag = "appointments",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "Appointment details", body = AppointmentDetails),
        (status = 404, description = "Appointment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_appointment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<AppointmentDetails>> {
    let appointment = state.services.appointments.get(&claims, id).await?;
    Ok(Json(appointment))
}

/// Book an appointment
#[utoipa::path(
    post,
    path = "/appointments",
    tag = "appointments",
    security(("bearer_auth" = [])),
    request_body = CreateAppointment,
    responses(
        (status = 201, description = "Appointment created", body = AppointmentDetails),
        (status = 400, description = "Missing or malformed date/time", body = crate::error::ErrorResponse),
        (status = 404, description = "Service not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Slot already taken", body = crate::error::ErrorResponse),
        (status = 422, description = "Booking rule violated", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_appointment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateAppointment>,
) -> AppResult<(StatusCode, Json<AppointmentDetails>)> {
    let data = validated(data)?;
    let appointment = state.services.appointments.create(&claims, data).await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

/// Edit an appointment; a moved booking is validated again
#[utoipa::path(
    put,
    path = "/appointments/{id}",
    tag = "appointments",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Appointment ID")),
    request_body = UpdateAppointment,
    responses(
        (status = 200, description = "Appointment updated", body = AppointmentDetails),
        (status = 409, description = "Slot already taken", body = crate::error::ErrorResponse),
        (status = 422, description = "Booking rule violated", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_appointment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateAppointment>,
) -> AppResult<Json<AppointmentDetails>> {
    let data = validated(data)?;
    let appointment = state.services.appointments.update(&claims, id, data).await?;
    Ok(Json(appointment))
}

/// Change the status of an appointment
#[utoipa::path(
    patch,
    path = "/appointments/{id}/status",
    tag = "appointments",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Appointment ID")),
    request_body = UpdateAppointmentStatus,
    responses(
        (status = 200, description = "Status changed", body = AppointmentDetails),
        (status = 404, description = "Appointment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_appointment_status(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(body): Json<UpdateAppointmentStatus>,
) -> AppResult<Json<AppointmentDetails>> {
    let appointment = state
        .services
        .appointments
        .update_status(&claims, id, body.status)
        .await?;
    Ok(Json(appointment))
}

/// Delete an appointment
#[utoipa::path(
    delete,
    path = "/appointments/{id}",
    tag = "appointments",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Appointment ID")),
    responses(
        (status = 204, description = "Appointment deleted"),
        (status = 404, description = "Appointment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_appointment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.appointments.delete(&claims, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
