//! Available slots endpoint

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::appointment::{AvailabilityQuery, AvailabilityResponse},
};

use super::AuthenticatedUser;

/// Candidate start times for a service on a day
#[utoipa::path(
    get,
    path = "/appointments/available-slots",
    tag = "appointments",
    security(("bearer_auth" = [])),
    params(AvailabilityQuery),
    responses(
        (status = 200, description = "Slots for the day; closed days carry a reason", body = AvailabilityResponse),
        (status = 400, description = "Invalid date", body = crate::error::ErrorResponse),
        (status = 404, description = "Service not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn available_slots(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<AvailabilityQuery>,
) -> AppResult<Json<AvailabilityResponse>> {
    let response = state.services.availability.available_slots(&claims, &query).await?;
    Ok(Json(response))
}
