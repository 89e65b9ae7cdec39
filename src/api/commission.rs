//! Staff commission report endpoint

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    models::report::{CommissionReport, CommissionRequest},
};

use super::AuthenticatedUser;

/// Commission earned by a staff member over a date range
#[utoipa::path(
    post,
    path = "/staff/commission",
    tag = "staff",
    security(("bearer_auth" = [])),
    request_body = CommissionRequest,
    responses(
        (status = 200, description = "Commission report", body = CommissionReport),
        (status = 400, description = "Invalid date range", body = crate::error::ErrorResponse),
        (status = 403, description = "Report of another staff member", body = crate::error::ErrorResponse)
    )
)]
pub async fn commission_report(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(body): Json<CommissionRequest>,
) -> AppResult<Json<CommissionReport>> {
    let report = state.services.commission.report(&claims, &body).await?;
    Ok(Json(report))
}
