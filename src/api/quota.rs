//! Monthly quota endpoint

use axum::{extract::State, Json};

use crate::{error::AppResult, models::report::QuotaStatus};

use super::AuthenticatedUser;

/// Whether the establishment may book more appointments this month
#[utoipa::path(
    get,
    path = "/appointments/quota",
    tag = "appointments",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current quota", body = QuotaStatus)
    )
)]
pub async fn get_quota(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<QuotaStatus>> {
    let quota = state.services.quota.current(claims.establishment_id).await?;
    Ok(Json(quota))
}
