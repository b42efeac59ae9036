use axum::{extract::State, Json};
use tracing::{info, instrument};

use crate::api::error::ErrorResponse;
use crate::api::extract::AdminUser;
use crate::api::{ApiError, AppState};
use crate::carbon::FactorUpdate;
use crate::db::EmissionFactorsRow;

#[utoipa::path(
    get,
    path = "/api/v1/emission-factors",
    tag = "emission-factors",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Active emission factors", body = EmissionFactorsRow),
        (status = 403, description = "Admin access required", body = ErrorResponse)
    )
)]
#[instrument(skip(state, _admin))]
pub async fn get_factors(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<EmissionFactorsRow>, ApiError> {
    let row = state.factor_service.active_row().await?;
    Ok(Json(row))
}

#[utoipa::path(
    put,
    path = "/api/v1/emission-factors",
    tag = "emission-factors",
    request_body = FactorUpdate,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Updated emission factors", body = EmissionFactorsRow),
        (status = 400, description = "Factor not positive and finite", body = ErrorResponse),
        (status = 403, description = "Admin access required", body = ErrorResponse)
    )
)]
#[instrument(skip(state, admin, update))]
pub async fn update_factors(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(update): Json<FactorUpdate>,
) -> Result<Json<EmissionFactorsRow>, ApiError> {
    let row = state.factor_service.update(&update).await?;
    info!("Emission factors changed by {}", admin.username);
    Ok(Json(row))
}
