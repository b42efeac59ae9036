use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::api::error::ErrorResponse;
use crate::api::extract::{AdminUser, OptionalUser};
use crate::api::{ApiError, AppState};
use crate::db::{NewPanchayat, Panchayat, Role, User};
use crate::services::ListParams;

/// The panchayat a regular user is confined to, if any.
fn confined_to(user: Option<&User>) -> Option<Uuid> {
    user.filter(|u| u.role == Role::User)
        .and_then(|u| u.panchayat_id)
}

#[utoipa::path(
    get,
    path = "/api/v1/panchayats",
    tag = "panchayats",
    params(ListParams),
    responses(
        (status = 200, description = "Panchayats visible to the caller", body = [Panchayat])
    )
)]
#[instrument(skip(state, user))]
pub async fn list_panchayats(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Panchayat>>, ApiError> {
    let only = confined_to(user.as_ref());
    let panchayats = state.panchayat_service.list(&params, only).await?;
    debug!("Returning {} panchayats", panchayats.len());
    Ok(Json(panchayats))
}

#[utoipa::path(
    post,
    path = "/api/v1/panchayats",
    tag = "panchayats",
    request_body = NewPanchayat,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Panchayat created", body = Panchayat),
        (status = 400, description = "Missing name, district or state", body = ErrorResponse),
        (status = 403, description = "Admin access required", body = ErrorResponse)
    )
)]
#[instrument(skip(state, _admin, panchayat), fields(name = %panchayat.name))]
pub async fn create_panchayat(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Json(panchayat): Json<NewPanchayat>,
) -> Result<Json<Panchayat>, ApiError> {
    let created = state.panchayat_service.create(&panchayat).await?;
    info!("Created panchayat {} ({})", created.name, created.id);
    Ok(Json(created))
}

#[utoipa::path(
    get,
    path = "/api/v1/panchayats/{id}",
    tag = "panchayats",
    params(("id" = Uuid, Path, description = "Panchayat id")),
    responses(
        (status = 200, description = "The panchayat", body = Panchayat),
        (status = 403, description = "Panchayat belongs to another user", body = ErrorResponse),
        (status = 404, description = "Panchayat not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user), fields(id = %id))]
pub async fn get_panchayat(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Panchayat>, ApiError> {
    let panchayat = state.panchayat_service.get(id).await?;

    if let Some(user) = user.as_ref().filter(|u| u.role == Role::User) {
        if user.panchayat_id != Some(id) {
            return Err(ApiError::forbidden("Not enough permissions"));
        }
    }

    Ok(Json(panchayat))
}
