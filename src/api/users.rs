use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::api::error::{ErrorResponse, MessageResponse};
use crate::api::extract::{AdminUser, CurrentUser};
use crate::api::{ApiError, AppState};
use crate::db::{User, UserChanges, UserResponse};
use crate::services::ListParams;

/// Admins may act on anyone, everybody else only on themselves.
fn ensure_self_or_admin(caller: &User, id: Uuid) -> Result<(), ApiError> {
    if caller.is_admin() || caller.id == id {
        Ok(())
    } else {
        Err(ApiError::forbidden("Not enough permissions"))
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "users",
    params(ListParams),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Users, oldest first", body = [UserResponse]),
        (status = 403, description = "Admin access required", body = ErrorResponse)
    )
)]
#[instrument(skip(state, _admin))]
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state.user_service.list(&params).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "User id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "The user", body = UserResponse),
        (status = 403, description = "Not enough permissions", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, caller), fields(id = %id))]
pub async fn get_user(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, ApiError> {
    ensure_self_or_admin(&caller, id)?;
    let user = state.user_service.get(id).await?;
    Ok(Json(user.into()))
}

#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = UserChanges,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 403, description = "Not enough permissions", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, caller, changes), fields(id = %id))]
pub async fn update_user(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<Uuid>,
    Json(changes): Json<UserChanges>,
) -> Result<Json<UserResponse>, ApiError> {
    ensure_self_or_admin(&caller, id)?;
    let user = state
        .user_service
        .update(id, &changes, caller.is_admin())
        .await?;
    info!("User {} updated by {}", user.id, caller.username);
    Ok(Json(user.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "User id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 403, description = "Admin access required", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, _admin), fields(id = %id))]
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.user_service.delete(id).await?;
    Ok(Json(MessageResponse::new("User deleted successfully")))
}
