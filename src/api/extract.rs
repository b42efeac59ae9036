use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use tracing::debug;

use crate::api::{ApiError, AppState};
use crate::db::User;
use crate::services::ServiceError;

/// Pulls the token out of an `Authorization: Bearer <token>` header.
pub fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// The authenticated, active caller.
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| {
            debug!("Request without bearer token");
            ApiError::credentials()
        })?;

        let user = state.auth_service.authenticate(token).await?;
        if !user.is_active {
            return Err(ApiError::BadRequest("Inactive user".to_string()));
        }
        Ok(CurrentUser(user))
    }
}

/// An authenticated caller with the admin role.
pub struct AdminUser(pub User);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(ApiError::forbidden("Admin access required"));
        }
        Ok(AdminUser(user))
    }
}

/// The caller if a valid token for an active user was presented, otherwise `None`.
pub struct OptionalUser(pub Option<User>);

impl FromRequestParts<AppState> for OptionalUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts) else {
            return Ok(OptionalUser(None));
        };

        match state.auth_service.authenticate(token).await {
            Ok(user) if user.is_active => Ok(OptionalUser(Some(user))),
            Ok(_) | Err(ServiceError::Unauthorized(_)) => Ok(OptionalUser(None)),
            Err(e) => Err(e.into()),
        }
    }
}
