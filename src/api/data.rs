use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use tracing::{info, instrument};
use utoipa::IntoParams;
use uuid::Uuid;

use crate::api::error::{ErrorResponse, MessageResponse};
use crate::api::extract::CurrentUser;
use crate::api::{ApiError, AppState};
use crate::carbon::Month;
use crate::db::{
    MonthlyUsageRecord, NewUsageRecord, Role, UsageFilter, UsageRecordUpdate, User,
};
use crate::services::{PaginationParams, UsagePage};

/// Record filters accepted by the data and analytics endpoints.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UsageQuery {
    pub user_id: Option<Uuid>,
    pub panchayat_id: Option<Uuid>,
    /// Full or three-letter month name, any casing
    #[param(value_type = Option<String>, example = "Jan")]
    pub month: Option<Month>,
    pub year: Option<i32>,
}

impl UsageQuery {
    /// Regular users only ever see their own records, whatever they asked for.
    pub fn scoped_to(&self, caller: &User) -> UsageFilter {
        let user_id = match caller.role {
            Role::User => Some(caller.id),
            Role::Admin => self.user_id,
        };
        UsageFilter {
            user_id,
            panchayat_id: self.panchayat_id,
            month: self.month,
            year: self.year,
        }
    }
}

fn ensure_owner(caller: &User, record: &MonthlyUsageRecord, detail: &str) -> Result<(), ApiError> {
    if caller.role == Role::User && record.user_id != caller.id {
        return Err(ApiError::forbidden(detail));
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/api/v1/data",
    tag = "data",
    params(UsageQuery, PaginationParams),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "One page of monthly usage records", body = UsagePage),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
#[instrument(skip(state, caller, query))]
pub async fn list_data(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Query(query): Query<UsageQuery>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<UsagePage>, ApiError> {
    let filter = query.scoped_to(&caller);
    let page = state.usage_service.list(&filter, &params).await?;
    info!(
        "Retrieved {} of {} usage records (page {}/{})",
        page.items.len(),
        page.total,
        page.page,
        page.pages
    );
    Ok(Json(page))
}

#[utoipa::path(
    post,
    path = "/api/v1/data",
    tag = "data",
    request_body = NewUsageRecord,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Record stored", body = MonthlyUsageRecord),
        (status = 400, description = "Negative or non-finite quantity", body = ErrorResponse),
        (status = 403, description = "Record belongs to another user", body = ErrorResponse)
    )
)]
#[instrument(skip(state, caller, record), fields(user_id = %record.user_id))]
pub async fn create_data(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Json(record): Json<NewUsageRecord>,
) -> Result<Json<MonthlyUsageRecord>, ApiError> {
    if caller.role == Role::User && record.user_id != caller.id {
        return Err(ApiError::forbidden("Can only create data for yourself"));
    }

    let created = state.usage_service.create(&record).await?;
    info!(
        "Stored usage for {} {} as record {}",
        created.month, created.year, created.id
    );
    Ok(Json(created))
}

#[utoipa::path(
    put,
    path = "/api/v1/data/{id}",
    tag = "data",
    params(("id" = Uuid, Path, description = "Record id")),
    request_body = UsageRecordUpdate,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Updated record", body = MonthlyUsageRecord),
        (status = 403, description = "Record belongs to another user", body = ErrorResponse),
        (status = 404, description = "Data not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, caller, update), fields(id = %id))]
pub async fn update_data(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<Uuid>,
    Json(update): Json<UsageRecordUpdate>,
) -> Result<Json<MonthlyUsageRecord>, ApiError> {
    let record = state.usage_service.get(id).await?;
    ensure_owner(&caller, &record, "Can only update your own data")?;

    let updated = state.usage_service.update(record, &update).await?;
    Ok(Json(updated))
}

#[utoipa::path(
    delete,
    path = "/api/v1/data/{id}",
    tag = "data",
    params(("id" = Uuid, Path, description = "Record id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Record deleted", body = MessageResponse),
        (status = 403, description = "Record belongs to another user", body = ErrorResponse),
        (status = 404, description = "Data not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, caller), fields(id = %id))]
pub async fn delete_data(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    let record = state.usage_service.get(id).await?;
    ensure_owner(&caller, &record, "Can only delete your own data")?;

    state.usage_service.delete(id).await?;
    Ok(Json(MessageResponse::new("Data deleted successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            username: "chandpur_user".to_string(),
            email: None,
            hashed_password: String::new(),
            role,
            panchayat_id: Some(Uuid::new_v4()),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_regular_user_is_pinned_to_own_records() {
        let caller = user(Role::User);
        let query = UsageQuery {
            user_id: Some(Uuid::new_v4()),
            month: Some(Month::Mar),
            year: Some(2024),
            ..Default::default()
        };

        let filter = query.scoped_to(&caller);
        assert_eq!(filter.user_id, Some(caller.id));
        assert_eq!(filter.month, Some(Month::Mar));
        assert_eq!(filter.year, Some(2024));
    }

    #[test]
    fn test_admin_filters_pass_through() {
        let caller = user(Role::Admin);
        let other = Uuid::new_v4();
        let query = UsageQuery {
            user_id: Some(other),
            ..Default::default()
        };
        assert_eq!(query.scoped_to(&caller).user_id, Some(other));
        assert_eq!(UsageQuery::default().scoped_to(&caller), UsageFilter::default());
    }

    #[test]
    fn test_month_query_accepts_any_casing() {
        let query: UsageQuery = serde_json::from_str(r#"{"month": "SEPTEMBER"}"#).unwrap();
        assert_eq!(query.month, Some(Month::Sep));
        assert!(serde_json::from_str::<UsageQuery>(r#"{"month": "Smarch"}"#).is_err());
    }
}
