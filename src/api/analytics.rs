use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use tracing::{info, instrument};
use utoipa::IntoParams;
use uuid::Uuid;

use crate::api::data::UsageQuery;
use crate::api::error::{ErrorResponse, ForecastErrorResponse};
use crate::api::extract::CurrentUser;
use crate::api::{ApiError, AppState};
use crate::carbon::{CarbonTotals, MonthlyTrend, SectorEmission};
use crate::db::{Role, UsageFilter, User};
use crate::forecast::ForecastResult;

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TrendQuery {
    pub user_id: Option<Uuid>,
    pub panchayat_id: Option<Uuid>,
    pub year: Option<i32>,
}

impl TrendQuery {
    fn scoped_to(&self, caller: &User) -> UsageFilter {
        UsageQuery {
            user_id: self.user_id,
            panchayat_id: self.panchayat_id,
            month: None,
            year: self.year,
        }
        .scoped_to(caller)
    }
}

/// History used for forecasting: own records for users, own panchayat for admins
/// attached to one, everything otherwise.
fn prediction_scope(caller: &User) -> UsageFilter {
    match caller.role {
        Role::User => UsageFilter {
            user_id: Some(caller.id),
            ..Default::default()
        },
        Role::Admin => UsageFilter {
            panchayat_id: caller.panchayat_id,
            ..Default::default()
        },
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/analytics/metrics",
    tag = "analytics",
    params(UsageQuery),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Summed emissions and offsets", body = CarbonTotals),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
#[instrument(skip(state, caller, query))]
pub async fn metrics(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Query(query): Query<UsageQuery>,
) -> Result<Json<CarbonTotals>, ApiError> {
    let totals = state
        .analytics_service
        .metrics(&query.scoped_to(&caller))
        .await?;
    info!(
        "Net footprint {:.3} kg (neutral: {})",
        totals.net_footprint, totals.is_neutral
    );
    Ok(Json(totals))
}

#[utoipa::path(
    get,
    path = "/api/v1/analytics/sectors",
    tag = "analytics",
    params(UsageQuery),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Non-zero sectors, largest first", body = [SectorEmission]),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
#[instrument(skip(state, caller, query))]
pub async fn sectors(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Query(query): Query<UsageQuery>,
) -> Result<Json<Vec<SectorEmission>>, ApiError> {
    let sectors = state
        .analytics_service
        .sectors(&query.scoped_to(&caller))
        .await?;
    Ok(Json(sectors))
}

#[utoipa::path(
    get,
    path = "/api/v1/analytics/trends",
    tag = "analytics",
    params(TrendQuery),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Per-month totals in calendar order", body = [MonthlyTrend]),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
#[instrument(skip(state, caller, query))]
pub async fn trends(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Query(query): Query<TrendQuery>,
) -> Result<Json<Vec<MonthlyTrend>>, ApiError> {
    let trends = state
        .analytics_service
        .trends(&query.scoped_to(&caller))
        .await?;
    Ok(Json(trends))
}

#[utoipa::path(
    get,
    path = "/api/v1/analytics/predictions",
    tag = "analytics",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Six-month forecast with recommendations", body = ForecastResult),
        (status = 502, description = "Model call failed or reply was rejected", body = ForecastErrorResponse),
        (status = 503, description = "Forecasting is not configured", body = ForecastErrorResponse)
    )
)]
#[instrument(skip(state, caller), fields(user = %caller.username))]
pub async fn predictions(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
) -> Result<Json<ForecastResult>, ApiError> {
    let history = state
        .analytics_service
        .forecast_history(&prediction_scope(&caller))
        .await?;
    let result = state.forecaster.forecast(&history).await?;
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(role: Role, panchayat_id: Option<Uuid>) -> User {
        User {
            id: Uuid::new_v4(),
            username: "admin".to_string(),
            email: None,
            hashed_password: String::new(),
            role,
            panchayat_id,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_prediction_scope_by_role() {
        let panchayat = Uuid::new_v4();

        let regular = user(Role::User, Some(panchayat));
        let scope = prediction_scope(&regular);
        assert_eq!(scope.user_id, Some(regular.id));
        assert_eq!(scope.panchayat_id, None);

        let local_admin = user(Role::Admin, Some(panchayat));
        let scope = prediction_scope(&local_admin);
        assert_eq!(scope.user_id, None);
        assert_eq!(scope.panchayat_id, Some(panchayat));

        let global_admin = user(Role::Admin, None);
        assert_eq!(prediction_scope(&global_admin), UsageFilter::default());
    }

    #[test]
    fn test_trend_query_never_filters_by_month() {
        let caller = user(Role::User, None);
        let query = TrendQuery {
            user_id: Some(Uuid::new_v4()),
            panchayat_id: None,
            year: Some(2024),
        };
        let filter = query.scoped_to(&caller);
        assert_eq!(filter.user_id, Some(caller.id));
        assert_eq!(filter.month, None);
        assert_eq!(filter.year, Some(2024));
    }
}
