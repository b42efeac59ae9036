use axum::{
    http::{HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tracing::{debug, instrument, warn};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

pub mod analytics;
pub mod auth;
pub mod data;
pub mod error;
pub mod extract;
pub mod factors;
pub mod panchayats;
pub mod users;

pub use error::ApiError;

use crate::forecast::Forecaster;
use crate::services::{
    AnalyticsService, AuthService, FactorService, PanchayatService, UsageService, UserService,
};

#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub panchayat_service: PanchayatService,
    pub usage_service: UsageService,
    pub analytics_service: AnalyticsService,
    pub factor_service: FactorService,
    pub forecaster: Forecaster,
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Panchayat Carbon Service API",
        description = "Carbon footprint bookkeeping for Gram Panchayats"
    ),
    paths(
        health,
        auth::login,
        auth::register,
        auth::me,
        users::list_users,
        users::get_user,
        users::update_user,
        users::delete_user,
        panchayats::list_panchayats,
        panchayats::create_panchayat,
        panchayats::get_panchayat,
        data::list_data,
        data::create_data,
        data::update_data,
        data::delete_data,
        analytics::metrics,
        analytics::sectors,
        analytics::trends,
        analytics::predictions,
        factors::get_factors,
        factors::update_factors,
    ),
    components(schemas(
        HealthResponse,
        error::ErrorResponse,
        error::MessageResponse,
        error::ForecastErrorResponse,
        crate::services::auth_service::LoginRequest,
        crate::services::auth_service::RegisterRequest,
        crate::services::auth_service::TokenResponse,
        crate::services::UsagePage,
        crate::db::Role,
        crate::db::UserResponse,
        crate::db::UserChanges,
        crate::db::Panchayat,
        crate::db::NewPanchayat,
        crate::db::MonthlyUsageRecord,
        crate::db::NewUsageRecord,
        crate::db::UsageRecordUpdate,
        crate::db::EmissionFactorsRow,
        crate::carbon::Month,
        crate::carbon::UsageAmounts,
        crate::carbon::UsageAmountsPatch,
        crate::carbon::EmissionFactors,
        crate::carbon::FactorUpdate,
        crate::carbon::CarbonTotals,
        crate::carbon::SectorEmission,
        crate::carbon::MonthlyTrend,
        crate::forecast::ForecastPoint,
        crate::forecast::ForecastResult,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Liveness"),
        (name = "auth", description = "Login, registration and the current user"),
        (name = "users", description = "User administration"),
        (name = "panchayats", description = "Gram Panchayats"),
        (name = "data", description = "Monthly resource usage records"),
        (name = "analytics", description = "Totals, sector breakdown, trends and forecasts"),
        (name = "emission-factors", description = "Conversion factors used by every calculation")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

pub fn generate_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health))
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        .route("/auth/me", get(auth::me))
        .route("/users", get(users::list_users))
        .route(
            "/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route(
            "/panchayats",
            get(panchayats::list_panchayats).post(panchayats::create_panchayat),
        )
        .route("/panchayats/{id}", get(panchayats::get_panchayat))
        .route("/data", get(data::list_data).post(data::create_data))
        .route(
            "/data/{id}",
            put(data::update_data).delete(data::delete_data),
        )
        .route("/analytics/metrics", get(analytics::metrics))
        .route("/analytics/sectors", get(analytics::sectors))
        .route("/analytics/trends", get(analytics::trends))
        .route("/analytics/predictions", get(analytics::predictions))
        .route(
            "/emission-factors",
            get(factors::get_factors).put(factors::update_factors),
        )
        .with_state(state);

    Router::new().nest("/api/v1", api_routes)
}

/// CORS for the configured browser origins; unparseable origins are skipped.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
#[instrument]
async fn health() -> impl IntoResponse {
    debug!("Health check requested");
    let response = HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
    };
    (StatusCode::OK, Json(response))
}
