pub mod analytics_service;
pub mod auth_service;
pub mod error;
pub mod factor_service;
pub mod pagination;
pub mod panchayat_service;
pub mod usage_service;
pub mod user_service;

pub use analytics_service::AnalyticsService;
pub use auth_service::{AuthError, AuthService, JwtKeys};
pub use error::ServiceError;
pub use factor_service::FactorService;
pub use pagination::{ListParams, PaginationParams, UsagePage};
pub use panchayat_service::PanchayatService;
pub use usage_service::UsageService;
pub use user_service::UserService;
