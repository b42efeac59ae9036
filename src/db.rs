pub mod error;
pub mod factor_repository;
pub mod models;
pub mod panchayat_repository;
pub mod usage_repository;
pub mod user_repository;

pub use error::DbError;
pub use factor_repository::FactorRepository;
pub use models::*;
pub use panchayat_repository::PanchayatRepository;
pub use usage_repository::UsageRepository;
pub use user_repository::UserRepository;
