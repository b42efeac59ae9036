use crate::db::DbError;
use crate::services::auth_service::AuthError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Invalid(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl ServiceError {
    pub fn not_found(what: &str) -> Self {
        ServiceError::NotFound(format!("{what} not found"))
    }

    /// Turns constraint violations into client errors, leaving other failures as-is.
    pub fn from_write(e: DbError, conflict: &str) -> Self {
        if e.is_unique_violation() {
            ServiceError::Invalid(conflict.to_string())
        } else if e.is_foreign_key_violation() {
            ServiceError::Invalid("Referenced user or panchayat does not exist".to_string())
        } else {
            ServiceError::Db(e)
        }
    }
}
