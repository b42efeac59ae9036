#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),
}

impl DbError {
    fn database_error(&self) -> Option<&dyn sqlx::error::DatabaseError> {
        match self {
            DbError::SqlxError(sqlx::Error::Database(e)) => Some(&**e),
            _ => None,
        }
    }

    /// True when the statement hit a UNIQUE constraint.
    pub fn is_unique_violation(&self) -> bool {
        self.database_error()
            .is_some_and(|e| e.is_unique_violation())
    }

    /// True when a referenced row (user, panchayat) does not exist.
    pub fn is_foreign_key_violation(&self) -> bool {
        self.database_error()
            .is_some_and(|e| e.is_foreign_key_violation())
    }
}
