use sqlx::PgPool;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::db::{DbError, NewUser, User};

const USER_COLUMNS: &str = "id, username, email, hashed_password, role, panchayat_id, \
     is_active, created_at, updated_at";

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self, user), fields(username = %user.username, role = user.role.as_str()))]
    pub async fn insert(&self, user: &NewUser) -> Result<User, DbError> {
        debug!("Inserting user");

        let created = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, username, email, hashed_password, role, panchayat_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.hashed_password)
        .bind(user.role)
        .bind(user.panchayat_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!(username = %user.username, error = %e, "Failed to insert user");
            e
        })?;

        info!("Created user {} ({})", created.username, created.id);
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn count(&self) -> Result<i64, DbError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DbError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, DbError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn find_paginated(&self, offset: i64, limit: i64) -> Result<Vec<User>, DbError> {
        debug!("Querying users with offset={}, limit={}", offset, limit);

        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at, username LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        debug!("Found {} users", users.len());
        Ok(users)
    }

    /// Writes back every mutable column of `user`.
    #[instrument(skip(self, user), fields(id = %user.id))]
    pub async fn update(&self, user: &User) -> Result<User, DbError> {
        let updated = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET username = $2, email = $3, role = $4, panchayat_id = $5,
                is_active = $6, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(user.role)
        .bind(user.panchayat_id)
        .bind(user.is_active)
        .fetch_one(&self.pool)
        .await?;

        info!("Updated user {}", updated.id);
        Ok(updated)
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
