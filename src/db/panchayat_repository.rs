use sqlx::PgPool;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::db::{DbError, NewPanchayat, Panchayat};

const PANCHAYAT_COLUMNS: &str =
    "id, name, district, state, total_population, created_at, updated_at";

#[derive(Clone)]
pub struct PanchayatRepository {
    pool: PgPool,
}

impl PanchayatRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self, panchayat), fields(name = %panchayat.name))]
    pub async fn insert(&self, panchayat: &NewPanchayat) -> Result<Panchayat, DbError> {
        self.insert_with_id(Uuid::new_v4(), panchayat).await
    }

    /// Inserts with a caller-chosen id; an existing id is left untouched.
    /// Returns `None` when the id was already present.
    #[instrument(skip(self, panchayat), fields(id = %id, name = %panchayat.name))]
    pub async fn insert_if_absent(
        &self,
        id: Uuid,
        panchayat: &NewPanchayat,
    ) -> Result<Option<Panchayat>, DbError> {
        let created = sqlx::query_as::<_, Panchayat>(&format!(
            r#"
            INSERT INTO panchayats (id, name, district, state, total_population)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO NOTHING
            RETURNING {PANCHAYAT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&panchayat.name)
        .bind(&panchayat.district)
        .bind(&panchayat.state)
        .bind(panchayat.total_population)
        .fetch_optional(&self.pool)
        .await?;

        Ok(created)
    }

    async fn insert_with_id(&self, id: Uuid, panchayat: &NewPanchayat) -> Result<Panchayat, DbError> {
        let created = sqlx::query_as::<_, Panchayat>(&format!(
            r#"
            INSERT INTO panchayats (id, name, district, state, total_population)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {PANCHAYAT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&panchayat.name)
        .bind(&panchayat.district)
        .bind(&panchayat.state)
        .bind(panchayat.total_population)
        .fetch_one(&self.pool)
        .await?;

        info!("Created panchayat {} ({})", created.name, created.id);
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn count(&self) -> Result<i64, DbError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM panchayats")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Panchayat>, DbError> {
        let panchayat = sqlx::query_as::<_, Panchayat>(&format!(
            "SELECT {PANCHAYAT_COLUMNS} FROM panchayats WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        if panchayat.is_some() {
            debug!("Found panchayat");
        } else {
            debug!("Panchayat not found");
        }
        Ok(panchayat)
    }

    #[instrument(skip(self))]
    pub async fn find_by_name_containing(&self, fragment: &str) -> Result<Option<Panchayat>, DbError> {
        let panchayat = sqlx::query_as::<_, Panchayat>(&format!(
            "SELECT {PANCHAYAT_COLUMNS} FROM panchayats WHERE name ILIKE $1 ORDER BY name LIMIT 1"
        ))
        .bind(format!("%{fragment}%"))
        .fetch_optional(&self.pool)
        .await?;
        Ok(panchayat)
    }

    #[instrument(skip(self))]
    pub async fn find_paginated(
        &self,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Panchayat>, DbError> {
        debug!("Querying panchayats with offset={}, limit={}", offset, limit);

        let panchayats = sqlx::query_as::<_, Panchayat>(&format!(
            "SELECT {PANCHAYAT_COLUMNS} FROM panchayats ORDER BY district, name LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        debug!("Found {} panchayats", panchayats.len());
        Ok(panchayats)
    }
}
