use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::db::{DbError, MonthlyUsageRecord, NewUsageRecord, UsageFilter};

const USAGE_COLUMNS: &str = "id, user_id, panchayat_id, month, year, \
     electricity_kwh, diesel_liters, petrol_liters, waste_kg, water_liters, \
     solar_units, trees_planted, created_at, updated_at";

#[derive(Clone)]
pub struct UsageRepository {
    pool: PgPool,
}

impl UsageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &UsageFilter) {
        builder.push(" WHERE TRUE");
        if let Some(user_id) = filter.user_id {
            builder.push(" AND user_id = ").push_bind(user_id);
        }
        if let Some(panchayat_id) = filter.panchayat_id {
            builder.push(" AND panchayat_id = ").push_bind(panchayat_id);
        }
        if let Some(month) = filter.month {
            builder.push(" AND month = ").push_bind(month.as_str());
        }
        if let Some(year) = filter.year {
            builder.push(" AND year = ").push_bind(year);
        }
    }

    #[instrument(skip(self, record), fields(user_id = %record.user_id, month = %record.month, year = record.year))]
    pub async fn insert(&self, record: &NewUsageRecord) -> Result<MonthlyUsageRecord, DbError> {
        debug!("Inserting monthly usage record");
        let usage = &record.usage;

        let inserted = sqlx::query_as::<_, MonthlyUsageRecord>(&format!(
            r#"
            INSERT INTO monthly_usage (
                id, user_id, panchayat_id, month, year,
                electricity_kwh, diesel_liters, petrol_liters, waste_kg,
                water_liters, solar_units, trees_planted
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {USAGE_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(record.user_id)
        .bind(record.panchayat_id)
        .bind(record.month.as_str())
        .bind(record.year)
        .bind(usage.electricity_kwh)
        .bind(usage.diesel_liters)
        .bind(usage.petrol_liters)
        .bind(usage.waste_kg)
        .bind(usage.water_liters)
        .bind(usage.solar_units)
        .bind(usage.trees_planted)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to insert monthly usage record");
            e
        })?;

        info!("Created monthly usage record {}", inserted.id);
        Ok(inserted)
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<MonthlyUsageRecord>, DbError> {
        let record = sqlx::query_as::<_, MonthlyUsageRecord>(&format!(
            "SELECT {USAGE_COLUMNS} FROM monthly_usage WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// All records matching the filter, unpaged. Used by the aggregations.
    #[instrument(skip(self))]
    pub async fn find_filtered(
        &self,
        filter: &UsageFilter,
    ) -> Result<Vec<MonthlyUsageRecord>, DbError> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {USAGE_COLUMNS} FROM monthly_usage"
        ));
        Self::push_filters(&mut builder, filter);
        builder.push(" ORDER BY year, created_at");

        let records = builder
            .build_query_as::<MonthlyUsageRecord>()
            .fetch_all(&self.pool)
            .await?;

        debug!("Found {} usage records", records.len());
        Ok(records)
    }

    #[instrument(skip(self))]
    pub async fn count_filtered(&self, filter: &UsageFilter) -> Result<i64, DbError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM monthly_usage");
        Self::push_filters(&mut builder, filter);

        let count = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    #[instrument(skip(self))]
    pub async fn find_page(
        &self,
        filter: &UsageFilter,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<MonthlyUsageRecord>, DbError> {
        debug!("Querying usage records with offset={}, limit={}", offset, limit);

        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {USAGE_COLUMNS} FROM monthly_usage"
        ));
        Self::push_filters(&mut builder, filter);
        builder
            .push(" ORDER BY year DESC, created_at DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let records = builder
            .build_query_as::<MonthlyUsageRecord>()
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }

    /// Overwrites the mutable fields of an existing record.
    #[instrument(skip(self, record), fields(id = %record.id))]
    pub async fn update(&self, record: &MonthlyUsageRecord) -> Result<MonthlyUsageRecord, DbError> {
        let usage = &record.usage;
        let updated = sqlx::query_as::<_, MonthlyUsageRecord>(&format!(
            r#"
            UPDATE monthly_usage
            SET month = $2, year = $3,
                electricity_kwh = $4, diesel_liters = $5, petrol_liters = $6,
                waste_kg = $7, water_liters = $8, solar_units = $9, trees_planted = $10,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USAGE_COLUMNS}
            "#
        ))
        .bind(record.id)
        .bind(record.month.as_str())
        .bind(record.year)
        .bind(usage.electricity_kwh)
        .bind(usage.diesel_liters)
        .bind(usage.petrol_liters)
        .bind(usage.waste_kg)
        .bind(usage.water_liters)
        .bind(usage.solar_units)
        .bind(usage.trees_planted)
        .fetch_one(&self.pool)
        .await?;

        info!("Updated monthly usage record {}", updated.id);
        Ok(updated)
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM monthly_usage WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
