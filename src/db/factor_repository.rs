use sqlx::PgPool;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::carbon::EmissionFactors;
use crate::db::{DbError, EmissionFactorsRow};

const FACTOR_COLUMNS: &str = "id, electricity, diesel, petrol, waste, water, \
     tree_per_year, solar_per_unit, created_at, updated_at";

#[derive(Clone)]
pub struct FactorRepository {
    pool: PgPool,
}

impl FactorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The active factor table is the oldest row.
    #[instrument(skip(self))]
    pub async fn find_active(&self) -> Result<Option<EmissionFactorsRow>, DbError> {
        let row = sqlx::query_as::<_, EmissionFactorsRow>(&format!(
            "SELECT {FACTOR_COLUMNS} FROM emission_factors ORDER BY created_at, id LIMIT 1"
        ))
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Returns the active row, inserting `defaults` first when the table is empty.
    #[instrument(skip(self, defaults))]
    pub async fn ensure_active(
        &self,
        defaults: &EmissionFactors,
    ) -> Result<EmissionFactorsRow, DbError> {
        if let Some(row) = self.find_active().await? {
            debug!("Using existing emission factor row {}", row.id);
            return Ok(row);
        }

        warn!("No emission factors stored, inserting defaults");
        let row = sqlx::query_as::<_, EmissionFactorsRow>(&format!(
            r#"
            INSERT INTO emission_factors (
                id, electricity, diesel, petrol, waste, water, tree_per_year, solar_per_unit
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {FACTOR_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(defaults.electricity)
        .bind(defaults.diesel)
        .bind(defaults.petrol)
        .bind(defaults.waste)
        .bind(defaults.water)
        .bind(defaults.tree_per_year)
        .bind(defaults.solar_per_unit)
        .fetch_one(&self.pool)
        .await?;

        info!("Inserted default emission factors as row {}", row.id);
        Ok(row)
    }

    #[instrument(skip(self, factors), fields(id = %id))]
    pub async fn update(
        &self,
        id: Uuid,
        factors: &EmissionFactors,
    ) -> Result<EmissionFactorsRow, DbError> {
        let row = sqlx::query_as::<_, EmissionFactorsRow>(&format!(
            r#"
            UPDATE emission_factors
            SET electricity = $2, diesel = $3, petrol = $4, waste = $5, water = $6,
                tree_per_year = $7, solar_per_unit = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING {FACTOR_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(factors.electricity)
        .bind(factors.diesel)
        .bind(factors.petrol)
        .bind(factors.waste)
        .bind(factors.water)
        .bind(factors.tree_per_year)
        .bind(factors.solar_per_unit)
        .fetch_one(&self.pool)
        .await?;

        info!("Updated emission factor row {}", row.id);
        Ok(row)
    }
}
