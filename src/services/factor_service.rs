use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, instrument};

use crate::carbon::{EmissionFactors, FactorUpdate};
use crate::db::{DbError, EmissionFactorsRow, FactorRepository};
use crate::services::ServiceError;

/// Owns the active emission factor table.
///
/// The table is loaded once at startup and handed to every calculation from memory;
/// admin updates write through to the database and then replace the in-memory copy.
#[derive(Clone)]
pub struct FactorService {
    factor_repo: FactorRepository,
    current: Arc<RwLock<EmissionFactors>>,
}

impl FactorService {
    pub fn new(factor_repo: FactorRepository, initial: EmissionFactors) -> Self {
        Self {
            factor_repo,
            current: Arc::new(RwLock::new(initial)),
        }
    }

    /// Ensures a factor row exists (inserting `defaults` if the table is empty) and
    /// starts from it.
    #[instrument(skip(factor_repo, defaults))]
    pub async fn load(
        factor_repo: FactorRepository,
        defaults: &EmissionFactors,
    ) -> Result<Self, DbError> {
        let row = factor_repo.ensure_active(defaults).await?;
        info!("Loaded emission factors from row {}: {:?}", row.id, row.factors);
        Ok(Self::new(factor_repo, row.factors))
    }

    pub async fn current(&self) -> EmissionFactors {
        *self.current.read().await
    }

    pub async fn active_row(&self) -> Result<EmissionFactorsRow, ServiceError> {
        let current = self.current().await;
        Ok(self.factor_repo.ensure_active(&current).await?)
    }

    #[instrument(skip(self))]
    pub async fn update(&self, update: &FactorUpdate) -> Result<EmissionFactorsRow, ServiceError> {
        let row = self.active_row().await?;
        let factors = row
            .factors
            .with_update(update)
            .map_err(ServiceError::Invalid)?;

        let updated = self.factor_repo.update(row.id, &factors).await?;
        *self.current.write().await = updated.factors;

        info!("Emission factors updated: {:?}", updated.factors);
        Ok(updated)
    }
}
