use tracing::{debug, instrument};

use crate::carbon::{
    monthly_trends, sector_breakdown, sort_chronologically, totals, CarbonTotals, MonthlyTrend,
    SectorEmission,
};
use crate::db::{UsageFilter, UsageRepository};
use crate::forecast::HistoricalPoint;
use crate::services::{FactorService, ServiceError};

/// Dashboard figures computed from stored usage records and the active factors.
#[derive(Clone)]
pub struct AnalyticsService {
    usage_repo: UsageRepository,
    factor_service: FactorService,
}

impl AnalyticsService {
    pub fn new(usage_repo: UsageRepository, factor_service: FactorService) -> Self {
        Self {
            usage_repo,
            factor_service,
        }
    }

    #[instrument(skip(self))]
    pub async fn metrics(&self, filter: &UsageFilter) -> Result<CarbonTotals, ServiceError> {
        let records = self.usage_repo.find_filtered(filter).await?;
        let factors = self.factor_service.current().await;
        Ok(totals(&records, &factors))
    }

    #[instrument(skip(self))]
    pub async fn sectors(&self, filter: &UsageFilter) -> Result<Vec<SectorEmission>, ServiceError> {
        let records = self.usage_repo.find_filtered(filter).await?;
        let factors = self.factor_service.current().await;
        Ok(sector_breakdown(&records, &factors))
    }

    #[instrument(skip(self))]
    pub async fn trends(&self, filter: &UsageFilter) -> Result<Vec<MonthlyTrend>, ServiceError> {
        let records = self.usage_repo.find_filtered(filter).await?;
        let factors = self.factor_service.current().await;
        Ok(monthly_trends(&records, &factors))
    }

    /// Chronologically ordered history annotated with calculated figures, as sent
    /// to the forecast model.
    #[instrument(skip(self))]
    pub async fn forecast_history(
        &self,
        filter: &UsageFilter,
    ) -> Result<Vec<HistoricalPoint>, ServiceError> {
        let mut records = self.usage_repo.find_filtered(filter).await?;
        sort_chronologically(&mut records);
        let factors = self.factor_service.current().await;

        let history: Vec<HistoricalPoint> = records
            .iter()
            .map(|record| HistoricalPoint::from_record(record, &factors))
            .collect();
        debug!("Prepared {} historical points", history.len());
        Ok(history)
    }
}
