use tracing::{info, instrument};
use uuid::Uuid;

use crate::db::{
    MonthlyUsageRecord, NewUsageRecord, UsageFilter, UsageRecordUpdate, UsageRepository,
};
use crate::services::pagination::{PaginationParams, UsagePage};
use crate::services::ServiceError;

#[derive(Clone)]
pub struct UsageService {
    usage_repo: UsageRepository,
}

impl UsageService {
    pub fn new(usage_repo: UsageRepository) -> Self {
        Self { usage_repo }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: &UsageFilter,
        params: &PaginationParams,
    ) -> Result<UsagePage, ServiceError> {
        let total = self.usage_repo.count_filtered(filter).await?;
        let items = self
            .usage_repo
            .find_page(filter, params.offset(), params.limit())
            .await?;

        Ok(UsagePage::new(items, total, params))
    }

    pub async fn get(&self, id: Uuid) -> Result<MonthlyUsageRecord, ServiceError> {
        self.usage_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Data"))
    }

    #[instrument(skip(self, record), fields(user_id = %record.user_id))]
    pub async fn create(&self, record: &NewUsageRecord) -> Result<MonthlyUsageRecord, ServiceError> {
        record.usage.validate().map_err(ServiceError::Invalid)?;

        self.usage_repo
            .insert(record)
            .await
            .map_err(|e| ServiceError::from_write(e, "Duplicate record id"))
    }

    /// Applies a partial update to an already-loaded record.
    #[instrument(skip(self, record, update), fields(id = %record.id))]
    pub async fn update(
        &self,
        mut record: MonthlyUsageRecord,
        update: &UsageRecordUpdate,
    ) -> Result<MonthlyUsageRecord, ServiceError> {
        if let Some(month) = update.month {
            record.month = month;
        }
        if let Some(year) = update.year {
            record.year = year;
        }
        record.usage.apply(&update.usage);
        record.usage.validate().map_err(ServiceError::Invalid)?;

        Ok(self.usage_repo.update(&record).await?)
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        if !self.usage_repo.delete(id).await? {
            return Err(ServiceError::not_found("Data"));
        }
        info!("Deleted usage record {}", id);
        Ok(())
    }
}
