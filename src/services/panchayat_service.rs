use tracing::instrument;
use uuid::Uuid;

use crate::db::{NewPanchayat, Panchayat, PanchayatRepository};
use crate::services::pagination::ListParams;
use crate::services::ServiceError;

#[derive(Clone)]
pub struct PanchayatService {
    panchayat_repo: PanchayatRepository,
}

impl PanchayatService {
    pub fn new(panchayat_repo: PanchayatRepository) -> Self {
        Self { panchayat_repo }
    }

    /// Lists panchayats; `only` narrows the result to a single panchayat.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        params: &ListParams,
        only: Option<Uuid>,
    ) -> Result<Vec<Panchayat>, ServiceError> {
        if let Some(id) = only {
            let own = self.panchayat_repo.find_by_id(id).await?;
            return Ok(own
                .into_iter()
                .skip(params.offset() as usize)
                .collect());
        }

        Ok(self
            .panchayat_repo
            .find_paginated(params.offset(), params.limit_or(1000, 1000))
            .await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<Panchayat, ServiceError> {
        self.panchayat_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Panchayat"))
    }

    #[instrument(skip(self, panchayat), fields(name = %panchayat.name))]
    pub async fn create(&self, panchayat: &NewPanchayat) -> Result<Panchayat, ServiceError> {
        if panchayat.name.trim().is_empty()
            || panchayat.district.trim().is_empty()
            || panchayat.state.trim().is_empty()
        {
            return Err(ServiceError::Invalid(
                "Name, district and state are required".to_string(),
            ));
        }
        if panchayat.total_population < 0 {
            return Err(ServiceError::Invalid(
                "Population must be non-negative".to_string(),
            ));
        }

        Ok(self.panchayat_repo.insert(panchayat).await?)
    }
}
