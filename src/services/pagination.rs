use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::db::MonthlyUsageRecord;

/// `skip`/`limit` listing parameters; `limit` is clamped per endpoint.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    #[serde(default)]
    pub skip: i64,
    pub limit: Option<i64>,
}

impl ListParams {
    pub fn offset(&self) -> i64 {
        self.skip.max(0)
    }

    pub fn limit_or(&self, default: i64, max: i64) -> i64 {
        self.limit.unwrap_or(default).clamp(1, max)
    }
}

// Page-based pagination (used by the usage record listing)
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub size: u32,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    50
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            size: default_page_size(),
        }
    }
}

impl PaginationParams {
    pub fn page(&self) -> u32 {
        self.page.max(1)
    }

    pub fn size(&self) -> u32 {
        self.size.clamp(1, 100)
    }

    pub fn offset(&self) -> i64 {
        (self.page() as i64 - 1) * self.size() as i64
    }

    pub fn limit(&self) -> i64 {
        self.size() as i64
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UsagePage {
    pub items: Vec<MonthlyUsageRecord>,
    pub total: i64,
    pub page: u32,
    pub size: u32,
    pub pages: i64,
}

impl UsagePage {
    pub fn new(items: Vec<MonthlyUsageRecord>, total: i64, params: &PaginationParams) -> Self {
        let size = params.size();
        Self {
            items,
            total,
            page: params.page(),
            size,
            pages: (total + size as i64 - 1) / size as i64,
        }
    }
}
