//! Emission model: per-record calculation and the dashboard aggregations built on it.
//!
//! Everything in here is pure and synchronous; callers fetch records and the active
//! factor table first and pass them in.

pub mod aggregate;
pub mod calculator;
pub mod factors;
pub mod month;
pub mod usage;

pub use aggregate::{
    monthly_trends, sector_breakdown, sort_chronologically, totals, CarbonTotals, MonthlyTrend,
    MonthlyUsage, Sector, SectorEmission,
};
pub use calculator::{calculate, EmissionBreakdown};
pub use factors::{EmissionFactors, FactorUpdate};
pub use month::{Month, UnknownMonth};
pub use usage::{UsageAmounts, UsageAmountsPatch};
