use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

use super::{calculate, EmissionFactors, Month, UsageAmounts};

/// A usage entry that can be placed on the calendar.
pub trait MonthlyUsage {
    fn year(&self) -> i32;
    fn month(&self) -> Month;
    fn usage(&self) -> &UsageAmounts;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct CarbonTotals {
    pub total_emissions: f64,
    pub total_offsets: f64,
    pub net_footprint: f64,
    pub is_neutral: bool,
}

/// Emission sectors used for the proportional breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sector {
    Electricity,
    Transport,
    Waste,
    Water,
}

impl Sector {
    pub const ALL: [Sector; 4] = [
        Sector::Electricity,
        Sector::Transport,
        Sector::Waste,
        Sector::Water,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Sector::Electricity => "Electricity",
            Sector::Transport => "Transport",
            Sector::Waste => "Waste",
            Sector::Water => "Water",
        }
    }

    /// Chart color, tied to the sector itself so it never shifts with filtering.
    pub fn color(self) -> &'static str {
        match self {
            Sector::Electricity => "#3b82f6",
            Sector::Transport => "#ef4444",
            Sector::Waste => "#10b981",
            Sector::Water => "#f59e0b",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SectorEmission {
    pub sector: String,
    pub emission: f64,
    pub percentage: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MonthlyTrend {
    /// "{month} {year}", e.g. "Mar 2024"
    pub month: String,
    pub emissions: f64,
    pub offsets: f64,
    pub net: f64,
}

/// Sums emissions and offsets over all records. Empty input yields zeros and neutral.
pub fn totals<R: MonthlyUsage>(records: &[R], factors: &EmissionFactors) -> CarbonTotals {
    let (total_emissions, total_offsets) =
        records.iter().fold((0.0, 0.0), |(emissions, offsets), record| {
            let breakdown = calculate(record.usage(), factors);
            (
                emissions + breakdown.total_emissions,
                offsets + breakdown.total_offsets,
            )
        });

    let net_footprint = total_emissions - total_offsets;
    CarbonTotals {
        total_emissions,
        total_offsets,
        net_footprint,
        is_neutral: net_footprint <= 0.0,
    }
}

/// Share of each sector in the total emissions, largest first. Sectors without
/// emissions are omitted; an empty or all-zero input gives an empty list.
pub fn sector_breakdown<R: MonthlyUsage>(
    records: &[R],
    factors: &EmissionFactors,
) -> Vec<SectorEmission> {
    let mut buckets = [0.0_f64; 4];
    for record in records {
        let b = calculate(record.usage(), factors);
        buckets[0] += b.electricity;
        buckets[1] += b.diesel + b.petrol;
        buckets[2] += b.waste;
        buckets[3] += b.water;
    }

    let total: f64 = buckets.iter().sum();
    if total <= 0.0 {
        return Vec::new();
    }

    let mut sectors: Vec<SectorEmission> = Sector::ALL
        .into_iter()
        .zip(buckets)
        .filter(|(_, emission)| *emission > 0.0)
        .map(|(sector, emission)| SectorEmission {
            sector: sector.label().to_string(),
            emission,
            percentage: emission / total * 100.0,
            color: sector.color().to_string(),
        })
        .collect();

    sectors.sort_by(|a, b| b.emission.total_cmp(&a.emission));
    sectors
}

/// One point per (year, month) present in the input, in calendar order.
pub fn monthly_trends<R: MonthlyUsage>(
    records: &[R],
    factors: &EmissionFactors,
) -> Vec<MonthlyTrend> {
    let mut groups: BTreeMap<(i32, Month), (f64, f64)> = BTreeMap::new();
    for record in records {
        let b = calculate(record.usage(), factors);
        let entry = groups
            .entry((record.year(), record.month()))
            .or_insert((0.0, 0.0));
        entry.0 += b.total_emissions;
        entry.1 += b.total_offsets;
    }

    groups
        .into_iter()
        .map(|((year, month), (emissions, offsets))| MonthlyTrend {
            month: format!("{month} {year}"),
            emissions,
            offsets,
            net: emissions - offsets,
        })
        .collect()
}

/// Sorts records by (year, calendar month); stable for entries of the same period.
pub fn sort_chronologically<R: MonthlyUsage>(records: &mut [R]) {
    records.sort_by_key(|record| (record.year(), record.month()));
}
