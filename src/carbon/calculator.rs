use serde::Serialize;
use utoipa::ToSchema;

use super::{EmissionFactors, UsageAmounts};

/// Emissions and offsets derived from one month of usage, in kg CO2e.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, ToSchema)]
pub struct EmissionBreakdown {
    pub electricity: f64,
    pub diesel: f64,
    pub petrol: f64,
    pub waste: f64,
    pub water: f64,
    pub trees: f64,
    pub solar: f64,
    pub total_emissions: f64,
    pub total_offsets: f64,
    pub net_footprint: f64,
    pub is_neutral: bool,
}

/// Applies the linear emission model to one usage record. Values are not rounded.
pub fn calculate(usage: &UsageAmounts, factors: &EmissionFactors) -> EmissionBreakdown {
    let electricity = usage.electricity_kwh * factors.electricity;
    let diesel = usage.diesel_liters * factors.diesel;
    let petrol = usage.petrol_liters * factors.petrol;
    let waste = usage.waste_kg * factors.waste;
    let water = usage.water_liters * factors.water;
    let total_emissions = electricity + diesel + petrol + waste + water;

    // Annual absorption spread over twelve months
    let trees = f64::from(usage.trees_planted) * factors.tree_per_year / 12.0;
    let solar = usage.solar_units * factors.solar_per_unit;
    let total_offsets = trees + solar;

    let net_footprint = total_emissions - total_offsets;

    EmissionBreakdown {
        electricity,
        diesel,
        petrol,
        waste,
        water,
        trees,
        solar,
        total_emissions,
        total_offsets,
        net_footprint,
        is_neutral: net_footprint <= 0.0,
    }
}
