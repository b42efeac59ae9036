use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Resource quantities reported for one month.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(default)]
pub struct UsageAmounts {
    pub electricity_kwh: f64,
    pub diesel_liters: f64,
    pub petrol_liters: f64,
    pub waste_kg: f64,
    pub water_liters: f64,
    pub solar_units: f64,
    pub trees_planted: i32,
}

/// Partial change to a set of quantities.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UsageAmountsPatch {
    pub electricity_kwh: Option<f64>,
    pub diesel_liters: Option<f64>,
    pub petrol_liters: Option<f64>,
    pub waste_kg: Option<f64>,
    pub water_liters: Option<f64>,
    pub solar_units: Option<f64>,
    pub trees_planted: Option<i32>,
}

impl UsageAmounts {
    /// All quantities must be finite and non-negative.
    pub fn validate(&self) -> Result<(), String> {
        let fields = [
            ("electricity_kwh", self.electricity_kwh),
            ("diesel_liters", self.diesel_liters),
            ("petrol_liters", self.petrol_liters),
            ("waste_kg", self.waste_kg),
            ("water_liters", self.water_liters),
            ("solar_units", self.solar_units),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("'{name}' must be a non-negative number, got {value}"));
            }
        }
        if self.trees_planted < 0 {
            return Err(format!(
                "'trees_planted' must be non-negative, got {}",
                self.trees_planted
            ));
        }
        Ok(())
    }

    pub fn apply(&mut self, patch: &UsageAmountsPatch) {
        if let Some(v) = patch.electricity_kwh {
            self.electricity_kwh = v;
        }
        if let Some(v) = patch.diesel_liters {
            self.diesel_liters = v;
        }
        if let Some(v) = patch.petrol_liters {
            self.petrol_liters = v;
        }
        if let Some(v) = patch.waste_kg {
            self.waste_kg = v;
        }
        if let Some(v) = patch.water_liters {
            self.water_liters = v;
        }
        if let Some(v) = patch.solar_units {
            self.solar_units = v;
        }
        if let Some(v) = patch.trees_planted {
            self.trees_planted = v;
        }
    }
}
