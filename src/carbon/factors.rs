use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Conversion constants from one unit of usage (or offset) to kg CO2-equivalent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct EmissionFactors {
    /// kg CO2 per kWh
    pub electricity: f64,
    /// kg CO2 per liter
    pub diesel: f64,
    /// kg CO2 per liter
    pub petrol: f64,
    /// kg CO2 per kg of waste
    pub waste: f64,
    /// kg CO2 per liter of water
    pub water: f64,
    /// kg CO2 absorbed per tree per year
    pub tree_per_year: f64,
    /// kg CO2 offset per solar unit
    pub solar_per_unit: f64,
}

impl Default for EmissionFactors {
    fn default() -> Self {
        Self {
            electricity: 0.82,
            diesel: 2.68,
            petrol: 2.31,
            waste: 0.6,
            water: 0.000344,
            tree_per_year: 21.77,
            solar_per_unit: 0.5,
        }
    }
}

/// Partial update of the active factor table. Absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct FactorUpdate {
    pub electricity: Option<f64>,
    pub diesel: Option<f64>,
    pub petrol: Option<f64>,
    pub waste: Option<f64>,
    pub water: Option<f64>,
    pub tree_per_year: Option<f64>,
    pub solar_per_unit: Option<f64>,
}

impl EmissionFactors {
    fn named_values(&self) -> [(&'static str, f64); 7] {
        [
            ("electricity", self.electricity),
            ("diesel", self.diesel),
            ("petrol", self.petrol),
            ("waste", self.waste),
            ("water", self.water),
            ("tree_per_year", self.tree_per_year),
            ("solar_per_unit", self.solar_per_unit),
        ]
    }

    /// Every factor must be a positive, finite number.
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in self.named_values() {
            if !value.is_finite() || value <= 0.0 {
                return Err(format!(
                    "Emission factor '{name}' must be a positive number, got {value}"
                ));
            }
        }
        Ok(())
    }

    /// Returns a copy with the update applied, validated as a whole.
    pub fn with_update(&self, update: &FactorUpdate) -> Result<Self, String> {
        let updated = Self {
            electricity: update.electricity.unwrap_or(self.electricity),
            diesel: update.diesel.unwrap_or(self.diesel),
            petrol: update.petrol.unwrap_or(self.petrol),
            waste: update.waste.unwrap_or(self.waste),
            water: update.water.unwrap_or(self.water),
            tree_per_year: update.tree_per_year.unwrap_or(self.tree_per_year),
            solar_per_unit: update.solar_per_unit.unwrap_or(self.solar_per_unit),
        };
        updated.validate()?;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let factors = EmissionFactors::default();
        assert!(factors.validate().is_ok());
        assert_eq!(factors.electricity, 0.82);
        assert_eq!(factors.tree_per_year, 21.77);
    }

    #[test]
    fn test_partial_update_keeps_other_values() {
        let update = FactorUpdate {
            diesel: Some(2.7),
            ..Default::default()
        };
        let updated = EmissionFactors::default().with_update(&update).unwrap();
        assert_eq!(updated.diesel, 2.7);
        assert_eq!(updated.petrol, 2.31);
        assert_eq!(updated.solar_per_unit, 0.5);
    }

    #[test]
    fn test_update_rejects_non_positive_values() {
        let zero = FactorUpdate {
            water: Some(0.0),
            ..Default::default()
        };
        let err = EmissionFactors::default().with_update(&zero).unwrap_err();
        assert!(err.contains("water"));

        let nan = FactorUpdate {
            electricity: Some(f64::NAN),
            ..Default::default()
        };
        assert!(EmissionFactors::default().with_update(&nan).is_err());
    }
}
