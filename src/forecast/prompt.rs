use serde::Serialize;
use uuid::Uuid;

use crate::carbon::{calculate, EmissionFactors, Month, UsageAmounts};
use crate::db::MonthlyUsageRecord;

/// One historical record as sent to the model, with its calculated figures attached.
#[derive(Debug, Clone, Serialize)]
pub struct HistoricalPoint {
    pub id: Uuid,
    pub user_id: Uuid,
    pub panchayat_id: Option<Uuid>,
    pub month: Month,
    pub year: i32,
    #[serde(flatten)]
    pub usage: UsageAmounts,
    pub calculated_total_emission_kg: f64,
    pub calculated_net_footprint_kg: f64,
}

impl HistoricalPoint {
    pub fn from_record(record: &MonthlyUsageRecord, factors: &EmissionFactors) -> Self {
        let breakdown = calculate(&record.usage, factors);
        Self {
            id: record.id,
            user_id: record.user_id,
            panchayat_id: record.panchayat_id,
            month: record.month,
            year: record.year,
            usage: record.usage.clone(),
            calculated_total_emission_kg: breakdown.total_emissions,
            calculated_net_footprint_kg: breakdown.net_footprint,
        }
    }
}

const INSTRUCTIONS: &str = r#"You are an environmental data analyst. Analyze the following carbon emission data for a Gram Panchayat (local government unit).
The data includes monthly resource usage (electricity, fuel, etc.) and the CALCULATED TOTAL EMISSION (in kg CO2e) based on standard factors.

Historical Data:
{history}

Task:
1. Analyze the trend of 'calculated_total_emission_kg' over time, handling any gaps in dates intelligently.
2. Provide a 6-month forecast of 'calculated_net_footprint_kg'.
3. IMPORTANT: The forecast MUST NOT be a flat line. If historical data is sparse or flat, simulate realistic seasonal variations (e.g. higher in summer/winter) or growth trends based on the data context.
4. Provide 3 specific, actionable recommendations.

Return the response in the following STRICT JSON format (do not include markdown formatting or explanations outside the JSON):
{
  "forecast": [
    { "month": "MonthName", "year": 2024, "predicted_emission": 123.45 },
    ... (6 months)
  ],
  "recommendations": [
    "Recommendation 1...",
    "Recommendation 2...",
    "Recommendation 3..."
  ]
}"#;

/// Embeds the serialized history into the fixed instruction template.
pub fn build_prompt(history: &[HistoricalPoint]) -> Result<String, serde_json::Error> {
    let history_json = serde_json::to_string(history)?;
    Ok(INSTRUCTIONS.replace("{history}", &history_json))
}
