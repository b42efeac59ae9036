use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use utoipa::ToSchema;

use super::ForecastError;
use crate::carbon::Month;

pub const FORECAST_MONTHS: usize = 6;
pub const RECOMMENDATION_COUNT: usize = 3;

const FLAT_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ForecastPoint {
    pub month: String,
    pub year: i32,
    pub predicted_emission: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ForecastResult {
    pub forecast: Vec<ForecastPoint>,
    pub recommendations: Vec<String>,
}

fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| Regex::new(r"```(?:json|JSON)?").expect("fence pattern is valid"))
}

/// Removes every Markdown code fence marker and surrounding whitespace.
pub fn strip_code_fences(text: &str) -> String {
    fence_regex().replace_all(text, "").trim().to_string()
}

/// Parses the model reply and checks it has the shape the dashboard relies on.
///
/// `history_len` is the number of records that were sent; with two or more the
/// forecast must show some variation.
pub fn parse_forecast(text: &str, history_len: usize) -> Result<ForecastResult, ForecastError> {
    let cleaned = strip_code_fences(text);
    debug!("Parsing model reply ({} bytes after cleanup)", cleaned.len());

    let result: ForecastResult = serde_json::from_str(&cleaned).map_err(|e| {
        warn!("Model reply is not valid forecast JSON: {}", e);
        ForecastError::GenerationFailed(e.to_string())
    })?;

    validate(&result, history_len)?;
    Ok(result)
}

fn validate(result: &ForecastResult, history_len: usize) -> Result<(), ForecastError> {
    if result.forecast.len() != FORECAST_MONTHS {
        return Err(ForecastError::Validation(format!(
            "expected {} forecast months, got {}",
            FORECAST_MONTHS,
            result.forecast.len()
        )));
    }

    for (i, point) in result.forecast.iter().enumerate() {
        if point.month.parse::<Month>().is_err() {
            return Err(ForecastError::Validation(format!(
                "forecast entry {} has unknown month '{}'",
                i, point.month
            )));
        }
        if !point.predicted_emission.is_finite() {
            return Err(ForecastError::Validation(format!(
                "forecast entry {i} has a non-finite prediction"
            )));
        }
    }

    if result.recommendations.len() != RECOMMENDATION_COUNT {
        return Err(ForecastError::Validation(format!(
            "expected {} recommendations, got {}",
            RECOMMENDATION_COUNT,
            result.recommendations.len()
        )));
    }
    if result.recommendations.iter().any(|r| r.trim().is_empty()) {
        return Err(ForecastError::Validation(
            "recommendations must not be blank".to_string(),
        ));
    }

    if history_len >= 2 && is_flat(&result.forecast) {
        return Err(ForecastError::Validation(
            "forecast is a flat line".to_string(),
        ));
    }

    Ok(())
}

fn is_flat(points: &[ForecastPoint]) -> bool {
    match points.first() {
        Some(first) => points
            .iter()
            .all(|p| (p.predicted_emission - first.predicted_emission).abs() <= FLAT_TOLERANCE),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(values: [f64; 6], recommendations: &[&str]) -> String {
        let months = ["Jul", "Aug", "Sep", "Oct", "Nov", "Dec"];
        let forecast: Vec<serde_json::Value> = months
            .iter()
            .zip(values)
            .map(|(m, v)| serde_json::json!({"month": m, "year": 2024, "predicted_emission": v}))
            .collect();
        serde_json::json!({"forecast": forecast, "recommendations": recommendations}).to_string()
    }

    const RECS: [&str; 3] = ["Install solar", "Plant trees", "Compost waste"];

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n[]\n```  "), "[]");
        assert_eq!(strip_code_fences("  {}  "), "{}");
    }

    #[test]
    fn test_parse_valid_reply_in_fences() {
        let text = format!(
            "```json\n{}\n```",
            reply([10.0, 12.0, 11.0, 13.0, 9.5, 14.0], &RECS)
        );
        let result = parse_forecast(&text, 4).unwrap();
        assert_eq!(result.forecast.len(), 6);
        assert_eq!(result.forecast[0].month, "Jul");
        assert_eq!(result.forecast[5].predicted_emission, 14.0);
        assert_eq!(result.recommendations[1], "Plant trees");
    }

    #[test]
    fn test_full_month_names_are_accepted() {
        let text = reply([1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &RECS).replace("\"Jul\"", "\"July\"");
        assert!(parse_forecast(&text, 3).is_ok());
    }

    #[test]
    fn test_wrong_forecast_length_is_validation_error() {
        let text = r#"{"forecast": [{"month": "Jan", "year": 2025, "predicted_emission": 1.0}],
                       "recommendations": ["a", "b", "c"]}"#;
        let err = parse_forecast(text, 0).unwrap_err();
        assert!(matches!(err, ForecastError::Validation(ref m) if m.contains("6")));
    }

    #[test]
    fn test_wrong_recommendation_count_is_validation_error() {
        let text = reply([1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &["only one"]);
        assert!(matches!(
            parse_forecast(&text, 0),
            Err(ForecastError::Validation(_))
        ));
    }

    #[test]
    fn test_flat_forecast_rejected_only_with_history() {
        let text = reply([50.0; 6], &RECS);
        assert!(matches!(
            parse_forecast(&text, 5),
            Err(ForecastError::Validation(ref m)) if m.contains("flat")
        ));
        assert!(parse_forecast(&text, 1).is_ok());
        assert!(parse_forecast(&text, 0).is_ok());
    }

    #[test]
    fn test_unknown_month_rejected() {
        let text = reply([1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &RECS).replace("\"Aug\"", "\"Month7\"");
        assert!(matches!(
            parse_forecast(&text, 0),
            Err(ForecastError::Validation(_))
        ));
    }

    #[test]
    fn test_garbage_is_generation_failure() {
        let err = parse_forecast("Sure! Here is your forecast:", 2).unwrap_err();
        assert!(matches!(err, ForecastError::GenerationFailed(_)));

        // Wrong field types also fail at parse time
        let err = parse_forecast(r#"{"forecast": "soon", "recommendations": []}"#, 0).unwrap_err();
        assert!(matches!(err, ForecastError::GenerationFailed(_)));
    }
}
