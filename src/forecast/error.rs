/// Why a forecast could not be produced. None of these are retried.
#[derive(Debug, thiserror::Error)]
pub enum ForecastError {
    #[error("AI service not configured. Please set GEMINI_API_KEY.")]
    NotConfigured,

    #[error("Failed to generate prediction: {0}")]
    GenerationFailed(String),

    #[error("Forecast failed validation: {0}")]
    Validation(String),
}

impl From<reqwest::Error> for ForecastError {
    fn from(e: reqwest::Error) -> Self {
        ForecastError::GenerationFailed(e.to_string())
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(e: serde_json::Error) -> Self {
        ForecastError::GenerationFailed(e.to_string())
    }
}
