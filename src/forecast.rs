//! Six-month footprint forecast backed by a generative model.
//!
//! The model is asked for strict JSON; whatever comes back is treated as untrusted
//! and validated before it reaches the API.

pub mod error;
pub mod gemini;
pub mod parser;
pub mod prompt;

pub use error::ForecastError;
pub use gemini::GeminiClient;
pub use parser::{parse_forecast, ForecastPoint, ForecastResult};
pub use prompt::{build_prompt, HistoricalPoint};

use tracing::{info, instrument, warn};

#[derive(Clone)]
pub struct Forecaster {
    client: GeminiClient,
}

impl Forecaster {
    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }

    /// `history` must already be in chronological order.
    #[instrument(skip(self, history), fields(history_len = history.len()))]
    pub async fn forecast(
        &self,
        history: &[HistoricalPoint],
    ) -> Result<ForecastResult, ForecastError> {
        if !self.client.is_configured() {
            warn!("Forecast requested but GEMINI_API_KEY is not set");
            return Err(ForecastError::NotConfigured);
        }

        let prompt = build_prompt(history)?;
        let reply = self.client.generate(&prompt).await?;
        let result = parse_forecast(&reply, history.len())?;

        info!(
            "Generated {} month forecast with {} recommendations",
            result.forecast.len(),
            result.recommendations.len()
        );
        Ok(result)
    }
}
