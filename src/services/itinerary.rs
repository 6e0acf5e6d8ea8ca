use std::sync::Arc;

use tracing::{info, warn};

use crate::itinerary::{build_prompt, normalize_response, ItineraryPayload};

use super::generation::{GenerationFailed, TextGenerator};

/// Prompt, call, normalize. Cheap to clone; the model client is shared.
#[derive(Clone)]
pub struct ItineraryGenerator {
    client: Arc<dyn TextGenerator>,
}

impl ItineraryGenerator {
    pub fn new(client: Arc<dyn TextGenerator>) -> Self {
        Self { client }
    }

    /// Service failures surface as errors; unparseable output still degrades
    /// to the fallback payload.
    pub async fn generate(
        &self,
        destination: &str,
        duration: u32,
        details: &str,
    ) -> Result<ItineraryPayload, GenerationFailed> {
        let prompt = build_prompt(destination, duration, details);
        let raw = self.client.generate(&prompt).await?;
        let payload = normalize_response(&raw, destination, duration);
        info!(
            %destination,
            duration,
            days = payload.itinerary.len(),
            "generated itinerary"
        );
        Ok(payload)
    }

    pub async fn generate_or_fallback(
        &self,
        destination: &str,
        duration: u32,
        details: &str,
    ) -> ItineraryPayload {
        match self.generate(destination, duration, details).await {
            Ok(payload) => payload,
            Err(err) => {
                warn!(%destination, duration, "{err}; storing fallback itinerary");
                ItineraryPayload::fallback(destination, duration)
            }
        }
    }
}
