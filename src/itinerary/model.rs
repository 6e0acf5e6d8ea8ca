use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::{serde_as, DisplayFromStr, PickFirst};

pub const FALLBACK_COST: &str = "Not available";
pub const FALLBACK_APOLOGY: &str =
    "Sorry, we couldn't generate a detailed itinerary right now. Please try again later.";

/// Structured itinerary as returned by the model. Keys outside the schema
/// survive a round trip through `extra`.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryPayload {
    #[serde(default)]
    pub destination: String,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    #[serde(default)]
    pub duration: u32,
    #[serde(default)]
    pub total_estimated_cost: String,
    #[serde(default)]
    pub itinerary: Vec<DayPlan>,
    #[serde(default)]
    pub transportation_tips: String,
    #[serde(default)]
    pub additional_recommendations: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ItineraryPayload {
    /// Degraded payload used whenever generation or parsing fails.
    pub fn fallback(destination: &str, duration: u32) -> Self {
        Self {
            destination: destination.to_string(),
            duration,
            total_estimated_cost: FALLBACK_COST.to_string(),
            itinerary: Vec::new(),
            transportation_tips: FALLBACK_APOLOGY.to_string(),
            additional_recommendations: FALLBACK_APOLOGY.to_string(),
            extra: Map::new(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.itinerary.is_empty() && self.total_estimated_cost == FALLBACK_COST
    }
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayPlan {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    #[serde(default)]
    pub day: u32,
    #[serde(default)]
    pub activities: DayActivities,
    #[serde(default)]
    pub estimated_cost: String,
    #[serde(default)]
    pub accommodation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DayActivities {
    #[serde(default)]
    pub morning: String,
    #[serde(default)]
    pub afternoon: String,
    #[serde(default)]
    pub evening: String,
}

/// Stored itinerary. Trips written before structured output existed carry the
/// raw model text instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Itinerary {
    Structured(ItineraryPayload),
    Legacy(String),
}

impl Itinerary {
    pub fn payload(&self) -> Option<&ItineraryPayload> {
        match self {
            Itinerary::Structured(payload) => Some(payload),
            Itinerary::Legacy(_) => None,
        }
    }
}

impl From<ItineraryPayload> for Itinerary {
    fn from(payload: ItineraryPayload) -> Self {
        Itinerary::Structured(payload)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn fallback_echoes_request_and_has_no_days() {
        let payload = ItineraryPayload::fallback("Kyoto", 4);
        assert_eq!(payload.destination, "Kyoto");
        assert_eq!(payload.duration, 4);
        assert_eq!(payload.total_estimated_cost, "Not available");
        assert!(payload.itinerary.is_empty());
        assert!(payload.is_fallback());

        let value = serde_json::to_value(&payload).expect("serialize fallback");
        assert_eq!(value["itinerary"], json!([]));
        assert_eq!(value["transportationTips"], FALLBACK_APOLOGY);
        assert_eq!(value["additionalRecommendations"], FALLBACK_APOLOGY);
    }

    #[test]
    fn numeric_strings_are_accepted_for_integer_fields() {
        let payload: ItineraryPayload = serde_json::from_value(json!({
            "destination": "Lisbon",
            "duration": "3",
            "itinerary": [{ "day": "1", "activities": { "morning": "Alfama walk" } }]
        }))
        .expect("lenient integers");
        assert_eq!(payload.duration, 3);
        assert_eq!(payload.itinerary[0].day, 1);
        assert_eq!(payload.itinerary[0].activities.morning, "Alfama walk");
        assert_eq!(payload.itinerary[0].activities.evening, "");
    }

    #[test]
    fn stored_itinerary_keeps_legacy_text() {
        let legacy: Itinerary = serde_json::from_value(json!("Day 1: arrive")).expect("legacy");
        assert_eq!(legacy, Itinerary::Legacy("Day 1: arrive".into()));
        assert!(legacy.payload().is_none());

        let structured: Itinerary =
            serde_json::from_value(json!({ "destination": "Rome", "duration": 2, "itinerary": [] }))
                .expect("structured");
        assert_eq!(structured.payload().map(|p| p.duration), Some(2));
    }
}
