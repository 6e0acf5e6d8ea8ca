//! Best-effort extraction of the itinerary JSON from free model text.
//!
//! The object is located greedily, from the first `{` to the last `}`.
//! Braces are not balanced or checked against string literals, so prose
//! around the object that itself contains braces, or a reply holding several
//! objects, defeats this heuristic. Such replies end up as parse errors and
//! therefore as the fallback payload.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;
use tracing::warn;

use super::model::ItineraryPayload;

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("no JSON object found in model response")]
    NoJsonObject,
    #[error("invalid itinerary JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| Regex::new(r"```[A-Za-z]*").expect("fence pattern is valid"))
}

fn object_regex() -> &'static Regex {
    static OBJECT: OnceLock<Regex> = OnceLock::new();
    OBJECT.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("object pattern is valid"))
}

pub fn strip_code_fences(raw: &str) -> String {
    fence_regex().replace_all(raw, "").trim().to_string()
}

pub fn extract_json_object(text: &str) -> Option<&str> {
    object_regex().find(text).map(|found| found.as_str())
}

pub fn parse_itinerary(raw: &str) -> Result<ItineraryPayload, NormalizeError> {
    let cleaned = strip_code_fences(raw);
    let candidate = extract_json_object(&cleaned).ok_or(NormalizeError::NoJsonObject)?;
    Ok(serde_json::from_str(candidate)?)
}

/// Never fails: anything that does not parse becomes the fallback payload for
/// the requested destination and duration.
pub fn normalize_response(raw: &str, destination: &str, duration: u32) -> ItineraryPayload {
    match parse_itinerary(raw) {
        Ok(mut payload) => {
            if payload.destination.trim().is_empty() {
                payload.destination = destination.to_string();
            }
            if payload.duration == 0 {
                payload.duration = duration;
            }
            payload
        }
        Err(err) => {
            warn!(%destination, duration, "falling back to default itinerary: {err}");
            ItineraryPayload::fallback(destination, duration)
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;

    fn sample() -> Value {
        json!({
            "destination": "Bali",
            "duration": 2,
            "totalEstimatedCost": "$400",
            "itinerary": [
                {
                    "day": 1,
                    "activities": {
                        "morning": "Tegallalang rice terraces",
                        "afternoon": "Ubud monkey forest",
                        "evening": "Kecak dance at Uluwatu"
                    },
                    "estimatedCost": "$120",
                    "accommodation": "Ubud guesthouse"
                },
                {
                    "day": 2,
                    "activities": {
                        "morning": "Snorkelling at Amed",
                        "afternoon": "Tirta Gangga",
                        "evening": "Seafood in Jimbaran"
                    },
                    "estimatedCost": "$150",
                    "accommodation": "Seminyak villa"
                }
            ],
            "transportationTips": "Hire a driver for day trips.",
            "additionalRecommendations": "Carry cash for temple donations."
        })
    }

    #[test]
    fn fenced_json_yields_the_exact_object() {
        let raw = format!("```json\n{}\n```", serde_json::to_string_pretty(&sample()).unwrap());
        let payload = normalize_response(&raw, "Bali", 2);
        assert_eq!(serde_json::to_value(&payload).unwrap(), sample());
        assert!(!payload.is_fallback());
    }

    #[test]
    fn unfenced_json_with_surrounding_prose_is_found() {
        let raw = format!("Here is your plan:\n{}\nEnjoy!", sample());
        let payload = parse_itinerary(&raw).expect("object inside prose");
        assert_eq!(payload.itinerary.len(), 2);
        assert_eq!(payload.itinerary[1].activities.evening, "Seafood in Jimbaran");
    }

    #[test]
    fn garbage_text_becomes_fallback() {
        let payload = normalize_response("I'm sorry, I can't help with that.", "Bali", 5);
        assert!(payload.is_fallback());
        assert_eq!(payload.destination, "Bali");
        assert_eq!(payload.duration, 5);
        assert!(payload.itinerary.is_empty());
    }

    #[test]
    fn truncated_json_becomes_fallback() {
        let full = sample().to_string();
        let truncated = &full[..full.len() / 2];
        assert!(matches!(
            parse_itinerary(truncated),
            Err(NormalizeError::NoJsonObject) | Err(NormalizeError::InvalidJson(_))
        ));
        assert!(normalize_response(truncated, "Bali", 2).is_fallback());
    }

    #[test]
    fn malformed_object_is_an_invalid_json_error() {
        let err = parse_itinerary("{ destination: Bali, }").unwrap_err();
        assert!(matches!(err, NormalizeError::InvalidJson(_)));
    }

    #[test]
    fn wrong_field_types_fall_back() {
        let raw = r#"{"destination": "Bali", "duration": 2, "itinerary": "see below"}"#;
        assert!(normalize_response(raw, "Bali", 2).is_fallback());
    }

    #[test]
    fn trailing_brace_in_prose_defeats_greedy_match() {
        let raw = format!("{} -- note: prices in {{USD}}", sample());
        assert!(normalize_response(&raw, "Bali", 2).is_fallback());
    }

    #[test]
    fn missing_destination_and_duration_are_backfilled() {
        let payload = normalize_response(r#"{"itinerary": []}"#, "Porto", 3);
        assert_eq!(payload.destination, "Porto");
        assert_eq!(payload.duration, 3);
        assert!(!payload.is_fallback());
    }

    #[test]
    fn strips_fence_markers_only() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("{\"a\":1}"), "{\"a\":1}");
    }
}
