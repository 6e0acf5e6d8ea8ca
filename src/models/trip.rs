use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::itinerary::Itinerary;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Budget {
    Budget,
    #[default]
    Moderate,
    Luxury,
}

impl Budget {
    pub fn as_str(&self) -> &'static str {
        match self {
            Budget::Budget => "budget",
            Budget::Moderate => "moderate",
            Budget::Luxury => "luxury",
        }
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("budget must be one of budget, moderate, luxury (got \"{0}\")")]
pub struct UnknownBudget(pub String);

impl FromStr for Budget {
    type Err = UnknownBudget;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "budget" => Ok(Budget::Budget),
            "moderate" => Ok(Budget::Moderate),
            "luxury" => Ok(Budget::Luxury),
            _ => Err(UnknownBudget(raw.to_string())),
        }
    }
}

/// A persisted trip. Values are never mutated in place; the workflow builds
/// a new `Trip` and hands it to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: String,
    pub owner: String,
    pub destination: String,
    pub duration: u32,
    pub budget: Budget,
    pub interests: Vec<String>,
    pub details: String,
    pub itinerary: Itinerary,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Trip {
    pub fn new(
        owner: impl Into<String>,
        destination: impl Into<String>,
        duration: u32,
        itinerary: Itinerary,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            owner: owner.into(),
            destination: destination.into(),
            duration,
            budget: Budget::default(),
            interests: Vec::new(),
            details: String::new(),
            itinerary,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, owner: &str) -> bool {
        self.owner == owner
    }
}

/// Trims tags, drops blank ones and removes duplicates while keeping the
/// first occurrence.
pub fn normalize_interests<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in raw {
        let tag = tag.as_ref().trim();
        if tag.is_empty() || out.iter().any(|seen| seen == tag) {
            continue;
        }
        out.push(tag.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_parses_case_insensitively() {
        assert_eq!("Luxury".parse::<Budget>(), Ok(Budget::Luxury));
        assert_eq!(" budget ".parse::<Budget>(), Ok(Budget::Budget));
        assert!("cheap".parse::<Budget>().is_err());
        assert_eq!(Budget::default(), Budget::Moderate);
    }

    #[test]
    fn unknown_budget_names_the_rejected_value() {
        let err = "shoestring".parse::<Budget>().unwrap_err();
        assert_eq!(err, UnknownBudget("shoestring".into()));
        assert_eq!(
            err.to_string(),
            "budget must be one of budget, moderate, luxury (got \"shoestring\")"
        );
    }

    #[test]
    fn interests_are_deduplicated_and_trimmed() {
        let tags = normalize_interests(["food", " culture ", "", "food", "nightlife"]);
        assert_eq!(tags, vec!["food", "culture", "nightlife"]);
    }

    #[test]
    fn trip_serializes_with_camel_case_keys() {
        let trip = Trip::new("owner-1", "Bali", 5, Itinerary::Legacy("day 1: beach".into()));
        let value = serde_json::to_value(&trip).expect("serialize trip");
        assert_eq!(value["destination"], "Bali");
        assert_eq!(value["budget"], "moderate");
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").is_some());
        assert_eq!(value["itinerary"], "day 1: beach");
    }
}
