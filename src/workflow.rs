use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr, PickFirst};
use tracing::{info, warn};

use crate::{
    error::AppError,
    itinerary::{enrich_details, ItineraryPayload},
    models::trip::{normalize_interests, Budget, Trip},
    services::{itinerary::ItineraryGenerator, trips::TripRepository},
};

/// Body of `POST /trips`. `days` is accepted as an alias of `duration`.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTrip {
    #[serde(default)]
    pub destination: Option<String>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(alias = "days")]
    pub duration: Option<i64>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub budget: Option<String>,
    #[serde(default)]
    pub interests: Option<Vec<String>>,
}

/// Body of `PUT /trips/:id`. Omitted or blank fields keep their stored value.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTrip {
    #[serde(default)]
    pub destination: Option<String>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(alias = "days")]
    pub duration: Option<i64>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub budget: Option<String>,
    #[serde(default)]
    pub interests: Option<Vec<String>>,
}

#[derive(Clone)]
pub struct TripWorkflow {
    trips: Arc<dyn TripRepository>,
    generator: ItineraryGenerator,
}

impl TripWorkflow {
    pub fn new(trips: Arc<dyn TripRepository>, generator: ItineraryGenerator) -> Self {
        Self { trips, generator }
    }

    /// Generation without persistence. Service failures are returned to the
    /// caller instead of degrading to the fallback payload.
    pub async fn preview(
        &self,
        destination: Option<&str>,
        duration: Option<i64>,
        details: Option<&str>,
    ) -> Result<ItineraryPayload, AppError> {
        let (Some(destination), Some(duration)) = (non_blank(destination), duration) else {
            return Err(AppError::validation("Destination and days are required"));
        };
        let duration = validate_duration(duration)?;
        let payload = self
            .generator
            .generate(destination, duration, details.unwrap_or_default())
            .await?;
        Ok(payload)
    }

    pub async fn create(&self, owner: &str, input: CreateTrip) -> Result<Trip, AppError> {
        let (Some(destination), Some(duration)) =
            (non_blank(input.destination.as_deref()), input.duration)
        else {
            return Err(AppError::validation("Destination and duration are required"));
        };
        let duration = validate_duration(duration)?;
        let budget = parse_budget(input.budget.as_deref())?;
        let interests = normalize_interests(input.interests.unwrap_or_default());
        let details = input.details.unwrap_or_default().trim().to_string();

        let prompt_details = enrich_details(&details, budget, &interests);
        let payload = self
            .generator
            .generate_or_fallback(destination, duration, &prompt_details)
            .await;

        let trip = Trip {
            budget: budget.unwrap_or_default(),
            interests,
            details,
            ..Trip::new(owner, destination, duration, payload.into())
        };
        self.trips.create(&trip).await?;
        info!(trip_id = %trip.id, %owner, destination = %trip.destination, "trip created");
        Ok(trip)
    }

    pub async fn get(&self, owner: &str, id: &str) -> Result<Trip, AppError> {
        self.owned_trip(owner, id).await
    }

    pub async fn list(&self, owner: &str) -> Result<Vec<Trip>, AppError> {
        self.trips.find_by_owner(owner).await
    }

    pub async fn update(&self, owner: &str, id: &str, input: UpdateTrip) -> Result<Trip, AppError> {
        let current = self.owned_trip(owner, id).await?;

        let new_destination = non_blank(input.destination.as_deref()).map(str::to_string);
        let new_duration = input.duration.map(validate_duration).transpose()?;
        let new_budget = parse_budget(input.budget.as_deref())?;
        let new_interests = input.interests.map(normalize_interests);
        let new_details = non_blank(input.details.as_deref()).map(str::to_string);

        let destination = new_destination.unwrap_or_else(|| current.destination.clone());
        let duration = new_duration.unwrap_or(current.duration);
        let details = new_details.unwrap_or_else(|| current.details.clone());

        let itinerary = if destination != current.destination || duration != current.duration {
            let prompt_details = enrich_details(
                &details,
                new_budget,
                new_interests.as_deref().unwrap_or_default(),
            );
            info!(trip_id = %current.id, %destination, duration, "trip changed, regenerating itinerary");
            self.generator
                .generate_or_fallback(&destination, duration, &prompt_details)
                .await
                .into()
        } else {
            current.itinerary.clone()
        };
        let budget = new_budget.unwrap_or(current.budget);
        let interests = new_interests.unwrap_or_else(|| current.interests.clone());

        let updated = Trip {
            destination,
            duration,
            details,
            budget,
            interests,
            itinerary,
            updated_at: Utc::now(),
            ..current
        };
        self.trips.update(&updated).await?;
        Ok(updated)
    }

    pub async fn delete(&self, owner: &str, id: &str) -> Result<(), AppError> {
        let trip = self.owned_trip(owner, id).await?;
        self.trips.delete(&trip.id).await?;
        info!(trip_id = %trip.id, %owner, "trip deleted");
        Ok(())
    }

    async fn owned_trip(&self, owner: &str, id: &str) -> Result<Trip, AppError> {
        let trip = self.trips.find_by_id(id).await?.ok_or(AppError::NotFound)?;
        if !trip.is_owned_by(owner) {
            warn!(trip_id = %id, requester = %owner, "rejected access to foreign trip");
            return Err(AppError::Forbidden);
        }
        Ok(trip)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn validate_duration(days: i64) -> Result<u32, AppError> {
    u32::try_from(days)
        .ok()
        .filter(|days| *days >= 1)
        .ok_or_else(|| AppError::validation("duration must be at least 1 day"))
}

fn parse_budget(raw: Option<&str>) -> Result<Option<Budget>, AppError> {
    non_blank(raw)
        .map(|raw| raw.parse::<Budget>())
        .transpose()
        .map_err(|err| AppError::validation(err.to_string()))
}
