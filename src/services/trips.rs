use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::{
    db::DbPool,
    error::AppError,
    itinerary::Itinerary,
    models::trip::{Budget, Trip},
};

/// Persistence of trips, one document at a time.
#[async_trait]
pub trait TripRepository: Send + Sync {
    async fn create(&self, trip: &Trip) -> Result<(), AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Trip>, AppError>;
    /// Newest first.
    async fn find_by_owner(&self, owner: &str) -> Result<Vec<Trip>, AppError>;
    async fn update(&self, trip: &Trip) -> Result<(), AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct SqliteTripStore {
    db: DbPool,
}

impl SqliteTripStore {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }
}

const TRIP_COLUMNS: &str = "id, owner, destination, duration, budget, interests, details, itinerary, created_at, updated_at";

#[derive(FromRow)]
struct TripRow {
    id: String,
    owner: String,
    destination: String,
    duration: i64,
    budget: String,
    interests: String,
    details: String,
    itinerary: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TripRow> for Trip {
    type Error = AppError;

    fn try_from(row: TripRow) -> Result<Self, Self::Error> {
        let duration = u32::try_from(row.duration)
            .map_err(|_| AppError::Other(anyhow::anyhow!("trip {} has invalid duration", row.id)))?;
        let budget: Budget = row
            .budget
            .parse()
            .map_err(|err| AppError::Other(anyhow::Error::new(err)))?;
        let interests: Vec<String> =
            serde_json::from_str(&row.interests).map_err(|err| AppError::Other(err.into()))?;
        let itinerary: Itinerary =
            serde_json::from_str(&row.itinerary).map_err(|err| AppError::Other(err.into()))?;
        Ok(Trip {
            id: row.id,
            owner: row.owner,
            destination: row.destination,
            duration,
            budget,
            interests,
            details: row.details,
            itinerary,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn encode_json<T: serde::Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string(value).map_err(|err| AppError::Other(err.into()))
}

#[async_trait]
impl TripRepository for SqliteTripStore {
    async fn create(&self, trip: &Trip) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO trips (id, owner, destination, duration, budget, interests, details, itinerary, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&trip.id)
        .bind(&trip.owner)
        .bind(&trip.destination)
        .bind(i64::from(trip.duration))
        .bind(trip.budget.as_str())
        .bind(encode_json(&trip.interests)?)
        .bind(&trip.details)
        .bind(encode_json(&trip.itinerary)?)
        .bind(trip.created_at)
        .bind(trip.updated_at)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Trip>, AppError> {
        let row: Option<TripRow> =
            sqlx::query_as(&format!("SELECT {TRIP_COLUMNS} FROM trips WHERE id = ?"))
                .bind(id)
                .fetch_optional(&self.db)
                .await?;
        row.map(Trip::try_from).transpose()
    }

    async fn find_by_owner(&self, owner: &str) -> Result<Vec<Trip>, AppError> {
        let rows: Vec<TripRow> = sqlx::query_as(&format!(
            "SELECT {TRIP_COLUMNS} FROM trips WHERE owner = ? ORDER BY created_at DESC, seq DESC"
        ))
        .bind(owner)
        .fetch_all(&self.db)
        .await?;
        rows.into_iter().map(Trip::try_from).collect()
    }

    async fn update(&self, trip: &Trip) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE trips
             SET destination = ?, duration = ?, budget = ?, interests = ?, details = ?, itinerary = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&trip.destination)
        .bind(i64::from(trip.duration))
        .bind(trip.budget.as_str())
        .bind(encode_json(&trip.interests)?)
        .bind(&trip.details)
        .bind(encode_json(&trip.itinerary)?)
        .bind(trip.updated_at)
        .bind(&trip.id)
        .execute(&self.db)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM trips WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
