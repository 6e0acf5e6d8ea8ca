use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};

use crate::{
    config::AppConfig,
    db::DbPool,
    services::{
        generation::TextGenerator, itinerary::ItineraryGenerator, trips::SqliteTripStore,
    },
    workflow::TripWorkflow,
};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db: DbPool,
    pub trips: TripWorkflow,
    pub cookie_key: Key,
}

impl AppState {
    /// The model client is injected so tests can swap in a fake.
    pub fn new(config: AppConfig, db: DbPool, model: Arc<dyn TextGenerator>) -> Self {
        let digest = Sha512::digest(config.cookie_secret.as_bytes());
        let cookie_key = Key::from(&digest[..]);
        let store = Arc::new(SqliteTripStore::new(db.clone()));
        let trips = TripWorkflow::new(store, ItineraryGenerator::new(model));
        Self {
            config,
            db,
            trips,
            cookie_key,
        }
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}
