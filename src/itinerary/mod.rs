//! Itinerary generation core: the payload schema, the prompt sent to the
//! model and the best-effort parsing of what comes back.

pub mod model;
pub mod normalizer;
pub mod prompt;

pub use model::{DayActivities, DayPlan, Itinerary, ItineraryPayload};
pub use normalizer::normalize_response;
pub use prompt::{build_prompt, enrich_details};
