use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use crate::{
    auth::CurrentUser,
    error::AppError,
    models::trip::Trip,
    state::AppState,
    workflow::{CreateTrip, UpdateTrip},
};

use super::ApiJson;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_trips).post(create_trip))
        .route("/:id", get(get_trip).put(update_trip).delete(delete_trip))
}

async fn list_trips(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Vec<Trip>>, AppError> {
    let user = current.require_user()?;
    Ok(Json(state.trips.list(&user.uuid).await?))
}

async fn create_trip(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiJson(body): ApiJson<CreateTrip>,
) -> Result<(StatusCode, Json<Trip>), AppError> {
    let user = current.require_user()?;
    let trip = state.trips.create(&user.uuid, body).await?;
    Ok((StatusCode::CREATED, Json(trip)))
}

async fn get_trip(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(trip_id): Path<String>,
) -> Result<Json<Trip>, AppError> {
    let user = current.require_user()?;
    Ok(Json(state.trips.get(&user.uuid, &trip_id).await?))
}

async fn update_trip(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(trip_id): Path<String>,
    ApiJson(body): ApiJson<UpdateTrip>,
) -> Result<Json<Trip>, AppError> {
    let user = current.require_user()?;
    Ok(Json(state.trips.update(&user.uuid, &trip_id, body).await?))
}

async fn delete_trip(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(trip_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let user = current.require_user()?;
    state.trips.delete(&user.uuid, &trip_id).await?;
    Ok(Json(json!({ "message": "Trip deleted successfully" })))
}
