use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::{
    extract::cookie::PrivateCookieJar,
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use serde_with::{serde_as, DisplayFromStr, PickFirst};

use crate::{
    auth::{self, AuthenticatedUser},
    error::AppError,
    itinerary::ItineraryPayload,
    state::AppState,
};

use super::ApiJson;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/itinerary/generate", post(generate_itinerary))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Serialize)]
struct AuthResponse {
    token: String,
    user: AuthenticatedUser,
}

#[derive(Deserialize)]
struct RegisterBody {
    username: String,
    email: String,
    password: String,
}

async fn register(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    ApiJson(body): ApiJson<RegisterBody>,
) -> Result<(StatusCode, PrivateCookieJar, Json<AuthResponse>), AppError> {
    let user = auth::register_user(&state, &body.username, &body.email, &body.password).await?;
    let token = auth::create_session(&state, user.id).await?;
    Ok((
        StatusCode::CREATED,
        auth::apply_session_cookie(jar, &token),
        Json(AuthResponse { token, user }),
    ))
}

#[derive(Deserialize)]
struct LoginBody {
    #[serde(alias = "email", alias = "username")]
    identifier: String,
    password: String,
}

async fn login(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    ApiJson(body): ApiJson<LoginBody>,
) -> Result<(PrivateCookieJar, Json<AuthResponse>), AppError> {
    let user = auth::authenticate_user(&state, &body.identifier, &body.password).await?;
    let token = auth::create_session(&state, user.id).await?;
    Ok((
        auth::apply_session_cookie(jar, &token),
        Json(AuthResponse { token, user }),
    ))
}

async fn logout(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
) -> Result<(PrivateCookieJar, StatusCode), AppError> {
    if let Some(TypedHeader(authorization)) = bearer {
        auth::destroy_session(&state, authorization.token()).await?;
    }
    if let Some(cookie) = jar.get(auth::SESSION_COOKIE) {
        auth::destroy_session(&state, cookie.value()).await?;
    }
    Ok((auth::clear_session_cookie(jar), StatusCode::NO_CONTENT))
}

/// Body of `POST /itinerary/generate`; `days` is the wire name of the
/// trip duration here.
#[serde_as]
#[derive(Deserialize)]
struct GenerateBody {
    #[serde(default)]
    destination: Option<String>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(alias = "duration")]
    days: Option<i64>,
    #[serde(default)]
    details: Option<String>,
}

#[derive(Serialize)]
struct GenerateResponse {
    itinerary: ItineraryPayload,
}

async fn generate_itinerary(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<GenerateBody>,
) -> Result<Json<GenerateResponse>, AppError> {
    let itinerary = state
        .trips
        .preview(
            body.destination.as_deref(),
            body.days,
            body.details.as_deref(),
        )
        .await?;
    Ok(Json(GenerateResponse { itinerary }))
}
