pub mod public;
pub mod trips;

use axum::{
    extract::FromRequest,
    http::{header, HeaderValue, Method},
    middleware, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;

use crate::{auth, config::AppConfig, error::AppError, state::AppState};

/// JSON body extractor whose rejections render as `{"error": ...}`.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .merge(public::router())
        .nest("/trips", trips::router());

    Router::new()
        .merge(api.clone())
        .nest("/api", api)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::load_session,
        ))
        .layer(cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);
    match HeaderValue::from_str(&config.cors_origin) {
        Ok(origin) => layer.allow_origin(origin),
        Err(err) => {
            warn!("ignoring invalid CORS_ORIGIN {:?}: {err}", config.cors_origin);
            layer
        }
    }
}
