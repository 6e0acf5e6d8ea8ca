use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};
use tripsage::config::AppConfig;
use tripsage::db::{init_pool, run_migrations};
use tripsage::error::AppError;
use tripsage::routes::create_router;
use tripsage::services::generation::GeminiClient;
use tripsage::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_logging();

    let config = AppConfig::from_env()?;
    let db = init_pool(&config.database_url).await?;
    run_migrations(&db).await?;

    if config.gemini_api_key.is_none() {
        warn!("GEMINI_API_KEY is not set; new trips will get the fallback itinerary");
    }
    let model = GeminiClient::new(
        config.gemini_base_url.clone(),
        config.gemini_api_key.clone(),
    );
    info!(model = %model.settings().model, "itinerary generation configured");

    let state = AppState::new(config.clone(), db, Arc::new(model));
    let app = create_router(state);

    let listener = TcpListener::bind(config.listen_addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);
    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tripsage=debug,tower_http=info".into());

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
