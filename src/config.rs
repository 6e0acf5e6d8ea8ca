use std::{env, net::SocketAddr};

use url::Url;

use crate::error::AppError;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub listen_addr: SocketAddr,
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: Url,
    pub cookie_secret: String,
    pub cors_origin: String,
    pub session_ttl_days: i64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://tripsage.db?mode=rwc".to_string());
        let listen_addr: SocketAddr = env::var("APP_LISTEN_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:5000".to_string())
            .parse()
            .map_err(|err| AppError::Config(format!("invalid APP_LISTEN_ADDR: {err}")))?;

        let gemini_api_key = env::var("GEMINI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());
        let gemini_base_url: Url = env::var("GEMINI_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.to_string())
            .parse()
            .map_err(|err| AppError::Config(format!("invalid GEMINI_API_BASE_URL: {err}")))?;

        let cookie_secret = env::var("COOKIE_SECRET")
            .unwrap_or_else(|_| "change-me-tripsage-cookie-secret-for-local-dev".to_string());

        let cors_origin =
            env::var("CORS_ORIGIN").unwrap_or_else(|_| "http://localhost:5173".to_string());

        let session_ttl_days = match env::var("SESSION_TTL_DAYS") {
            Ok(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|days| *days > 0)
                .ok_or_else(|| AppError::Config(format!("invalid SESSION_TTL_DAYS: {raw}")))?,
            Err(_) => 7,
        };

        Ok(Self {
            database_url,
            listen_addr,
            gemini_api_key,
            gemini_base_url,
            cookie_secret,
            cors_origin,
            session_ttl_days,
        })
    }
}
