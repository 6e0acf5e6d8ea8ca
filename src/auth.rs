use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    extract::cookie::{Cookie, PrivateCookieJar, SameSite},
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use chrono::{Duration, Utc};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{session::Session, user::User},
    state::AppState,
};

pub const SESSION_COOKIE: &str = "tripsage_session";
const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Serialize)]
pub struct AuthenticatedUser {
    #[serde(skip_serializing)]
    pub id: i64,
    pub uuid: String,
    pub username: String,
}

impl From<User> for AuthenticatedUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            uuid: user.uuid,
            username: user.username,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CurrentUser(pub Option<AuthenticatedUser>);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Populated by `load_session`.
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>() {
            return Ok(Self(Some(user.clone())));
        }

        Ok(Self(None))
    }
}

impl CurrentUser {
    pub fn require_user(&self) -> Result<&AuthenticatedUser, AppError> {
        self.0.as_ref().ok_or(AppError::Unauthorized)
    }
}

/// Resolves the session from the bearer token or the private cookie and
/// attaches the user to the request. Unknown tokens leave it anonymous.
pub async fn load_session(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer
        .map(|TypedHeader(authorization)| authorization.token().to_string())
        .or_else(|| jar.get(SESSION_COOKIE).map(|cookie| cookie.value().to_string()));

    if let Some(token) = token {
        match resolve_session(&state, &token).await? {
            Some(user) => {
                request.extensions_mut().insert(user);
            }
            None => debug!("request carried an unknown or expired session"),
        }
    }

    Ok(next.run(request).await)
}

pub async fn register_user(
    state: &AppState,
    username: &str,
    email: &str,
    password: &str,
) -> Result<AuthenticatedUser, AppError> {
    let username = username.trim();
    let email = email.trim().to_lowercase();
    if username.is_empty() || email.is_empty() {
        return Err(AppError::validation("Username and email are required"));
    }
    if !email.contains('@') {
        return Err(AppError::validation("Email address is invalid"));
    }
    if username.contains('@') {
        return Err(AppError::validation("Username cannot contain '@'"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    // Logins match either column, so each new value must be unique across both.
    let taken: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM users WHERE username IN (?, ?) OR email IN (?, ?)",
    )
    .bind(username)
    .bind(&email)
    .bind(username)
    .bind(&email)
    .fetch_one(&state.db)
    .await?;
    if taken > 0 {
        return Err(AppError::validation("Username or email is already registered"));
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| AppError::Other(anyhow::anyhow!("password hashing failed: {err}")))?
        .to_string();

    let uuid = Uuid::new_v4().to_string();
    let result = sqlx::query(
        "INSERT INTO users (uuid, username, email, password_hash, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&uuid)
    .bind(username)
    .bind(&email)
    .bind(&password_hash)
    .bind(Utc::now())
    .execute(&state.db)
    .await
    .map_err(registration_conflict)?;

    info!(%username, "registered user");
    Ok(AuthenticatedUser {
        id: result.last_insert_rowid(),
        uuid,
        username: username.to_string(),
    })
}

fn registration_conflict(err: sqlx::Error) -> AppError {
    match err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::validation("Username or email is already registered")
        }
        other => other.into(),
    }
}

pub async fn authenticate_user(
    state: &AppState,
    identifier: &str,
    password: &str,
) -> Result<AuthenticatedUser, AppError> {
    let identifier = identifier.trim();
    if identifier.is_empty() || password.is_empty() {
        return Err(AppError::validation("Identifier and password are required"));
    }

    let user: Option<User> = sqlx::query_as(
        "SELECT id, uuid, username, email, password_hash, created_at, last_login_at
         FROM users WHERE username = ? OR email = ?",
    )
    .bind(identifier)
    .bind(identifier.to_lowercase())
    .fetch_optional(&state.db)
    .await?;
    let user = user.ok_or(AppError::Unauthorized)?;

    let parsed = PasswordHash::new(&user.password_hash)
        .map_err(|err| AppError::Other(anyhow::anyhow!("stored password hash is invalid: {err}")))?;
    if Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_err()
    {
        return Err(AppError::Unauthorized);
    }

    sqlx::query("UPDATE users SET last_login_at = ? WHERE id = ?")
        .bind(Utc::now())
        .bind(user.id)
        .execute(&state.db)
        .await?;

    Ok(user.into())
}

pub async fn create_session(state: &AppState, user_id: i64) -> Result<String, AppError> {
    let now = Utc::now();
    let session_id = Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO sessions (id, user_id, created_at, last_seen_at, expires_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&session_id)
    .bind(user_id)
    .bind(now)
    .bind(now)
    .bind(now + Duration::days(state.config.session_ttl_days))
    .execute(&state.db)
    .await?;
    Ok(session_id)
}

pub async fn resolve_session(
    state: &AppState,
    session_id: &str,
) -> Result<Option<AuthenticatedUser>, AppError> {
    let session: Option<Session> = sqlx::query_as(
        "SELECT id, user_id, created_at, last_seen_at, expires_at FROM sessions WHERE id = ?",
    )
    .bind(session_id)
    .fetch_optional(&state.db)
    .await?;
    let Some(session) = session else {
        return Ok(None);
    };

    let now = Utc::now();
    if session.is_expired(now) {
        destroy_session(state, &session.id).await?;
        return Ok(None);
    }

    sqlx::query("UPDATE sessions SET last_seen_at = ? WHERE id = ?")
        .bind(now)
        .bind(&session.id)
        .execute(&state.db)
        .await?;

    let user: Option<User> = sqlx::query_as(
        "SELECT id, uuid, username, email, password_hash, created_at, last_login_at
         FROM users WHERE id = ?",
    )
    .bind(session.user_id)
    .fetch_optional(&state.db)
    .await?;
    Ok(user.map(AuthenticatedUser::from))
}

pub async fn destroy_session(state: &AppState, session_id: &str) -> Result<(), AppError> {
    sqlx::query("DELETE FROM sessions WHERE id = ?")
        .bind(session_id)
        .execute(&state.db)
        .await?;
    Ok(())
}

pub fn apply_session_cookie(jar: PrivateCookieJar, session_id: &str) -> PrivateCookieJar {
    jar.add(
        Cookie::build((SESSION_COOKIE, session_id.to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax),
    )
}

pub fn clear_session_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}
