use std::time::Duration;

use anyhow::Context;
use axum::http::{header::InvalidHeaderValue, HeaderValue};
use base64::Engine;
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use time::OffsetDateTime;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::{config::SessionConfig, cookies, state::AppState};

pub const SESSION_COOKIE: &str = "session";

/// Fresh opaque token for the session cookie. Only its hash is persisted.
pub(crate) fn generate_token() -> anyhow::Result<String> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate session token")?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
}

pub(crate) fn hash_token(token: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().to_vec()
}

/// Binds a new token to `user_id`, valid for the configured TTL.
pub async fn create(st: &AppState, user_id: Uuid) -> anyhow::Result<String> {
    let token = generate_token()?;
    let expires_at = OffsetDateTime::now_utc() + st.config.session.ttl();
    st.sessions
        .insert(&hash_token(&token), user_id, expires_at)
        .await?;
    debug!(%user_id, %expires_at, "session created");
    Ok(token)
}

/// `None` for unknown or expired tokens.
pub async fn resolve(st: &AppState, token: &str) -> anyhow::Result<Option<Uuid>> {
    st.sessions
        .find_user(&hash_token(token), OffsetDateTime::now_utc())
        .await
}

pub async fn destroy(st: &AppState, token: &str) -> anyhow::Result<()> {
    st.sessions.delete(&hash_token(token)).await
}

pub async fn purge_expired(st: &AppState) -> anyhow::Result<u64> {
    st.sessions.delete_expired(OffsetDateTime::now_utc()).await
}

pub fn session_cookie(cfg: &SessionConfig, token: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    cookies::build(SESSION_COOKIE, token, cfg.ttl_seconds(), cfg.cookie_secure)
}

pub fn clear_session_cookie(cfg: &SessionConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    cookies::build(SESSION_COOKIE, "", 0, cfg.cookie_secure)
}

/// Periodically deletes expired session rows.
pub fn spawn_sweeper(st: AppState) -> JoinHandle<()> {
    let every = Duration::from_secs(st.config.session.sweep_interval_secs.max(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            match purge_expired(&st).await {
                Ok(0) => {}
                Ok(n) => info!(purged = n, "expired sessions removed"),
                Err(e) => error!(error = %e, "session sweep failed"),
            }
        }
    })
}
