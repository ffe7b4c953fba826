//! Authentication gate.
//!
//! Protected routes pass through [`require_session`]; the asset-serving
//! routes pass through [`asset_access`], which additionally honors a
//! short-lived capability grant carried in the query string, because an
//! `<img>` or download link cannot always send the session cookie.
//! Failure is always the same generic unauthorized response; callers can
//! never distinguish "expired" from "never existed".

use std::time::Duration;

use axum::{
    extract::{Path, Query, Request, State},
    http::{HeaderMap, header::COOKIE},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use tokio::task::JoinHandle;
use tracing::trace;

use shelfmark_cache::{CacheConfig, ExpiringCache};
use shelfmark_types::BookmarkId;

use crate::error::ServerError;
use crate::sessions::generate_token;
use crate::state::AppState;

/// Cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session-id";

/// Header alternative to the cookie, for API clients.
pub const SESSION_HEADER: &str = "x-session-id";

// ─────────────────────────────────────────────────────────────────────────────
// Identity
// ─────────────────────────────────────────────────────────────────────────────

/// Authenticated identity, inserted into request extensions for handlers.
#[derive(Debug, Clone)]
pub struct Identity {
    /// Username the session resolved to.
    pub username: String,

    /// The validated session token (needed for logout).
    pub token: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Asset grants
// ─────────────────────────────────────────────────────────────────────────────

/// Short-lived capability tokens for embedded asset rendering.
///
/// A grant admits read-only asset retrieval for exactly one bookmark and
/// expires on its own fast TTL; it is deliberately useless on any other
/// route.
#[derive(Clone)]
pub struct AssetGrants {
    inner: ExpiringCache<String, BookmarkId>,
    ttl: Duration,
}

impl AssetGrants {
    /// Create the grant cache with the given TTL and sweep interval.
    pub fn new(ttl: Duration, sweep_interval: Duration) -> Self {
        let config = CacheConfig::new()
            .with_ttl(ttl)
            .with_sweep_interval(sweep_interval);
        Self {
            inner: ExpiringCache::new(config),
            ttl,
        }
    }

    /// Mint a grant for one bookmark.
    pub async fn issue(&self, bookmark_id: BookmarkId) -> String {
        let token = generate_token();
        self.inner.insert(token.clone(), bookmark_id).await;
        token
    }

    /// Whether a grant admits the given bookmark.
    pub async fn check(&self, token: &str, bookmark_id: BookmarkId) -> bool {
        self.inner.get(&token.to_string()).await == Some(bookmark_id)
    }

    /// Grant lifetime, for telling clients how long their URL lives.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Spawn the background sweep task for this cache.
    pub fn start_sweeper(&self) -> JoinHandle<()> {
        self.inner.start_sweeper()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Token extraction
// ─────────────────────────────────────────────────────────────────────────────

/// Extract the session token from the cookie or header.
fn session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(cookie_header) = headers.get(COOKIE).and_then(|v| v.to_str().ok()) {
        for cookie in cookie_header.split(';') {
            if let Some((name, value)) = cookie.trim().split_once('=') {
                if name.trim() == SESSION_COOKIE && !value.is_empty() {
                    return Some(value.trim().to_string());
                }
            }
        }
    }

    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// Middleware
// ─────────────────────────────────────────────────────────────────────────────

/// Middleware for protected routes: a valid session or a uniform 401.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let token = session_token(request.headers()).ok_or(ServerError::Unauthorized)?;
    let username = state
        .sessions
        .validate(&token)
        .await
        .ok_or(ServerError::Unauthorized)?;

    request.extensions_mut().insert(Identity { username, token });
    Ok(next.run(request).await)
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssetPathParams {
    id: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssetQuery {
    token: Option<String>,
}

/// Middleware for the asset routes: a valid session, or a capability
/// grant in `?token=` scoped to the requested bookmark.
pub async fn asset_access(
    State(state): State<AppState>,
    Path(params): Path<AssetPathParams>,
    Query(query): Query<AssetQuery>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    if let Some(token) = session_token(request.headers()) {
        if let Some(username) = state.sessions.validate(&token).await {
            request.extensions_mut().insert(Identity { username, token });
            return Ok(next.run(request).await);
        }
    }

    if let Some(grant) = query.token {
        if state.grants.check(&grant, BookmarkId(params.id)).await {
            trace!(bookmark_id = params.id, "asset access via capability grant");
            return Ok(next.run(request).await);
        }
    }

    Err(ServerError::Unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(name: &'static str, value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn token_from_cookie() {
        let headers = headers_with("cookie", "theme=dark; session-id=abc123; lang=en");
        assert_eq!(session_token(&headers), Some("abc123".to_string()));
    }

    #[test]
    fn token_from_header_when_no_cookie_matches() {
        let mut headers = headers_with("cookie", "theme=dark");
        headers.insert(SESSION_HEADER, HeaderValue::from_static("xyz"));
        assert_eq!(session_token(&headers), Some("xyz".to_string()));
    }

    #[test]
    fn empty_values_are_ignored() {
        let headers = headers_with("cookie", "session-id=");
        assert_eq!(session_token(&headers), None);

        let headers = headers_with(SESSION_HEADER, "");
        assert_eq!(session_token(&headers), None);
    }

    #[test]
    fn no_credentials_at_all() {
        assert_eq!(session_token(&HeaderMap::new()), None);
    }

    #[tokio::test]
    async fn grants_are_scoped_to_one_bookmark() {
        let grants = AssetGrants::new(Duration::from_secs(300), Duration::from_secs(300));
        let token = grants.issue(BookmarkId(5)).await;

        assert!(grants.check(&token, BookmarkId(5)).await);
        assert!(!grants.check(&token, BookmarkId(6)).await);
        assert!(!grants.check("forged", BookmarkId(5)).await);
    }

    #[tokio::test]
    async fn grants_expire() {
        let grants = AssetGrants::new(Duration::from_millis(20), Duration::from_secs(300));
        let token = grants.issue(BookmarkId(5)).await;

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!grants.check(&token, BookmarkId(5)).await);
    }
}
