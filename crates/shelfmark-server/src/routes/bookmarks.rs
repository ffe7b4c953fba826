//! Bookmark API endpoints.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use shelfmark_types::{Bookmark, BookmarkId};

use crate::error::ServerError;
use crate::state::AppState;

// ─────────────────────────────────────────────────────────────────────────────
// Types
// ─────────────────────────────────────────────────────────────────────────────

/// Response for listing bookmarks.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListBookmarksResponse {
    /// Bookmarks, newest first.
    pub bookmarks: Vec<Bookmark>,
    /// Total count.
    pub total: usize,
}

/// Response carrying a freshly minted asset grant.
#[derive(Debug, Serialize, Deserialize)]
pub struct AssetTokenResponse {
    /// Capability token for `?token=` on the asset routes.
    pub token: String,
    /// Seconds until the grant expires.
    pub expires_in: u64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET /api/bookmarks: list stored bookmarks.
pub async fn list_bookmarks_handler(
    State(state): State<AppState>,
) -> Result<Json<ListBookmarksResponse>, ServerError> {
    let bookmarks = state.storage.list_bookmarks().await?;
    let total = bookmarks.len();
    Ok(Json(ListBookmarksResponse { bookmarks, total }))
}

/// GET /api/bookmarks/{id}/token: mint a capability grant for embedding
/// this bookmark's assets where the session cookie cannot travel.
pub async fn grant_token_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<AssetTokenResponse>, ServerError> {
    let id = BookmarkId(id);
    if state.storage.bookmark(id).await?.is_none() {
        return Err(ServerError::NotFound(format!("bookmark {} not found", id)));
    }

    let token = state.grants.issue(id).await;
    Ok(Json(AssetTokenResponse {
        token,
        expires_in: state.grants.ttl().as_secs(),
    }))
}

/// PUT /api/bookmarks/{id}/cache: drop the bookmark's cached assets.
///
/// Called after a re-archival (or deletion) so the next request
/// repopulates instead of serving stale bytes. Runs even for ids storage
/// no longer knows: a deleted bookmark's cache entries must die too.
pub async fn refresh_cache_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServerError> {
    let id = BookmarkId(id);
    state.resolver.invalidate(id).await;
    info!(bookmark_id = %id, "archive cache refresh requested");
    Ok(StatusCode::NO_CONTENT)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{body_json, login, seeded_state, test_router};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    #[tokio::test]
    async fn listing_requires_a_session() {
        let (state, _, _) = seeded_state(Default::default()).await;
        let app = test_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/bookmarks")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn listing_returns_seeded_bookmarks() {
        let (state, _, _) = seeded_state(Default::default()).await;
        let app = test_router(state);
        let token = login(&app).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/bookmarks")
                    .header("x-session-id", &token)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let list: ListBookmarksResponse = body_json(response).await;
        assert_eq!(list.total, 1);
        assert_eq!(list.bookmarks[0].id, BookmarkId(7));
    }

    #[tokio::test]
    async fn grant_for_unknown_bookmark_is_not_found() {
        let (state, _, _) = seeded_state(Default::default()).await;
        let app = test_router(state);
        let token = login(&app).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/bookmarks/999/token")
                    .header("x-session-id", &token)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn grant_is_minted_and_scoped() {
        let (state, _, _) = seeded_state(Default::default()).await;
        let app = test_router(state.clone());
        let token = login(&app).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/bookmarks/7/token")
                    .header("x-session-id", &token)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let grant: AssetTokenResponse = body_json(response).await;
        assert!(grant.expires_in > 0);
        assert!(state.grants.check(&grant.token, BookmarkId(7)).await);
        assert!(!state.grants.check(&grant.token, BookmarkId(8)).await);
    }

    #[tokio::test]
    async fn cache_refresh_drops_cached_assets() {
        let (state, _, archive) = seeded_state(Default::default()).await;
        let app = test_router(state.clone());
        let token = login(&app).await;

        // Populate the cache, then re-archive with new bytes.
        state
            .resolver
            .resolve(BookmarkId(7), shelfmark_types::AssetKind::Content)
            .await
            .unwrap();
        archive
            .put_asset(
                BookmarkId(7),
                shelfmark_types::AssetKind::Content,
                b"<p>recaptured</p>".to_vec(),
                "text/html; charset=utf-8",
            )
            .await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/api/bookmarks/7/cache")
                    .header("x-session-id", &token)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        // Next resolve repopulates with the new capture.
        match state
            .resolver
            .resolve(BookmarkId(7), shelfmark_types::AssetKind::Content)
            .await
            .unwrap()
        {
            crate::resolver::Resolution::Ready(payload) => {
                assert_eq!(payload.body.as_ref(), b"<p>recaptured</p>")
            }
            other => panic!("expected Ready, got {:?}", other),
        }
    }
}
