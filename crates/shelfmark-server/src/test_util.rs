//! Shared helpers for route tests.

use std::sync::Arc;

use axum::{Router, body::Body, http::Request, response::Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tower::ServiceExt;

use shelfmark_store::{MemoryArchiveStore, MemoryStorage};
use shelfmark_types::{Account, AssetKind, Bookmark, BookmarkId};

use crate::config::ServerConfig;
use crate::state::AppState;
use crate::{Server, credentials};

/// Password the seeded `alice` account logs in with.
pub(crate) const PASSWORD: &str = "correct-horse-battery";

/// Build a state seeded with one account and one archived bookmark:
/// `alice` / [`PASSWORD`], and bookmark 7 with content but no thumbnail.
pub(crate) async fn seeded_state(
    config: ServerConfig,
) -> (AppState, Arc<MemoryStorage>, Arc<MemoryArchiveStore>) {
    let storage = Arc::new(MemoryStorage::new());
    let hash = credentials::hash_password(PASSWORD).unwrap();
    storage.insert_account(Account::new("alice", hash)).await;
    storage
        .insert_bookmark(Bookmark::new(7, "https://example.com/seven", "Seven"))
        .await;

    let archive = Arc::new(MemoryArchiveStore::new());
    archive
        .put_asset(
            BookmarkId(7),
            AssetKind::Content,
            b"<p>archived</p>".to_vec(),
            "text/html; charset=utf-8",
        )
        .await;
    archive
        .put_unavailable(BookmarkId(7), AssetKind::Thumbnail)
        .await;

    let state = AppState::new(config, storage.clone(), archive.clone());
    (state, storage, archive)
}

/// Build the full router for a state.
pub(crate) fn test_router(state: AppState) -> Router {
    Server::from_state(state).router()
}

/// Build a JSON request.
pub(crate) fn request_json<T: Serialize>(method: &str, uri: &str, body: &T) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

/// Deserialize a response body.
pub(crate) async fn body_json<T: DeserializeOwned>(response: Response) -> T {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Log the seeded account in and return its session token.
pub(crate) async fn login(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(request_json(
            "POST",
            "/api/login",
            &serde_json::json!({ "username": "alice", "password": PASSWORD }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), axum::http::StatusCode::OK);

    let login: crate::routes::LoginResponse = body_json(response).await;
    login.token
}
