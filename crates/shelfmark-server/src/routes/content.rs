//! Bookmark content, thumbnail, and archive serving.

use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use shelfmark_types::{AssetKind, BookmarkId};

use crate::error::ServerError;
use crate::resolver::Resolution;
use crate::state::AppState;

/// Body for the non-byte outcomes of an asset request.
#[derive(Debug, Serialize)]
struct AssetStatus {
    code: &'static str,
    message: String,
}

/// GET /bookmark/{id}/content: the archived page content.
pub async fn content_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, ServerError> {
    serve_asset(state, id, AssetKind::Content).await
}

/// GET /bookmark/{id}/thumb: the thumbnail image.
pub async fn thumbnail_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, ServerError> {
    serve_asset(state, id, AssetKind::Thumbnail).await
}

/// GET /bookmark/{id}/archive: the packaged offline archive.
pub async fn archive_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, ServerError> {
    serve_asset(state, id, AssetKind::Archive).await
}

/// Serve one asset, distinguishing the four non-success outcomes:
/// unknown bookmark (404), not yet archived (202, pending), asset
/// unavailable (404 with its own code), collaborator failure (503 via
/// `ServerError`).
async fn serve_asset(state: AppState, id: i64, kind: AssetKind) -> Result<Response, ServerError> {
    let id = BookmarkId(id);

    if state.storage.bookmark(id).await?.is_none() {
        return Err(ServerError::NotFound(format!("bookmark {} not found", id)));
    }

    match state.resolver.resolve(id, kind).await? {
        Resolution::Ready(payload) => Ok((
            [(CONTENT_TYPE, payload.content_type.clone())],
            payload.body.clone(),
        )
            .into_response()),
        Resolution::Pending => Ok((
            StatusCode::ACCEPTED,
            Json(AssetStatus {
                code: "archive_pending",
                message: format!("bookmark {} has not been archived yet", id),
            }),
        )
            .into_response()),
        Resolution::Unavailable => Ok((
            StatusCode::NOT_FOUND,
            Json(AssetStatus {
                code: "asset_unavailable",
                message: format!("no {} stored for bookmark {}", kind, id),
            }),
        )
            .into_response()),
    }
}
