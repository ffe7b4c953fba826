//! HTTP server and cache subsystem for Shelfmark.
//!
//! This crate provides the web tier of the bookmark service: three
//! independently-expiring caches (accounts, sessions, archive content),
//! the authentication gate in front of every protected route, and the
//! resolver that serves bookmark content, thumbnails, and archive
//! snapshots without re-reading the archive store on every request.
//!
//! # Example
//!
//! ```ignore
//! use shelfmark_server::{Server, ServerConfig};
//!
//! let config = ServerConfig::new()
//!     .with_bind_address("127.0.0.1:8080".parse()?)
//!     .with_root_path("/bookmarks");
//!
//! let server = Server::new(config, storage, archive);
//! server.run().await?;
//! ```

pub mod auth;
pub mod config;
pub mod credentials;
pub mod error;
pub mod resolver;
pub mod routes;
pub mod sessions;
pub mod state;
pub mod users;

pub use auth::{AssetGrants, Identity, SESSION_COOKIE, SESSION_HEADER};
pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use resolver::{ArchiveContentCache, ContentResolver, Resolution};
pub use routes::{LoginRequest, LoginResponse};
pub use sessions::SessionCache;
pub use state::AppState;
pub use users::UserCache;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware, routing::get};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use shelfmark_store::{ArchiveStore, Storage};

#[cfg(test)]
pub(crate) mod test_util;

/// The Shelfmark HTTP server.
pub struct Server {
    /// Application state.
    state: AppState,
}

impl Server {
    /// Create a new server from configuration and collaborators.
    pub fn new(
        config: ServerConfig,
        storage: Arc<dyn Storage>,
        archive: Arc<dyn ArchiveStore>,
    ) -> Self {
        Self {
            state: AppState::new(config, storage, archive),
        }
    }

    /// Create a server from a pre-built application state.
    pub fn from_state(state: AppState) -> Self {
        Self { state }
    }

    /// Access the application state (for embedding and tests).
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Build the router with all routes and middleware.
    ///
    /// Every route is joined under the configured root path so the
    /// server can sit behind a reverse-proxy path prefix unchanged.
    pub fn router(&self) -> Router {
        let state = self.state.clone();

        let mut app = Router::new()
            // Health (no auth)
            .merge(routes::health_routes())
            // Asset serving (session or capability grant)
            .merge(self.content_routes())
            // JSON API
            .nest("/api", self.api_routes());

        // Static files bypass the auth gate entirely.
        if let Some(ref assets_dir) = state.config.assets_dir {
            app = app.nest_service("/assets", ServeDir::new(assets_dir));
        }

        let app = app
            .layer(TraceLayer::new_for_http())
            .with_state(state.clone());

        if state.config.has_root_prefix() {
            Router::new().nest(&state.config.root_path, app)
        } else {
            app
        }
    }

    /// Content, thumbnail, and archive routes, behind the asset gate.
    fn content_routes(&self) -> Router<AppState> {
        Router::new()
            .route("/bookmark/{id}/content", get(routes::content_handler))
            .route("/bookmark/{id}/thumb", get(routes::thumbnail_handler))
            .route("/bookmark/{id}/archive", get(routes::archive_handler))
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                auth::asset_access,
            ))
    }

    /// API routes. Login is public; everything else requires a session.
    fn api_routes(&self) -> Router<AppState> {
        use axum::routing::{post, put};

        let protected = Router::new()
            .route("/logout", post(routes::logout_handler))
            .route("/bookmarks", get(routes::list_bookmarks_handler))
            .route("/bookmarks/{id}/token", get(routes::grant_token_handler))
            .route("/bookmarks/{id}/cache", put(routes::refresh_cache_handler))
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                auth::require_session,
            ));

        Router::new()
            .route("/login", post(routes::login_handler))
            .merge(protected)
    }

    /// Run the server: start the cache sweepers, bind, and serve.
    pub async fn run(self) -> Result<()> {
        let addr = self.state.config.bind_address;
        self.run_on(addr).await
    }

    /// Run the server on a specific address (useful for testing).
    pub async fn run_on(self, addr: SocketAddr) -> Result<()> {
        let _sweepers = self.state.start_sweepers();
        let root_path = self.state.config.root_path.clone();
        let router = self.router();

        info!(root_path = %root_path, "starting server on {}", addr);

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Internal(format!("failed to bind: {}", e)))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| ServerError::Internal(format!("server error: {}", e)))?;

        Ok(())
    }

    /// Get the configured bind address.
    pub fn bind_address(&self) -> SocketAddr {
        self.state.config.bind_address
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::seeded_state;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    #[tokio::test]
    async fn health_is_reachable_without_auth() {
        let (state, _, _) = seeded_state(ServerConfig::default()).await;
        let app = Server::from_state(state).router();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn routes_mount_under_the_root_prefix() {
        let config = ServerConfig::new().with_root_path("/shelf");
        let (state, _, _) = seeded_state(config).await;
        let app = Server::from_state(state).router();

        let prefixed = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/shelf/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(prefixed.status(), StatusCode::OK);

        let bare = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(bare.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn static_assets_bypass_the_auth_gate() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("style.css"), "body { margin: 0 }").unwrap();

        let config = ServerConfig::new().with_assets_dir(dir.path());
        let (state, _, _) = seeded_state(config).await;
        let app = Server::from_state(state).router();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/assets/style.css")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let (state, _, _) = seeded_state(ServerConfig::default()).await;
        let app = Server::from_state(state).router();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/definitely-not-a-route")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
