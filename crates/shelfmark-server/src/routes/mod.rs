//! API routes.

pub mod auth;
pub mod bookmarks;
pub mod content;
pub mod health;

pub use auth::{LoginRequest, LoginResponse, login_handler, logout_handler};
pub use bookmarks::{
    AssetTokenResponse, ListBookmarksResponse, grant_token_handler, list_bookmarks_handler,
    refresh_cache_handler,
};
pub use content::{archive_handler, content_handler, thumbnail_handler};
pub use health::health_routes;
