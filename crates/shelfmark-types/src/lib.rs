//! Shared types for the Shelfmark bookmark server.

pub mod account;
pub mod asset;
pub mod bookmark;
pub mod session;

pub use account::Account;
pub use asset::{AssetKey, AssetKind, ParseAssetKindError};
pub use bookmark::{Bookmark, BookmarkId, ParseBookmarkIdError};
pub use session::Session;
