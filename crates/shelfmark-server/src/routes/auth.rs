//! Login and logout endpoints.

use axum::{
    Extension, Json,
    extract::State,
    http::{StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use shelfmark_types::Account;

use crate::auth::{Identity, SESSION_COOKIE};
use crate::credentials;
use crate::error::ServerError;
use crate::state::AppState;

// ─────────────────────────────────────────────────────────────────────────────
// Types
// ─────────────────────────────────────────────────────────────────────────────

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Session token; also set as the `session-id` cookie.
    pub token: String,
    /// When the session expires.
    pub expires_at: DateTime<Utc>,
    /// Whether the account is an administrator.
    pub admin: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// POST /api/login: verify credentials and open a session.
///
/// Every failure path returns the same unauthorized response so the
/// endpoint cannot be used to probe for usernames.
pub async fn login_handler(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Response, ServerError> {
    let LoginRequest { username, password } = request;
    if username.is_empty() || password.is_empty() {
        return Err(ServerError::Unauthorized);
    }

    let account = match &state.external_auth {
        Some(directory) => {
            if !directory.verify(&username, &password).await? {
                warn!(username = %username, "directory login rejected");
                return Err(ServerError::Unauthorized);
            }
            match state.account(&username).await? {
                Some(account) => account,
                None => provision_account(&state, &username, &password).await?,
            }
        }
        None => {
            let Some(account) = state.account(&username).await? else {
                return Err(ServerError::Unauthorized);
            };
            if !credentials::verify_password(&password, &account.password_hash) {
                warn!(username = %username, "login rejected");
                return Err(ServerError::Unauthorized);
            }
            account
        }
    };

    let session = state.sessions.create(&account.username).await;
    state.users.store(account.clone()).await;
    info!(username = %account.username, "login succeeded");

    let cookie = format!(
        "{}={}; Path={}; Max-Age={}; HttpOnly; SameSite=Lax",
        SESSION_COOKIE,
        session.token,
        cookie_path(&state),
        state.config.session_ttl.as_secs(),
    );

    let body = LoginResponse {
        token: session.token,
        expires_at: session.expires_at,
        admin: account.admin,
    };

    Ok(([(SET_COOKIE, cookie)], Json(body)).into_response())
}

/// POST /api/logout: revoke the session immediately.
pub async fn logout_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Response, ServerError> {
    state.sessions.revoke(&identity.token).await;
    info!(username = %identity.username, "logout");

    let cookie = format!(
        "{}=; Path={}; Max-Age=0; HttpOnly; SameSite=Lax",
        SESSION_COOKIE,
        cookie_path(&state),
    );

    Ok((StatusCode::NO_CONTENT, [(SET_COOKIE, cookie)]).into_response())
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// First successful directory login: create the matching local record so
/// the account cache and storage stay consistent.
async fn provision_account(
    state: &AppState,
    username: &str,
    password: &str,
) -> Result<Account, ServerError> {
    let hash = credentials::hash_password(password)
        .map_err(|e| ServerError::Internal(format!("credential hashing failed: {e}")))?;
    let account = Account::new(username, hash);
    state.storage.create_account(account.clone()).await?;
    state.users.store(account.clone()).await;
    info!(username = %username, "provisioned account from directory login");
    Ok(account)
}

fn cookie_path(state: &AppState) -> String {
    state.config.root_path.clone()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
