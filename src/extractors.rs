use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use rusqlite::params;
use serde::Serialize;

use crate::auth::session::get_cookie_value;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Path segment that stands for the logged-in user in `/api/users/{uid}/...`.
pub const ME: &str = "me";

/// Represents the currently authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentUser {
    pub id: String,
    pub username: String,
    pub email: String,
}

/// Extractor that requires authentication.
/// Returns 401 if no valid session found.
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = get_cookie_value(&parts.headers, &state.config.auth.cookie_name)
            .ok_or(AppError::Unauthorized)?;

        let conn = state.db.get()?;
        conn.query_row(
            "SELECT u.id, u.username, u.email FROM sessions s \
             JOIN users u ON u.id = s.user_id \
             WHERE s.token = ?1 AND s.expires_at > datetime('now')",
            params![token],
            |row| {
                Ok(CurrentUser {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    email: row.get(2)?,
                })
            },
        )
        .map_err(|_| AppError::Unauthorized)
    }
}

/// Optional user extractor: None instead of 401 when not authenticated.
pub struct MaybeUser(pub Option<CurrentUser>);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match CurrentUser::from_request_parts(parts, state).await {
            Ok(user) => Ok(MaybeUser(Some(user))),
            Err(_) => Ok(MaybeUser(None)),
        }
    }
}

impl MaybeUser {
    /// Resolve a `{uid}` path segment. `me` becomes the session user's id and
    /// needs a session; anything else passes through untouched.
    pub fn resolve(&self, uid: &str) -> AppResult<String> {
        if uid != ME {
            return Ok(uid.to_string());
        }
        self.0
            .as_ref()
            .map(|user| user.id.clone())
            .ok_or(AppError::Unauthorized)
    }
}
