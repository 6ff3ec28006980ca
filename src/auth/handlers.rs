use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::auth::{password, session};
use crate::db::models::{NewUser, User};
use crate::error::{AppError, AppResult};
use crate::extractors::CurrentUser;
use crate::routes::users::validate_new_user;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Open a session for `user` and send it back with the session cookie.
fn signed_in(state: &AppState, user: &User) -> AppResult<Response> {
    let auth = &state.config.auth;
    let token = session::create_session(&state.db, &user.id, auth.session_hours)?;

    Ok((
        StatusCode::OK,
        [(
            header::SET_COOKIE,
            session::session_cookie(&auth.cookie_name, &token, auth.session_hours),
        )],
        Json(user),
    )
        .into_response())
}

/// POST /api/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(new_user): Json<NewUser>,
) -> AppResult<Response> {
    validate_new_user(&new_user)?;
    if state
        .users
        .find_user_by_username(&new_user.username)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(format!(
            "username {} is taken",
            new_user.username
        )));
    }

    let hash = password::hash_password(&new_user.password, state.config.auth.bcrypt_cost)?;
    let user = state.users.create_user(&new_user, &hash).await?;

    tracing::info!(user_id = %user.id, username = %user.username, "signed up");
    signed_in(&state, &user)
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Response> {
    let user = state
        .users
        .find_user_by_username(&req.username)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !password::verify_password(&req.password, &user.password_hash) {
        tracing::warn!(username = %req.username, "failed login");
        return Err(AppError::Unauthorized);
    }

    tracing::info!(user_id = %user.id, "logged in");
    signed_in(&state, &user)
}

/// GET|POST /api/auth/profile
pub async fn profile(user: CurrentUser) -> Json<CurrentUser> {
    Json(user)
}

/// POST /api/auth/logout
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Response> {
    let cookie_name = &state.config.auth.cookie_name;

    if let Some(token) = session::get_cookie_value(&headers, cookie_name) {
        if let Err(e) = session::delete_session(&state.db, token) {
            tracing::warn!("Failed to delete session on logout: {}", e);
        }
    }

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, session::clear_session_cookie(cookie_name))],
    )
        .into_response())
}
