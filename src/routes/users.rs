use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use crate::auth::password;
use crate::db::models::{DeleteStatus, NewUser, UpdateStatus, User};
use crate::error::{AppError, AppResult};
use crate::extractors::MaybeUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(find_all_users).post(create_user))
        .route(
            "/api/users/{uid}",
            get(find_user_by_id).put(update_user).delete(delete_user),
        )
        .route(
            "/api/users/username/{username}",
            get(find_user_by_username).delete(delete_users_by_username),
        )
}

fn require_username(user: &NewUser) -> AppResult<()> {
    if user.username.trim().is_empty() {
        return Err(AppError::BadRequest("Username is required".into()));
    }
    Ok(())
}

/// A new account needs both a username and a non-empty password.
pub(crate) fn validate_new_user(user: &NewUser) -> AppResult<()> {
    require_username(user)?;
    if user.password.is_empty() {
        return Err(AppError::BadRequest("Password is required".into()));
    }
    Ok(())
}

async fn find_all_users(State(state): State<AppState>) -> AppResult<Json<Vec<User>>> {
    Ok(Json(state.users.find_all_users().await?))
}

async fn find_user_by_id(
    State(state): State<AppState>,
    me: MaybeUser,
    Path(uid): Path<String>,
) -> AppResult<Json<User>> {
    let uid = me.resolve(&uid)?;
    Ok(Json(state.users.find_user_by_id(&uid).await?))
}

async fn find_user_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Json<User>> {
    state
        .users
        .find_user_by_username(&username)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound)
}

async fn create_user(
    State(state): State<AppState>,
    Json(new_user): Json<NewUser>,
) -> AppResult<Json<User>> {
    validate_new_user(&new_user)?;
    let hash = password::hash_password(&new_user.password, state.config.auth.bcrypt_cost)?;
    Ok(Json(state.users.create_user(&new_user, &hash).await?))
}

async fn update_user(
    State(state): State<AppState>,
    me: MaybeUser,
    Path(uid): Path<String>,
    Json(update): Json<NewUser>,
) -> AppResult<Json<UpdateStatus>> {
    let uid = me.resolve(&uid)?;
    require_username(&update)?;
    // An omitted password leaves the stored one in place
    let hash = match update.password.as_str() {
        "" => None,
        plain => Some(password::hash_password(plain, state.config.auth.bcrypt_cost)?),
    };
    Ok(Json(
        state
            .users
            .update_user(&uid, &update, hash.as_deref())
            .await?,
    ))
}

async fn delete_user(
    State(state): State<AppState>,
    me: MaybeUser,
    Path(uid): Path<String>,
) -> AppResult<Json<DeleteStatus>> {
    let uid = me.resolve(&uid)?;
    let status = state.users.delete_user(&uid).await?;
    tracing::info!(user_id = %uid, deleted = status.deleted_count, "deleted user");
    Ok(Json(status))
}

async fn delete_users_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Json<DeleteStatus>> {
    Ok(Json(state.users.delete_users_by_username(&username).await?))
}
