use axum::extract::{Path, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};

use crate::db::models::{DeleteStatus, Follow, UserSummary};
use crate::error::AppResult;
use crate::extractors::MaybeUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users/{uid}/follows/{followed}", post(follow_user))
        .route("/api/follows/{fid}", delete(unfollow_user))
        .route("/api/users/{uid}/following", get(find_followed))
        .route("/api/users/{uid}/followers", get(find_followers))
}

async fn follow_user(
    State(state): State<AppState>,
    me: MaybeUser,
    Path((uid, followed)): Path<(String, String)>,
) -> AppResult<Json<Follow>> {
    let follower = me.resolve(&uid)?;
    let followed = me.resolve(&followed)?;
    Ok(Json(state.follows.follow_user(&follower, &followed).await?))
}

async fn unfollow_user(
    State(state): State<AppState>,
    Path(fid): Path<String>,
) -> AppResult<Json<DeleteStatus>> {
    Ok(Json(state.follows.unfollow_user(&fid).await?))
}

async fn find_followed(
    State(state): State<AppState>,
    me: MaybeUser,
    Path(uid): Path<String>,
) -> AppResult<Json<Vec<UserSummary>>> {
    let uid = me.resolve(&uid)?;
    Ok(Json(state.follows.find_followed(&uid).await?))
}

async fn find_followers(
    State(state): State<AppState>,
    me: MaybeUser,
    Path(uid): Path<String>,
) -> AppResult<Json<Vec<UserSummary>>> {
    let uid = me.resolve(&uid)?;
    Ok(Json(state.follows.find_followers(&uid).await?))
}
