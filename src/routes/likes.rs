use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Serialize;

use crate::db::models::{DeleteStatus, Like, Tuit, UserSummary};
use crate::error::{AppError, AppResult};
use crate::extractors::MaybeUser;
use crate::likes::{Relationship, ToggleAction, ToggleOutcome};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users/{uid}/likes", get(find_tuits_user_liked))
        .route("/api/users/{uid}/dislikes", get(find_tuits_user_disliked))
        .route(
            "/api/users/{uid}/likes/{tid}",
            get(find_relationship)
                .post(create_like)
                .delete(delete_like)
                .put(toggle_like),
        )
        .route("/api/users/{uid}/dislikes/{tid}", put(toggle_dislike))
        .route("/api/tuits/{tid}/likes", get(find_users_that_liked_tuit))
        .route("/api/tuits/{tid}/dislikes", get(find_users_that_disliked_tuit))
        .route("/api/tuits/{tid}/likes/count", get(count_likes))
        .route("/api/tuits/{tid}/dislikes/count", get(count_dislikes))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RelationshipView {
    user_id: String,
    tuit_id: String,
    state: Relationship,
}

#[derive(Serialize)]
struct LikeCount {
    likes: i64,
}

#[derive(Serialize)]
struct DislikeCount {
    dislikes: i64,
}

async fn find_tuits_user_liked(
    State(state): State<AppState>,
    me: MaybeUser,
    Path(uid): Path<String>,
) -> AppResult<Json<Vec<Tuit>>> {
    let uid = me.resolve(&uid)?;
    Ok(Json(state.likes.find_tuits_user_liked(&uid).await?))
}

async fn find_tuits_user_disliked(
    State(state): State<AppState>,
    me: MaybeUser,
    Path(uid): Path<String>,
) -> AppResult<Json<Vec<Tuit>>> {
    let uid = me.resolve(&uid)?;
    Ok(Json(state.likes.find_tuits_user_disliked(&uid).await?))
}

async fn find_relationship(
    State(state): State<AppState>,
    me: MaybeUser,
    Path((uid, tid)): Path<(String, String)>,
) -> AppResult<Json<RelationshipView>> {
    let uid = me.resolve(&uid)?;
    let relationship = state.likes.find_relationship(&uid, &tid).await?;
    Ok(Json(RelationshipView {
        user_id: uid,
        tuit_id: tid,
        state: relationship,
    }))
}

/// Direct insert that leaves the tuit's cached stats alone.
async fn create_like(
    State(state): State<AppState>,
    me: MaybeUser,
    Path((uid, tid)): Path<(String, String)>,
) -> AppResult<Json<Like>> {
    let uid = me.resolve(&uid)?;
    Ok(Json(state.likes.create_like(&uid, &tid, false).await?))
}

/// Direct delete that leaves the tuit's cached stats alone.
async fn delete_like(
    State(state): State<AppState>,
    me: MaybeUser,
    Path((uid, tid)): Path<(String, String)>,
) -> AppResult<Json<DeleteStatus>> {
    let uid = me.resolve(&uid)?;
    Ok(Json(state.likes.delete_like(&uid, &tid).await?))
}

async fn toggle(
    state: &AppState,
    me: &MaybeUser,
    uid: &str,
    tid: &str,
    action: ToggleAction,
) -> AppResult<Json<ToggleOutcome>> {
    let uid = me.resolve(uid)?;

    // Callers only ever learn that the toggle did not happen
    state
        .toggler
        .toggle(&uid, tid, action)
        .await
        .map(Json)
        .map_err(|e| {
            tracing::warn!(user_id = %uid, tuit_id = %tid, ?action, "toggle failed: {}", e);
            AppError::NotFound
        })
}

/// PUT /api/users/{uid}/likes/{tid}
async fn toggle_like(
    State(state): State<AppState>,
    me: MaybeUser,
    Path((uid, tid)): Path<(String, String)>,
) -> AppResult<Json<ToggleOutcome>> {
    toggle(&state, &me, &uid, &tid, ToggleAction::Like).await
}

/// PUT /api/users/{uid}/dislikes/{tid}
async fn toggle_dislike(
    State(state): State<AppState>,
    me: MaybeUser,
    Path((uid, tid)): Path<(String, String)>,
) -> AppResult<Json<ToggleOutcome>> {
    toggle(&state, &me, &uid, &tid, ToggleAction::Dislike).await
}

async fn find_users_that_liked_tuit(
    State(state): State<AppState>,
    Path(tid): Path<String>,
) -> AppResult<Json<Vec<UserSummary>>> {
    Ok(Json(state.likes.find_users_that_liked_tuit(&tid).await?))
}

async fn find_users_that_disliked_tuit(
    State(state): State<AppState>,
    Path(tid): Path<String>,
) -> AppResult<Json<Vec<UserSummary>>> {
    Ok(Json(state.likes.find_users_that_disliked_tuit(&tid).await?))
}

/// Live aggregate over the Like collection, never the cached stats.
async fn count_likes(
    State(state): State<AppState>,
    Path(tid): Path<String>,
) -> AppResult<Json<LikeCount>> {
    let likes = state.likes.count_likes(&tid).await?;
    Ok(Json(LikeCount { likes }))
}

async fn count_dislikes(
    State(state): State<AppState>,
    Path(tid): Path<String>,
) -> AppResult<Json<DislikeCount>> {
    let dislikes = state.likes.count_dislikes(&tid).await?;
    Ok(Json(DislikeCount { dislikes }))
}
