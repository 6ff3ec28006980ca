use axum::extract::{Path, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};

use crate::db::models::{Bookmark, DeleteStatus, Tuit};
use crate::error::AppResult;
use crate::extractors::MaybeUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users/{uid}/bookmarks", get(find_bookmarked_tuits))
        .route("/api/users/{uid}/bookmarks/{tid}", post(create_bookmark))
        .route("/api/bookmarks/{bid}", delete(delete_bookmark))
}

async fn find_bookmarked_tuits(
    State(state): State<AppState>,
    me: MaybeUser,
    Path(uid): Path<String>,
) -> AppResult<Json<Vec<Tuit>>> {
    let uid = me.resolve(&uid)?;
    Ok(Json(state.bookmarks.find_bookmarked_tuits(&uid).await?))
}

async fn create_bookmark(
    State(state): State<AppState>,
    me: MaybeUser,
    Path((uid, tid)): Path<(String, String)>,
) -> AppResult<Json<Bookmark>> {
    let uid = me.resolve(&uid)?;
    Ok(Json(state.bookmarks.create_bookmark(&uid, &tid).await?))
}

async fn delete_bookmark(
    State(state): State<AppState>,
    Path(bid): Path<String>,
) -> AppResult<Json<DeleteStatus>> {
    Ok(Json(state.bookmarks.delete_bookmark(&bid).await?))
}
