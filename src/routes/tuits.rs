use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::db::models::{DeleteStatus, NewTuit, Tuit, TuitStats, UpdateStatus};
use crate::error::{AppError, AppResult};
use crate::extractors::MaybeUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/tuits", get(find_all_tuits))
        .route(
            "/api/tuits/{tid}",
            get(find_tuit_by_id).put(update_tuit).delete(delete_tuit),
        )
        .route(
            "/api/users/{uid}/tuits",
            get(find_tuits_by_author).post(create_tuit),
        )
        .route("/api/tuits/{tid}/stats/refresh", post(refresh_stats))
}

fn validate(tuit: &NewTuit) -> AppResult<()> {
    if tuit.tuit.trim().is_empty() {
        return Err(AppError::BadRequest("Tuit cannot be empty".into()));
    }
    Ok(())
}

async fn find_all_tuits(State(state): State<AppState>) -> AppResult<Json<Vec<Tuit>>> {
    Ok(Json(state.tuits.find_all_tuits().await?))
}

async fn find_tuit_by_id(
    State(state): State<AppState>,
    Path(tid): Path<String>,
) -> AppResult<Json<Tuit>> {
    Ok(Json(state.tuits.find_tuit_by_id(&tid).await?))
}

async fn find_tuits_by_author(
    State(state): State<AppState>,
    me: MaybeUser,
    Path(uid): Path<String>,
) -> AppResult<Json<Vec<Tuit>>> {
    let uid = me.resolve(&uid)?;
    Ok(Json(state.tuits.find_tuits_by_author(&uid).await?))
}

async fn create_tuit(
    State(state): State<AppState>,
    me: MaybeUser,
    Path(uid): Path<String>,
    Json(tuit): Json<NewTuit>,
) -> AppResult<Json<Tuit>> {
    let uid = me.resolve(&uid)?;
    validate(&tuit)?;
    Ok(Json(state.tuits.create_tuit(&uid, &tuit).await?))
}

async fn update_tuit(
    State(state): State<AppState>,
    Path(tid): Path<String>,
    Json(tuit): Json<NewTuit>,
) -> AppResult<Json<UpdateStatus>> {
    validate(&tuit)?;
    Ok(Json(state.tuits.update_tuit(&tid, &tuit).await?))
}

async fn delete_tuit(
    State(state): State<AppState>,
    Path(tid): Path<String>,
) -> AppResult<Json<DeleteStatus>> {
    Ok(Json(state.tuits.delete_tuit(&tid).await?))
}

/// POST /api/tuits/{tid}/stats/refresh: rebuild the cached like/dislike
/// counters from the Like collection.
async fn refresh_stats(
    State(state): State<AppState>,
    Path(tid): Path<String>,
) -> AppResult<Json<TuitStats>> {
    Ok(Json(state.toggler.refresh_stats(&tid).await?))
}
