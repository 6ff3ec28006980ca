use axum::extract::{Path, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};

use crate::db::models::{DeleteStatus, Message, NewMessage};
use crate::error::{AppError, AppResult};
use crate::extractors::MaybeUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users/{uid}/messages/{recipient}", post(send_message))
        .route("/api/users/{uid}/messages/sent", get(find_sent_messages))
        .route(
            "/api/users/{uid}/messages/received",
            get(find_received_messages),
        )
        .route("/api/messages/{mid}", delete(delete_message))
}

async fn send_message(
    State(state): State<AppState>,
    me: MaybeUser,
    Path((uid, recipient)): Path<(String, String)>,
    Json(message): Json<NewMessage>,
) -> AppResult<Json<Message>> {
    let sender = me.resolve(&uid)?;
    let recipient = me.resolve(&recipient)?;
    if message.message.trim().is_empty() {
        return Err(AppError::BadRequest("Message cannot be empty".into()));
    }
    Ok(Json(
        state
            .messages
            .create_message(&sender, &recipient, &message)
            .await?,
    ))
}

async fn find_sent_messages(
    State(state): State<AppState>,
    me: MaybeUser,
    Path(uid): Path<String>,
) -> AppResult<Json<Vec<Message>>> {
    let uid = me.resolve(&uid)?;
    Ok(Json(state.messages.find_sent_messages(&uid).await?))
}

async fn find_received_messages(
    State(state): State<AppState>,
    me: MaybeUser,
    Path(uid): Path<String>,
) -> AppResult<Json<Vec<Message>>> {
    let uid = me.resolve(&uid)?;
    Ok(Json(state.messages.find_received_messages(&uid).await?))
}

async fn delete_message(
    State(state): State<AppState>,
    Path(mid): Path<String>,
) -> AppResult<Json<DeleteStatus>> {
    Ok(Json(state.messages.delete_message(&mid).await?))
}
