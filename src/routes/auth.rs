use axum::routing::{get, post};
use axum::Router;

use crate::auth::handlers;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/signup", post(handlers::signup))
        .route("/api/auth/login", post(handlers::login))
        .route(
            "/api/auth/profile",
            get(handlers::profile).post(handlers::profile),
        )
        .route("/api/auth/logout", post(handlers::logout))
}
