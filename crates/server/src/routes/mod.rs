//! HTTP route handlers.

pub mod admin;
pub mod chat;
pub mod data;

use axum::Router;

use crate::state::AppState;

/// Build the application router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(chat::router())
        .merge(data::router())
        .merge(admin::router())
}
