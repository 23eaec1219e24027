//! Sigil API: HTTP transport over the session service.

pub mod error;
pub mod middleware;
pub mod state;
pub mod users;

use axum::Router;
use axum::routing::get;
use surrealdb::Connection;

use crate::state::AppState;

/// Build the application router.
pub fn router<C: Connection>(state: AppState<C>) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(users::routes(state))
}

async fn health() -> &'static str {
    "ok"
}
