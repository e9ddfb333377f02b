//! HTTP route handlers.

pub mod auth;
pub mod health;
pub mod helpers;
pub mod images;
pub mod menus;
pub mod public;

use axum::Router;
use tower_http::trace::TraceLayer;
use tower_sessions::{SessionManagerLayer, SessionStore};

use crate::state::AppState;

/// All API routes, without middleware.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(menus::router())
        .merge(images::router())
        .merge(public::router())
}

/// The API with sessions and request tracing applied.
///
/// Generic over the session store so tests can use the in-memory store.
pub fn app<S: SessionStore + Clone>(
    state: AppState,
    session_layer: SessionManagerLayer<S>,
) -> Router {
    router()
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
