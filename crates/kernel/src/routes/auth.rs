//! Owner authentication routes.
//!
//! The session holds only the owner id. Handlers resolve it with
//! [`require_owner`] and pass it explicitly to the services.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::info;

use super::helpers::{SESSION_OWNER_ID, require_owner, session_error, session_owner};
use crate::error::{AppError, AppResult};
use crate::identity::Owner;
use crate::state::AppState;

/// Sign-up and login request body.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Create the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/session", get(current_session))
}

/// Start an authenticated session for `owner`.
///
/// The session id is rotated so a pre-login id cannot be reused.
async fn start_session(session: &Session, owner: &Owner) -> AppResult<()> {
    session.cycle_id().await.map_err(session_error)?;
    session
        .insert(SESSION_OWNER_ID, owner.id)
        .await
        .map_err(session_error)
}

/// POST /api/auth/signup
async fn signup(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<Credentials>,
) -> AppResult<(StatusCode, Json<Owner>)> {
    let owner = state
        .identity()
        .sign_up(&request.email, &request.password)
        .await?;

    start_session(&session, &owner).await?;
    Ok((StatusCode::CREATED, Json(owner)))
}

/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<Credentials>,
) -> AppResult<Json<Owner>> {
    let owner = state
        .identity()
        .sign_in(&request.email, &request.password)
        .await?
        .ok_or(AppError::Unauthorized)?;

    start_session(&session, &owner).await?;
    info!(owner_id = %owner.id, "owner logged in");
    Ok(Json(owner))
}

/// POST /api/auth/logout
async fn logout(session: Session) -> AppResult<StatusCode> {
    if let Some(owner) = session_owner(&session).await? {
        info!(owner_id = %owner, "owner logged out");
    }
    session.delete().await.map_err(session_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/auth/session
///
/// Returns the signed-in owner, or 401. A session pointing at a deleted
/// account is cleared.
async fn current_session(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<Owner>> {
    let owner_id = require_owner(&session).await?;

    match state.identity().find_owner(owner_id).await? {
        Some(owner) => Ok(Json(owner)),
        None => {
            session.flush().await.map_err(session_error)?;
            Err(AppError::Unauthorized)
        }
    }
}
