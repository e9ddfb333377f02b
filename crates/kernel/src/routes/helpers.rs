//! Shared route helpers.

use tower_sessions::Session;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::identity::OwnerId;
use crate::models::Menu;
use crate::state::AppState;

/// Session key for the authenticated owner id.
pub const SESSION_OWNER_ID: &str = "owner_id";

/// Map a session store failure to a 500.
pub fn session_error(err: tower_sessions::session::Error) -> AppError {
    AppError::Internal(anyhow::Error::new(err).context("session store error"))
}

/// The owner id stored in the session, if any.
pub async fn session_owner(session: &Session) -> AppResult<Option<OwnerId>> {
    session
        .get::<OwnerId>(SESSION_OWNER_ID)
        .await
        .map_err(session_error)
}

/// Require an authenticated owner.
///
/// Returns [`AppError::Unauthorized`] if the session holds no owner id.
pub async fn require_owner(session: &Session) -> AppResult<OwnerId> {
    session_owner(session).await?.ok_or(AppError::Unauthorized)
}

/// Load a menu the caller owns.
///
/// Menus owned by someone else are reported as missing, so ids of other
/// owners' menus cannot be discovered.
pub async fn owned_menu(state: &AppState, menu_id: Uuid, owner: OwnerId) -> AppResult<Menu> {
    state
        .menus()
        .get_full_menu(menu_id)
        .await?
        .filter(|menu| menu.owner_id == owner.as_uuid())
        .ok_or(AppError::NotFound)
}
