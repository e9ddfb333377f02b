//! Public menu viewer endpoint. No authentication.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use crate::error::{AppError, AppResult};
use crate::models::PublicMenu;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/public/menus/{slug}", get(public_menu))
}

/// GET /api/public/menus/{slug}
///
/// Unknown and unpublished slugs are both 404. The owner is never disclosed.
async fn public_menu(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<PublicMenu>> {
    state
        .menus()
        .get_public_menu(&slug)
        .await?
        .map(|menu| Json(PublicMenu::from(menu)))
        .ok_or(AppError::NotFound)
}
