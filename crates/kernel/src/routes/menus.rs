//! Owner menu routes: dashboard, editor saves, publishing, and AI auto-fill.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use uuid::Uuid;

use super::helpers::{owned_menu, require_owner};
use crate::error::{AppError, AppResult};
use crate::models::{Menu, MenuDraft, MenuSummary};
use crate::services::GeneratedMenu;
use crate::state::AppState;

/// Currency used when a new menu does not name one.
pub const DEFAULT_CURRENCY: &str = "EUR";

/// Create the menu router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/menus", get(list_menus).post(create_menu))
        .route("/api/menus/generate", post(generate_menu))
        .route(
            "/api/menus/{id}",
            get(get_menu).put(save_menu).delete(delete_menu),
        )
        .route("/api/menus/{id}/publish", post(publish_menu))
        .route("/api/slugs/{slug}/availability", get(slug_availability))
}

#[derive(Debug, Deserialize)]
pub struct CreateMenuRequest {
    pub business_name: String,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedMenu {
    pub id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SlugAvailability {
    pub slug: String,
    pub available: bool,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub cuisine: String,
    pub business_name: String,
}

/// GET /api/menus
async fn list_menus(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<Vec<MenuSummary>>> {
    let owner = require_owner(&session).await?;
    Ok(Json(state.menus().list_owned_menus(owner).await?))
}

/// POST /api/menus
async fn create_menu(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<CreateMenuRequest>,
) -> AppResult<(StatusCode, Json<CreatedMenu>)> {
    let owner = require_owner(&session).await?;

    let currency = request
        .currency
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_CURRENCY);

    let id = state
        .menus()
        .create_menu(owner, request.business_name.trim(), currency)
        .await?;

    Ok((StatusCode::CREATED, Json(CreatedMenu { id })))
}

/// GET /api/menus/{id}
async fn get_menu(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Menu>> {
    let owner = require_owner(&session).await?;
    Ok(Json(owned_menu(&state, id, owner).await?))
}

/// PUT /api/menus/{id}
///
/// Replaces the whole menu with the submitted draft and returns the stored
/// result. The id in the path wins over any id in the body.
async fn save_menu(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
    Json(mut draft): Json<MenuDraft>,
) -> AppResult<Json<Menu>> {
    let owner = require_owner(&session).await?;
    draft.id = id;

    state.menus().save_full_menu(&draft, owner).await?;
    Ok(Json(owned_menu(&state, id, owner).await?))
}

/// POST /api/menus/{id}/publish
async fn publish_menu(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
    Json(mut draft): Json<MenuDraft>,
) -> AppResult<Json<Menu>> {
    let owner = require_owner(&session).await?;
    draft.id = id;

    Ok(Json(state.menus().publish_menu(draft, owner).await?))
}

/// DELETE /api/menus/{id}
async fn delete_menu(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let owner = require_owner(&session).await?;

    if state.menus().delete_menu(id, owner).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

/// GET /api/slugs/{slug}/availability
async fn slug_availability(
    State(state): State<AppState>,
    session: Session,
    Path(slug): Path<String>,
) -> AppResult<Json<SlugAvailability>> {
    require_owner(&session).await?;

    let available = state.menus().check_slug_availability(&slug).await?;
    Ok(Json(SlugAvailability { slug, available }))
}

/// POST /api/menus/generate
///
/// Suggests categories and items. Nothing is saved.
async fn generate_menu(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<GenerateRequest>,
) -> AppResult<Json<GeneratedMenu>> {
    require_owner(&session).await?;

    let generator = state
        .generator()
        .ok_or_else(|| AppError::Unavailable("AI auto-fill is not configured".to_string()))?;

    let cuisine = request.cuisine.trim();
    let business_name = request.business_name.trim();
    if cuisine.is_empty() || business_name.is_empty() {
        return Err(AppError::BadRequest(
            "cuisine and business name are required".to_string(),
        ));
    }

    Ok(Json(generator.generate_menu(cuisine, business_name).await?))
}
