//! Image upload route.

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use tower_sessions::Session;
use tracing::warn;

use super::helpers::require_owner;
use crate::error::{AppError, AppResult};
use crate::file::{MAX_FILE_SIZE, UploadedImage};
use crate::state::AppState;

/// Room for multipart framing on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Create the image router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/images", post(upload_image))
        .layer(DefaultBodyLimit::max(MAX_FILE_SIZE + MULTIPART_OVERHEAD))
}

/// Upload a menu photo.
///
/// POST /api/images
/// Content-Type: multipart/form-data
///
/// Form fields:
/// - file: the image to upload
async fn upload_image(
    State(state): State<AppState>,
    session: Session,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<UploadedImage>)> {
    let owner = require_owner(&session).await?;

    let mut data = None;
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return Err(multipart_error(e)),
        };

        if field.name() == Some("file") {
            data = Some(field.bytes().await.map_err(multipart_error)?.to_vec());
            break;
        }
    }

    let Some(data) = data else {
        return Err(AppError::BadRequest("missing multipart field \"file\"".to_string()));
    };

    let uploaded = state.uploads().upload_image(data).await?;
    tracing::debug!(owner_id = %owner, url = %uploaded.url, "menu photo stored");
    Ok((StatusCode::CREATED, Json(uploaded)))
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        warn!(error = %err, "malformed multipart upload");
        AppError::BadRequest(err.body_text())
    }
}
