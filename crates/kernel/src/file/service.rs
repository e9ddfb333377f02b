//! Menu photo uploads.
//!
//! Validates size and content type, compresses the photo off the async
//! runtime, writes it to storage, and hands back a public URL.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, info};

use super::storage::FileStorage;
use crate::services::image::{decode_image, encode_image};

/// Maximum upload size (10 MB).
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Content types accepted for upload, detected from the file's magic bytes.
pub const ALLOWED_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Content type of every stored photo.
pub const OUTPUT_MIME_TYPE: &str = "image/jpeg";

/// Maximum concurrent compression jobs.
const MAX_CONCURRENT_PROCESSING: usize = 4;

/// Upload errors.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("no file provided")]
    Empty,

    #[error("file too large: {size} bytes (max {MAX_FILE_SIZE} bytes)")]
    TooLarge { size: usize },

    #[error("file type not allowed: {0}")]
    UnsupportedType(String),

    /// The bytes carry an image signature but do not decode.
    #[error("image could not be decoded")]
    Undecodable(#[source] anyhow::Error),

    #[error("image could not be processed")]
    Processing(#[source] anyhow::Error),

    #[error("storage error")]
    Storage(#[source] anyhow::Error),
}

/// Result of a successful upload.
#[derive(Debug, Clone, serde::Serialize)]
pub struct UploadedImage {
    pub uri: String,
    pub url: String,
    pub size: usize,
}

/// Detect the content type of an upload from its magic bytes.
///
/// Client-supplied content types are not trusted.
pub fn detect_mime_type(data: &[u8]) -> Option<&'static str> {
    infer::get(data).map(|kind| kind.mime_type())
}

/// Image upload service.
#[derive(Clone)]
pub struct ImageUploadService {
    storage: Arc<dyn FileStorage>,
    processing: Arc<Semaphore>,
}

impl ImageUploadService {
    pub fn new(storage: Arc<dyn FileStorage>) -> Self {
        Self {
            storage,
            processing: Arc::new(Semaphore::new(MAX_CONCURRENT_PROCESSING)),
        }
    }

    /// Reject uploads that are empty, oversized or not a supported image.
    pub fn validate(&self, data: &[u8]) -> Result<&'static str, UploadError> {
        if data.is_empty() {
            return Err(UploadError::Empty);
        }
        if data.len() > MAX_FILE_SIZE {
            return Err(UploadError::TooLarge { size: data.len() });
        }
        match detect_mime_type(data) {
            Some(mime) if ALLOWED_MIME_TYPES.contains(&mime) => Ok(mime),
            Some(mime) => Err(UploadError::UnsupportedType(mime.to_string())),
            None => Err(UploadError::UnsupportedType(
                "application/octet-stream".to_string(),
            )),
        }
    }

    /// Compress and store a photo, returning its public URL.
    pub async fn upload_image(&self, data: Vec<u8>) -> Result<UploadedImage, UploadError> {
        let mime = self.validate(&data)?;
        let original_size = data.len();

        let compressed = {
            let _permit = self
                .processing
                .acquire()
                .await
                .map_err(|e| UploadError::Processing(e.into()))?;
            tokio::task::spawn_blocking(move || {
                let img = decode_image(&data).map_err(UploadError::Undecodable)?;
                encode_image(img).map_err(UploadError::Processing)
            })
            .await
            .map_err(|e| UploadError::Processing(e.into()))??
        };

        let uri = self.storage.generate_uri("jpg");
        self.storage
            .put(&uri, &compressed, OUTPUT_MIME_TYPE)
            .await
            .map_err(UploadError::Storage)?;

        let url = self.storage.public_url(&uri);

        debug!(
            uri = %uri,
            source_type = mime,
            original_size,
            size = compressed.len(),
            "image compressed"
        );
        info!(url = %url, "image uploaded");

        Ok(UploadedImage {
            uri,
            url,
            size: compressed.len(),
        })
    }

}

impl std::fmt::Debug for ImageUploadService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUploadService")
            .field("storage_scheme", &self.storage.scheme())
            .finish()
    }
}
