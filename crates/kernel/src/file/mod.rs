//! Menu photo storage.
//!
//! Provides image upload, compression, and storage backends.

pub mod service;
pub mod storage;

pub use service::{
    ALLOWED_MIME_TYPES, ImageUploadService, MAX_FILE_SIZE, OUTPUT_MIME_TYPE, UploadError,
    UploadedImage,
};
pub use storage::{FileStorage, LocalFileStorage};

#[cfg(feature = "s3")]
pub use storage::S3FileStorage;
