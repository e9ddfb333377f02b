//! Menu photo compression.
//!
//! Uploaded photos are downscaled to a maximum width and re-encoded as
//! lossy JPEG before they reach object storage.

use std::io::Cursor;

use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;

/// Widest image we store, in pixels. Narrower images keep their size.
pub const MAX_WIDTH: u32 = 1200;

/// JPEG quality used for stored photos (0-100).
pub const JPEG_QUALITY: u8 = 70;

/// Maximum input size accepted by the decoder (50 MB).
const MAX_INPUT_SIZE: usize = 50 * 1024 * 1024;

/// Target dimensions for an image of `width` x `height`, capped at [`MAX_WIDTH`]
/// with the aspect ratio preserved.
pub fn target_dimensions(width: u32, height: u32) -> (u32, u32) {
    if width <= MAX_WIDTH {
        return (width, height);
    }
    let scaled = u64::from(height) * u64::from(MAX_WIDTH) / u64::from(width);
    (MAX_WIDTH, u32::try_from(scaled).unwrap_or(u32::MAX).max(1))
}

/// Decode an uploaded photo. Failures here mean the client sent a broken or
/// unsupported image.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    if bytes.len() > MAX_INPUT_SIZE {
        anyhow::bail!(
            "image too large: {} bytes exceeds {} byte limit",
            bytes.len(),
            MAX_INPUT_SIZE
        );
    }

    image::load_from_memory(bytes).context("failed to decode image")
}

/// Downscale a decoded photo to [`MAX_WIDTH`] and encode it as JPEG.
///
/// CPU-bound, like [`decode_image`]; run both on a blocking thread.
pub fn encode_image(img: DynamicImage) -> Result<Vec<u8>> {
    let (width, height) = target_dimensions(img.width(), img.height());
    let img = if width == img.width() {
        img
    } else {
        img.resize_exact(width, height, FilterType::Lanczos3)
    };

    // JPEG has no alpha channel.
    let img = DynamicImage::ImageRgb8(img.to_rgb8());

    let mut buf = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY);
    img.write_with_encoder(encoder)
        .context("failed to encode image")?;

    Ok(buf.into_inner())
}
