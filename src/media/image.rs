//! Thumbnail rendering: decode, normalise to RGB, shrink to fit, encode WebP.

use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbImage};

use super::TransformError;

/// Lossy WebP quality, 0-100.
pub const WEBP_QUALITY: f32 = 80.0;

/// Decode `source`, shrink it to fit inside `max_width` x `max_height`
/// and return the result encoded as lossy WebP.
pub fn resize_to_box(
    source: &[u8],
    max_width: u32,
    max_height: u32,
) -> Result<Vec<u8>, TransformError> {
    let decoded =
        image::load_from_memory(source).map_err(|e| TransformError::Decode(e.to_string()))?;

    let fitted = fit_to_box(decoded, max_width, max_height);
    encode_webp(&fitted)
}

/// Converts to 8-bit RGB first so palette, grayscale and alpha sources all
/// come out with the same color model. Never upscales.
pub fn fit_to_box(image: DynamicImage, max_width: u32, max_height: u32) -> RgbImage {
    let rgb = match image {
        DynamicImage::ImageRgb8(rgb) => rgb,
        other => other.to_rgb8(),
    };

    let (width, height) = rgb.dimensions();
    if width <= max_width && height <= max_height {
        return rgb;
    }

    let (target_width, target_height) = shrink_dimensions(width, height, max_width, max_height);
    imageops::resize(&rgb, target_width, target_height, FilterType::Lanczos3)
}

/// Largest size with the source aspect ratio that fits inside the box.
pub fn shrink_dimensions(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    let ratio = f64::min(
        max_width as f64 / width as f64,
        max_height as f64 / height as f64,
    )
    .min(1.0);

    let scale = |side: u32, bound: u32| -> u32 {
        ((side as f64 * ratio).round() as u32).max(1).min(bound.max(1))
    };

    (scale(width, max_width), scale(height, max_height))
}

fn encode_webp(image: &RgbImage) -> Result<Vec<u8>, TransformError> {
    let (width, height) = image.dimensions();
    let encoded = webp::Encoder::from_rgb(image.as_raw(), width, height)
        .encode_simple(false, WEBP_QUALITY)
        .map_err(|e| TransformError::Encode(format!("webp encoder failed: {:?}", e)))?;

    Ok(encoded.to_vec())
}
