//! Thumbnail generation and image tool results
//!
//! Available with the `image-processing` feature.

use std::io::Cursor;

use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use rmcp::model::{CallToolResult, Content};

const JPEG_QUALITY: u8 = 80;

/// Output encoding for [`thumbnail`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailFormat {
    Png,
    Jpeg,
}

impl ThumbnailFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ThumbnailFormat::Png => "image/png",
            ThumbnailFormat::Jpeg => "image/jpeg",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ThumbnailError {
    #[error("failed to decode image: {0}")]
    Decode(image::ImageError),

    #[error("failed to encode {format:?} thumbnail: {source}")]
    Encode {
        format: ThumbnailFormat,
        source: image::ImageError,
    },

    #[error("thumbnail width must be greater than 0")]
    ZeroWidth,
}

/// Decode `data`, shrink it to fit a `max_width` x `max_width` box keeping
/// the aspect ratio, and re-encode it. Images already inside the box keep
/// their size.
pub fn thumbnail(
    data: &[u8],
    max_width: u32,
    format: ThumbnailFormat,
) -> Result<Vec<u8>, ThumbnailError> {
    if max_width == 0 {
        return Err(ThumbnailError::ZeroWidth);
    }

    let img = image::load_from_memory(data).map_err(ThumbnailError::Decode)?;
    let (width, height) = fit_within(img.width(), img.height(), max_width);
    let img = if (width, height) == (img.width(), img.height()) {
        img
    } else {
        img.resize_exact(width, height, FilterType::Lanczos3)
    };

    encode(&img, format)
}

/// Target dimensions for a `max` x `max` box; never upscales.
fn fit_within(width: u32, height: u32, max: u32) -> (u32, u32) {
    if width <= max && height <= max {
        return (width, height);
    }
    let scale = f64::min(max as f64 / width as f64, max as f64 / height as f64);
    let scaled = |side: u32| ((side as f64 * scale).round() as u32).clamp(1, max);
    (scaled(width), scaled(height))
}

fn encode(img: &DynamicImage, format: ThumbnailFormat) -> Result<Vec<u8>, ThumbnailError> {
    let mut buf = Vec::new();
    let result = match format {
        ThumbnailFormat::Jpeg => {
            // JPEG has no alpha channel
            let encoder = JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY);
            DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)
        }
        ThumbnailFormat::Png => img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png),
    };
    result.map_err(|source| ThumbnailError::Encode { format, source })?;
    Ok(buf)
}

/// Wrap encoded image bytes as MCP image content.
pub fn image_success(data: &[u8], mime_type: &str) -> CallToolResult {
    let b64 = base64::engine::general_purpose::STANDARD.encode(data);
    CallToolResult::success(vec![Content::image(b64, mime_type.to_string())])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_png(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::new_rgba8(width, height);
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .expect("encode test PNG");
        buf
    }

    fn dimensions(data: &[u8], format: ImageFormat) -> (u32, u32) {
        let img = image::load_from_memory_with_format(data, format).expect("decode thumbnail");
        (img.width(), img.height())
    }

    #[test]
    fn wide_image_shrinks_to_width() {
        let out = thumbnail(&make_test_png(2000, 1000), 100, ThumbnailFormat::Png).unwrap();
        assert_eq!(dimensions(&out, ImageFormat::Png), (100, 50));
    }

    #[test]
    fn tall_image_shrinks_to_height() {
        let out = thumbnail(&make_test_png(300, 1200), 200, ThumbnailFormat::Png).unwrap();
        assert_eq!(dimensions(&out, ImageFormat::Png), (50, 200));
    }

    #[test]
    fn small_image_not_upscaled() {
        let out = thumbnail(&make_test_png(40, 20), 100, ThumbnailFormat::Png).unwrap();
        assert_eq!(dimensions(&out, ImageFormat::Png), (40, 20));
    }

    #[test]
    fn jpeg_output_from_rgba_source() {
        let out = thumbnail(&make_test_png(400, 400), 64, ThumbnailFormat::Jpeg).unwrap();
        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Jpeg);
        assert_eq!(dimensions(&out, ImageFormat::Jpeg), (64, 64));
    }

    #[test]
    fn garbage_input_fails_decode() {
        assert!(matches!(
            thumbnail(b"not an image", 64, ThumbnailFormat::Png),
            Err(ThumbnailError::Decode(_))
        ));
    }

    #[test]
    fn zero_width_rejected() {
        assert!(matches!(
            thumbnail(&make_test_png(10, 10), 0, ThumbnailFormat::Png),
            Err(ThumbnailError::ZeroWidth)
        ));
    }

    #[test]
    fn image_success_wraps_base64() {
        let result = image_success(b"abc", "image/png");
        assert_eq!(result.content.len(), 1);
        assert!(!result.is_error.unwrap_or(false));
    }
}
