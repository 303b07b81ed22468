//! Decode → bounding-box scale → JPEG re-encode.
//!
//! The output is always a self-contained JPEG that fits inside the
//! configured box; images are only ever shrunk, never enlarged, and the
//! aspect ratio is preserved to within one pixel of rounding.

use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use tracing::{debug, info};

use momentz_shared::constants::{
    MAX_UPLOAD_BYTES, POST_IMAGE_MAX_EDGE, POST_IMAGE_QUALITY, PROFILE_IMAGE_MAX_EDGE,
    PROFILE_IMAGE_QUALITY,
};

use crate::error::MediaError;
use crate::preflight::{preflight, ImageSource};

/// Bounding box and encode quality for one call site.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizeOptions {
    pub max_width: u32,
    pub max_height: u32,
    /// Lossy encode fidelity in (0, 1].
    pub quality: f32,
    /// Source files above this size are rejected before decode.
    pub max_source_bytes: usize,
}

impl NormalizeOptions {
    /// Post images: 1200×1200 at 0.7.
    pub const POST: Self = Self {
        max_width: POST_IMAGE_MAX_EDGE,
        max_height: POST_IMAGE_MAX_EDGE,
        quality: POST_IMAGE_QUALITY,
        max_source_bytes: MAX_UPLOAD_BYTES,
    };

    /// Profile pictures: 800×800 at 0.8.
    pub const PROFILE: Self = Self {
        max_width: PROFILE_IMAGE_MAX_EDGE,
        max_height: PROFILE_IMAGE_MAX_EDGE,
        quality: PROFILE_IMAGE_QUALITY,
        max_source_bytes: MAX_UPLOAD_BYTES,
    };

    /// JPEG quality on the encoder's 1..=100 scale.
    fn jpeg_quality(&self) -> Result<u8, MediaError> {
        if !(self.quality > 0.0 && self.quality <= 1.0) {
            return Err(MediaError::InvalidQuality(self.quality));
        }
        Ok((self.quality * 100.0).round().clamp(1.0, 100.0) as u8)
    }
}

/// A transport-ready encoded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub mime: &'static str,
}

impl EncodedImage {
    /// `data:image/jpeg;base64,...`, embeddable directly as `imageUrl` or
    /// `profilePicture`.
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime,
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

/// Scale `(width, height)` down to fit inside `(max_width, max_height)`.
///
/// The scale factor is clamped to 1 so nothing is enlarged. Each side is
/// rounded and kept at least one pixel.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (width, height);
    }

    let scale = (max_width as f64 / width as f64)
        .min(max_height as f64 / height as f64)
        .min(1.0);

    if scale >= 1.0 {
        return (width, height);
    }

    let w = ((width as f64 * scale).round() as u32).clamp(1, max_width.max(1));
    let h = ((height as f64 * scale).round() as u32).clamp(1, max_height.max(1));
    (w, h)
}

/// Run the whole pipeline synchronously: pre-flight, decode, scale, encode.
///
/// Nothing partial is ever returned; any failure aborts.
pub fn normalize(source: &ImageSource, opts: &NormalizeOptions) -> Result<EncodedImage, MediaError> {
    let quality = opts.jpeg_quality()?;
    preflight(source, opts.max_source_bytes)?;

    let decoded = image::load_from_memory(&source.bytes).map_err(MediaError::Decode)?;
    let (src_w, src_h) = (decoded.width(), decoded.height());
    let (width, height) = fit_within(src_w, src_h, opts.max_width, opts.max_height);

    let scaled = if (width, height) == (src_w, src_h) {
        decoded
    } else {
        decoded.resize_exact(width, height, FilterType::Triangle)
    };

    // JPEG carries no alpha channel
    let rgb = scaled.to_rgb8();

    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut bytes, quality);
    rgb.write_with_encoder(encoder).map_err(MediaError::Encode)?;

    debug!(src_w, src_h, width, height, quality, "Image rescaled");
    info!(
        source_bytes = source.len(),
        encoded_bytes = bytes.len(),
        width,
        height,
        "Image normalized"
    );

    Ok(EncodedImage {
        bytes,
        width,
        height,
        mime: "image/jpeg",
    })
}

/// Async entry point: decode and encode run on the blocking pool so the
/// caller's task only suspends.
pub async fn normalize_async(
    source: ImageSource,
    opts: NormalizeOptions,
) -> Result<EncodedImage, MediaError> {
    tokio::task::spawn_blocking(move || normalize(&source, &opts))
        .await
        .map_err(|e| MediaError::Worker(e.to_string()))?
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{ImageBuffer, ImageFormat, Rgb, Rgba};

    pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img: ImageBuffer<Rgb<u8>, Vec<u8>> =
            ImageBuffer::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 90]));
        let mut buf = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buf);
        img.write_to(&mut cursor, ImageFormat::Png).unwrap();
        buf
    }

    fn decoded_dims(encoded: &EncodedImage) -> (u32, u32) {
        let img = image::load_from_memory(&encoded.bytes).unwrap();
        (img.width(), img.height())
    }

    #[test]
    fn test_fit_within_clamps_long_edge() {
        assert_eq!(fit_within(3000, 2000, 1200, 1200), (1200, 800));
        assert_eq!(fit_within(2000, 3000, 1200, 1200), (800, 1200));
    }

    #[test]
    fn test_fit_within_never_enlarges() {
        assert_eq!(fit_within(600, 400, 1200, 1200), (600, 400));
        assert_eq!(fit_within(1200, 1200, 1200, 1200), (1200, 1200));
    }

    #[test]
    fn test_fit_within_respects_both_bounds() {
        // Landscape but the height is the binding constraint.
        let (w, h) = fit_within(1000, 900, 1200, 800);
        assert!(w <= 1200 && h <= 800);
        assert_eq!(h, 800);
        assert_eq!(w, 889);
    }

    #[test]
    fn test_fit_within_preserves_aspect_ratio() {
        for &(w, h) in &[(4032, 3024), (1081, 7), (5000, 4999), (1201, 1199), (640, 4800)] {
            let (ow, oh) = fit_within(w, h, 1200, 1200);
            assert!(ow <= 1200 && oh <= 1200, "{w}x{h} -> {ow}x{oh}");
            assert!(ow >= 1 && oh >= 1);
            let expected_h = oh as f64;
            let projected_h = ow as f64 * h as f64 / w as f64;
            assert!((expected_h - projected_h).abs() <= 1.0, "{w}x{h} -> {ow}x{oh}");
        }
    }

    #[test]
    fn test_normalize_scenario_large_landscape() {
        let source = ImageSource::from_bytes(png_bytes(3000, 2000), Some("image/png"));
        let out = normalize(&source, &NormalizeOptions::POST).unwrap();
        assert_eq!((out.width, out.height), (1200, 800));
        assert_eq!(decoded_dims(&out), (1200, 800));
        assert_eq!(out.mime, "image/jpeg");
    }

    #[test]
    fn test_normalize_small_image_untouched_dimensions() {
        let source = ImageSource::from_bytes(png_bytes(600, 400), None);
        let out = normalize(&source, &NormalizeOptions::POST).unwrap();
        assert_eq!(decoded_dims(&out), (600, 400));
    }

    #[test]
    fn test_normalize_profile_preset() {
        let source = ImageSource::from_bytes(png_bytes(900, 1800), None);
        let out = normalize(&source, &NormalizeOptions::PROFILE).unwrap();
        assert_eq!((out.width, out.height), (400, 800));
    }

    #[test]
    fn test_normalize_flattens_alpha() {
        let img: ImageBuffer<Rgba<u8>, Vec<u8>> =
            ImageBuffer::from_fn(20, 10, |_, _| Rgba([10, 20, 30, 128]));
        let mut buf = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();

        let out = normalize(&ImageSource::from_bytes(buf, None), &NormalizeOptions::POST).unwrap();
        assert_eq!(decoded_dims(&out), (20, 10));
    }

    #[test]
    fn test_normalize_decode_error() {
        let source = ImageSource::from_bytes(b"definitely not pixels".to_vec(), Some("image/png"));
        assert!(matches!(
            normalize(&source, &NormalizeOptions::POST),
            Err(MediaError::Decode(_))
        ));
    }

    #[test]
    fn test_normalize_rejects_bad_quality() {
        let source = ImageSource::from_bytes(png_bytes(10, 10), None);
        let opts = NormalizeOptions {
            quality: 1.5,
            ..NormalizeOptions::POST
        };
        assert!(matches!(
            normalize(&source, &opts),
            Err(MediaError::InvalidQuality(_))
        ));
    }

    #[test]
    fn test_data_uri_prefix() {
        let out = normalize(
            &ImageSource::from_bytes(png_bytes(4, 4), None),
            &NormalizeOptions::PROFILE,
        )
        .unwrap();
        assert!(out.to_data_uri().starts_with("data:image/jpeg;base64,/9j/"));
    }

    #[tokio::test]
    async fn test_normalize_async_matches_sync() {
        let source = ImageSource::from_bytes(png_bytes(2400, 600), None);
        let out = normalize_async(source, NormalizeOptions::POST).await.unwrap();
        assert_eq!((out.width, out.height), (1200, 300));
    }
}
