//! Image transformer - fit-within resize with graceful degradation
//!
//! `transform` never fails: decode or encode problems produce
//! [`TransformOutcome::Degraded`] carrying the original bytes and the reason.

use bytes::Bytes;
use pawprint_core::policy::mime_subtype;
use pawprint_core::UploadPolicy;

#[cfg(feature = "image")]
use image::{imageops::FilterType, DynamicImage, GenericImageView, ImageFormat};
#[cfg(feature = "image")]
use std::io::Cursor;

/// Transformation errors. Never surfaced to callers of `transform`.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Unsupported raster format: {0}")]
    UnsupportedFormat(String),
}

/// Result of a transformation attempt
#[derive(Debug, Clone)]
pub enum TransformOutcome {
    /// Downscaled and re-encoded
    Resized {
        data: Bytes,
        from: (u32, u32),
        to: (u32, u32),
    },
    /// Already within bounds (or not a raster); bytes untouched
    Unchanged { data: Bytes },
    /// Transformation failed; original bytes kept
    Degraded { data: Bytes, reason: String },
}

impl TransformOutcome {
    pub fn data(&self) -> &Bytes {
        match self {
            TransformOutcome::Resized { data, .. }
            | TransformOutcome::Unchanged { data }
            | TransformOutcome::Degraded { data, .. } => data,
        }
    }

    pub fn into_data(self) -> Bytes {
        match self {
            TransformOutcome::Resized { data, .. }
            | TransformOutcome::Unchanged { data }
            | TransformOutcome::Degraded { data, .. } => data,
        }
    }

    pub fn warning(&self) -> Option<&str> {
        match self {
            TransformOutcome::Degraded { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

/// Fit-within image transformer
#[derive(Debug, Clone, Copy)]
pub struct ImageTransformer {
    max_width: u32,
    max_height: u32,
    quality: f32,
}

impl ImageTransformer {
    pub fn new(max_width: u32, max_height: u32, quality: f32) -> Self {
        Self {
            max_width,
            max_height,
            quality,
        }
    }

    pub fn from_policy(policy: &UploadPolicy) -> Self {
        Self::new(policy.max_width, policy.max_height, policy.quality)
    }

    /// Target dimensions when `width`×`height` exceeds the box, `None` if it already fits.
    ///
    /// scale = min(max_width / width, max_height / height); each side is floored and
    /// kept at least one pixel.
    pub fn target_dimensions(&self, width: u32, height: u32) -> Option<(u32, u32)> {
        if width == 0 || height == 0 {
            return None;
        }
        if width <= self.max_width && height <= self.max_height {
            return None;
        }

        let scale = f64::min(
            self.max_width as f64 / width as f64,
            self.max_height as f64 / height as f64,
        );
        let new_width = ((width as f64 * scale).floor() as u32).max(1);
        let new_height = ((height as f64 * scale).floor() as u32).max(1);
        Some((new_width, new_height))
    }

    /// JPEG/WebP quality on the 1–100 scale
    pub fn encoder_quality(&self) -> u8 {
        (self.quality * 100.0).round().clamp(1.0, 100.0) as u8
    }

    /// Resize if needed. Never fails; see [`TransformOutcome`].
    pub fn transform(&self, data: Bytes, content_type: &str) -> TransformOutcome {
        let subtype = mime_subtype(content_type);
        if subtype == "svg" {
            // Vector images have no raster dimensions to bound
            return TransformOutcome::Unchanged { data };
        }

        match self.try_transform(&data, &subtype) {
            Ok(Some((resized, from, to))) => TransformOutcome::Resized {
                data: resized,
                from,
                to,
            },
            Ok(None) => TransformOutcome::Unchanged { data },
            Err(e) => TransformOutcome::Degraded {
                data,
                reason: e.to_string(),
            },
        }
    }

    /// Run [`transform`](Self::transform) off the async runtime
    pub async fn transform_blocking(self, data: Bytes, content_type: String) -> TransformOutcome {
        let fallback = data.clone();
        // Decode/encode is CPU-bound; run off the async pool to avoid blocking other tasks.
        match tokio::task::spawn_blocking(move || self.transform(data, &content_type)).await {
            Ok(outcome) => outcome,
            Err(e) => TransformOutcome::Degraded {
                data: fallback,
                reason: format!("transform task failed: {}", e),
            },
        }
    }

    #[cfg(feature = "image")]
    fn try_transform(
        &self,
        data: &[u8],
        subtype: &str,
    ) -> Result<Option<(Bytes, (u32, u32), (u32, u32))>, TransformError> {
        let format = Self::format_for_subtype(subtype)?;

        let (width, height) = image::ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| TransformError::Decode(e.to_string()))?
            .into_dimensions()
            .map_err(|e| TransformError::Decode(e.to_string()))?;

        let Some((target_width, target_height)) = self.target_dimensions(width, height) else {
            return Ok(None);
        };

        let img = image::ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| TransformError::Decode(e.to_string()))?
            .decode()
            .map_err(|e| TransformError::Decode(e.to_string()))?;

        let resized = img.resize_exact(target_width, target_height, FilterType::CatmullRom);
        let encoded = self.encode(&resized, format)?;

        tracing::debug!(
            from_width = width,
            from_height = height,
            to_width = target_width,
            to_height = target_height,
            size_bytes = encoded.len(),
            "Image resized"
        );

        Ok(Some((encoded, (width, height), resized.dimensions())))
    }

    #[cfg(not(feature = "image"))]
    fn try_transform(
        &self,
        _data: &[u8],
        _subtype: &str,
    ) -> Result<Option<(Bytes, (u32, u32), (u32, u32))>, TransformError> {
        Ok(None)
    }

    #[cfg(feature = "image")]
    fn format_for_subtype(subtype: &str) -> Result<ImageFormat, TransformError> {
        match subtype {
            "jpeg" | "jpg" | "pjpeg" => Ok(ImageFormat::Jpeg),
            "png" => Ok(ImageFormat::Png),
            "webp" => Ok(ImageFormat::WebP),
            "gif" => Ok(ImageFormat::Gif),
            other => Err(TransformError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Encode in the original format at the configured quality
    #[cfg(feature = "image")]
    fn encode(&self, img: &DynamicImage, format: ImageFormat) -> Result<Bytes, TransformError> {
        let (width, height) = img.dimensions();
        let mut buffer = Vec::with_capacity((width * height * 3) as usize / 4);

        match format {
            ImageFormat::Jpeg => {
                // JPEG has no alpha channel
                let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
                let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(
                    &mut buffer,
                    self.encoder_quality(),
                );
                rgb.write_with_encoder(encoder)
                    .map_err(|e| TransformError::Encode(e.to_string()))?;
            }
            ImageFormat::WebP => {
                let rgba = img.to_rgba8();
                let encoder = webp::Encoder::from_rgba(&rgba, width, height);
                let webp_data = encoder.encode(self.encoder_quality() as f32);
                buffer.extend_from_slice(&webp_data);
            }
            other => {
                let mut cursor = Cursor::new(&mut buffer);
                img.write_to(&mut cursor, other)
                    .map_err(|e| TransformError::Encode(e.to_string()))?;
            }
        }

        Ok(Bytes::from(buffer))
    }
}
