use super::ImageService;
use crate::{Error, Result};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;

pub const DEFAULT_QUALITY: f32 = 0.5;
pub const DEFAULT_MAX_WIDTH: u32 = 1024;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressionSettings {
    /// JPEG quality in `(0.0, 1.0]`.
    pub quality: f32,
    pub max_width: u32,
}

impl Default for CompressionSettings {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            max_width: DEFAULT_MAX_WIDTH,
        }
    }
}

impl CompressionSettings {
    fn jpeg_quality(&self) -> Result<u8> {
        if !(self.quality > 0.0 && self.quality <= 1.0) {
            return Err(Error::Validation(format!(
                "compression quality must be in (0, 1], got {}",
                self.quality
            )));
        }
        if self.max_width == 0 {
            return Err(Error::Validation("max width must be positive".to_string()));
        }
        Ok(((self.quality * 100.0).round() as u8).max(1))
    }
}

/// Downscales to `max_width` (keeping aspect ratio) and re-encodes as JPEG.
pub struct ImageCompressor {
    settings: CompressionSettings,
}

impl ImageCompressor {
    pub fn new(settings: CompressionSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> CompressionSettings {
        self.settings
    }

    fn resize(&self, image: DynamicImage) -> DynamicImage {
        let (width, height) = (image.width(), image.height());
        if width <= self.settings.max_width {
            return image;
        }

        let scale = self.settings.max_width as f64 / width as f64;
        let new_height = ((height as f64 * scale).round() as u32).max(1);
        image.resize_exact(self.settings.max_width, new_height, FilterType::Triangle)
    }
}

impl Default for ImageCompressor {
    fn default() -> Self {
        Self::new(CompressionSettings::default())
    }
}

impl ImageService for ImageCompressor {
    fn compress(&self, image_data: &[u8]) -> Result<Vec<u8>> {
        if image_data.is_empty() {
            return Err(Error::Encoding("image data is empty".to_string()));
        }
        let quality = self.settings.jpeg_quality()?;

        let image = image::load_from_memory(image_data)
            .map_err(|e| Error::Encoding(format!("failed to decode image: {}", e)))?;
        let original = (image.width(), image.height());

        // JPEG has no alpha channel
        let resized = DynamicImage::ImageRgb8(self.resize(image).to_rgb8());

        let mut bytes = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut bytes, quality);
        resized
            .write_with_encoder(encoder)
            .map_err(|e| Error::Encoding(format!("failed to encode JPEG: {}", e)))?;

        tracing::debug!(
            "Compressed {}x{} image ({} bytes) to {}x{} JPEG ({} bytes, quality {})",
            original.0,
            original.1,
            image_data.len(),
            resized.width(),
            resized.height(),
            bytes.len(),
            quality
        );

        Ok(bytes)
    }
}
