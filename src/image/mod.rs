//! Image compression ahead of upload
//!
//! Camera captures are far larger than the model needs. They are scaled down
//! to a bounded width and re-encoded as JPEG before being embedded in the
//! request.

pub mod compressor;

pub use compressor::{CompressionSettings, ImageCompressor};

use crate::Result;

pub trait ImageService: Send + Sync {
    fn compress(&self, image_data: &[u8]) -> Result<Vec<u8>>;
}
