//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::ImageReader` with format sniffing |
//! | Orientation | `kamadak-exif` tag read, `DynamicImage` rotate/flip |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` with quality |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::scaled_height;
use super::orientation::Orientation;
use super::params::{Quality, ThumbnailParams};
use crate::metadata;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and decode an image from disk. The format is sniffed from content,
/// so a misnamed extension still decodes.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

/// EXIF orientation of a file, `Normal` when there is no EXIF or no tag.
fn read_orientation(path: &Path) -> Orientation {
    metadata::read_exif(path)
        .ok()
        .and_then(|exif| metadata::orientation(&exif))
        .map(Orientation::from)
        .unwrap_or_default()
}

/// Encode as baseline JPEG at the given quality.
fn save_jpeg(img: &DynamicImage, path: &Path, quality: Quality) -> Result<(), BackendError> {
    let file = File::create(path).map_err(BackendError::Io)?;
    let writer = BufWriter::new(file);
    let encoder = JpegEncoder::new_with_quality(writer, quality.get());
    // JPEG has no alpha channel.
    DynamicImage::ImageRgb8(img.to_rgb8())
        .write_with_encoder(encoder)
        .map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {}", e)))
}

impl ImageBackend for RustBackend {
    fn thumbnail(&self, params: &ThumbnailParams) -> Result<Dimensions, BackendError> {
        let img = load_image(&params.source)?;
        let oriented = read_orientation(&params.source).apply(img);

        let width = params.width;
        let height = scaled_height((oriented.width(), oriented.height()), width);
        let resized = oriented.resize_exact(width, height, FilterType::Lanczos3);

        save_jpeg(&resized, &params.output, params.quality)?;
        Ok(Dimensions { width, height })
    }
}
