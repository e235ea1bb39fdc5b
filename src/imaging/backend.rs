//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the one seam between thumbnail scheduling
//! and pixel work. The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate; tests use a recording `MockBackend`.

use super::params::ThumbnailParams;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Pixel dimensions of a written image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
///
/// `Sync` because thumbnails are generated from a rayon pool sharing one
/// backend.
pub trait ImageBackend: Sync {
    /// Decode, orient, resize and encode one thumbnail. Returns the
    /// dimensions actually written.
    fn thumbnail(&self, params: &ThumbnailParams) -> Result<Dimensions, BackendError>;
}
