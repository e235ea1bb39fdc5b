//! Thumbnail generation.
//!
//! One job per photo: decode the original, undo its EXIF orientation, resize
//! to a fixed width and write a JPEG to `thumbnails/{name}`. Jobs run on a
//! dedicated rayon pool bounded by `processing.max_processes` (never more
//! than the CPU count).
//!
//! Every job runs to completion before the result is decided. Failures are
//! collected and reported together, so a broken file does not hide the
//! others and no job is cut off halfway through writing.

use std::path::Path;
use std::sync::mpsc::Sender;

use rayon::prelude::*;
use thiserror::Error;

use crate::config::{ProcessingConfig, ThumbnailsConfig, effective_threads};
use crate::imaging::{BackendError, Dimensions, ImageBackend, Quality, ThumbnailParams};
use crate::pipeline::BuildEvent;
use crate::types::Photo;

/// A failed thumbnail job.
#[derive(Debug)]
pub struct ThumbnailFailure {
    pub name: String,
    pub error: BackendError,
}

#[derive(Error, Debug)]
pub enum ThumbnailError {
    #[error("Failed to start thumbnail workers: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
    #[error("{} thumbnail(s) failed:\n{}", .0.len(), format_failures(.0))]
    Failed(Vec<ThumbnailFailure>),
}

fn format_failures(failures: &[ThumbnailFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("  {}: {}", f.name, f.error))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Size, quality and parallelism of a thumbnail run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailSettings {
    pub width: u32,
    pub quality: Quality,
    pub workers: usize,
}

impl ThumbnailSettings {
    pub fn from_config(thumbnails: &ThumbnailsConfig, processing: &ProcessingConfig) -> Self {
        Self {
            width: thumbnails.width,
            quality: Quality::new(thumbnails.quality),
            workers: effective_threads(processing),
        }
    }
}

/// A written thumbnail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub name: String,
    pub dimensions: Dimensions,
}

/// Generate a thumbnail for every photo.
///
/// Results come back in `photos` order. Progress events are sent as jobs
/// finish, in completion order.
pub fn generate_thumbnails(
    backend: &impl ImageBackend,
    photos: &[Photo],
    photos_dir: &Path,
    thumbs_dir: &Path,
    settings: &ThumbnailSettings,
    events: Option<&Sender<BuildEvent>>,
) -> Result<Vec<Thumbnail>, ThumbnailError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(settings.workers.max(1))
        .build()?;
    log::debug!(
        "generating {} thumbnails on {} workers",
        photos.len(),
        pool.current_num_threads()
    );

    let results: Vec<Result<Thumbnail, ThumbnailFailure>> = pool.install(|| {
        photos
            .par_iter()
            .map(|photo| {
                let params = ThumbnailParams {
                    source: photos_dir.join(&photo.name),
                    output: thumbs_dir.join(&photo.name),
                    width: settings.width,
                    quality: settings.quality,
                };
                match backend.thumbnail(&params) {
                    Ok(dimensions) => {
                        if let Some(tx) = events {
                            tx.send(BuildEvent::ThumbnailWritten {
                                name: photo.name.clone(),
                                width: dimensions.width,
                                height: dimensions.height,
                            })
                            .ok();
                        }
                        Ok(Thumbnail {
                            name: photo.name.clone(),
                            dimensions,
                        })
                    }
                    Err(error) => {
                        log::warn!("thumbnail for {} failed: {error}", photo.name);
                        Err(ThumbnailFailure {
                            name: photo.name.clone(),
                            error,
                        })
                    }
                }
            })
            .collect()
    });

    let mut written = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for result in results {
        match result {
            Ok(thumbnail) => written.push(thumbnail),
            Err(failure) => failures.push(failure),
        }
    }
    if !failures.is_empty() {
        return Err(ThumbnailError::Failed(failures));
    }
    Ok(written)
}
