//! Thumbnail pixel work.
//!
//! A thumbnail is the original, turned upright according to its EXIF
//! `Orientation`, resized to a fixed width with Lanczos3 and written as JPEG.
//!
//! - [`scaled_height`]: aspect-ratio math, no I/O
//! - [`ThumbnailParams`] / [`Quality`]: one job's request
//! - [`Orientation`]: EXIF values 1-8 and the rotate/flip each implies
//! - [`ImageBackend`]: the trait the scheduler calls; [`RustBackend`]
//!   implements it with the `image` crate

pub mod backend;
mod calculations;
pub mod orientation;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::scaled_height;
pub use orientation::Orientation;
pub use params::{Quality, ThumbnailParams};
pub use rust_backend::RustBackend;
