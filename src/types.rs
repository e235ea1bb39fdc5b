//! Records shared by the readers, the renderer and the sitemap builder.
//!
//! Both types are built once per run and never mutated afterwards. They are
//! `Serialize` so templates can reach every field by name.

use serde::Serialize;

/// Longitude/latitude value used when a photo carries no usable GPS location.
pub const NO_LOCATION: f64 = -1.0;

/// A photo from the photo directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Photo {
    /// File basename, unique within the photo directory.
    pub name: String,
    /// Display title. Currently the same as `name`.
    pub title: String,
    /// Keyword tags from the EXIF `XPKeywords` field.
    pub tags: Vec<String>,
    /// Decimal degrees, [`NO_LOCATION`] when unknown.
    pub longitude: f64,
    /// Decimal degrees, [`NO_LOCATION`] when unknown.
    pub latitude: f64,
}

impl Photo {
    /// Whether the photo has a decoded GPS location.
    pub fn has_location(&self) -> bool {
        self.longitude != NO_LOCATION || self.latitude != NO_LOCATION
    }
}

/// A blog entry rendered from a markdown file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Article {
    /// File name without extension; used in `/blog/{slug}`.
    pub slug: String,
    pub tags: Vec<String>,
    pub title: String,
    pub summary: String,
    /// Opaque date text from the front matter.
    pub date: String,
    /// Markdown body rendered to HTML.
    pub html_body: String,
}
