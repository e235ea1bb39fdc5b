//! Photo reader.
//!
//! Every regular file in the photos directory is one [`Photo`]. For each
//! file the reader:
//!
//! 1. Rejects it when larger than `photos.max_file_size`.
//! 2. Decodes the EXIF block. A file without EXIF is an error.
//! 3. Reads the GPS location (sentinel `-1, -1` when absent or malformed)
//!    and the `XPKeywords` tags.
//!
//! The result is ordered by priority tag: photos tagged with the first entry
//! of `photos.sort_priority` come first, then the second, then everything
//! else. File name order is kept within a rank.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::PhotosConfig;
use crate::listing::{file_name, list_files};
use crate::metadata;
use crate::types::{NO_LOCATION, Photo};

#[derive(Error, Debug)]
pub enum PhotoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{name}: file is {size} bytes, larger than the {max} byte limit")]
    TooLarge { name: String, size: u64, max: u64 },
    #[error("{}: cannot read EXIF data: {source}", .path.display())]
    Exif {
        path: PathBuf,
        source: exif::Error,
    },
}

/// Reader settings, usually taken from `[photos]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoOptions {
    pub max_file_size: u64,
    pub sort_priority: Vec<String>,
}

impl From<&PhotosConfig> for PhotoOptions {
    fn from(config: &PhotosConfig) -> Self {
        Self {
            max_file_size: config.max_file_size,
            sort_priority: config.sort_priority.clone(),
        }
    }
}

impl Default for PhotoOptions {
    fn default() -> Self {
        Self::from(&PhotosConfig::default())
    }
}

/// Reject a file larger than `max` bytes. Exactly `max` is accepted.
pub fn check_size(name: &str, size: u64, max: u64) -> Result<(), PhotoError> {
    if size > max {
        return Err(PhotoError::TooLarge {
            name: name.to_string(),
            size,
            max,
        });
    }
    Ok(())
}

/// Position of the first priority tag the photo carries, or
/// `priority.len()` when it carries none.
pub fn priority_rank(tags: &[String], priority: &[String]) -> usize {
    priority
        .iter()
        .position(|p| tags.contains(p))
        .unwrap_or(priority.len())
}

/// Stable sort by [`priority_rank`].
pub fn sort_by_priority(photos: &mut [Photo], priority: &[String]) {
    photos.sort_by_key(|photo| priority_rank(&photo.tags, priority));
}

/// Build the record for one photo file.
pub fn read_photo(path: &Path, options: &PhotoOptions) -> Result<Photo, PhotoError> {
    let name = file_name(path);
    let size = fs::metadata(path)?.len();
    check_size(&name, size, options.max_file_size)?;

    let exif = metadata::read_exif(path).map_err(|source| PhotoError::Exif {
        path: path.to_path_buf(),
        source,
    })?;

    let (latitude, longitude) = metadata::gps_location(&exif).unwrap_or_else(|| {
        log::debug!("{name}: no usable GPS location");
        (NO_LOCATION, NO_LOCATION)
    });

    Ok(Photo {
        title: name.clone(),
        name,
        tags: metadata::keywords(&exif),
        longitude,
        latitude,
    })
}

/// Read every photo in `dir`, sorted by priority tag.
pub fn read_photos(dir: &Path, options: &PhotoOptions) -> Result<Vec<Photo>, PhotoError> {
    let mut photos = Vec::new();
    for path in list_files(dir)? {
        photos.push(read_photo(&path, options)?);
    }
    sort_by_priority(&mut photos, &options.sort_priority);
    Ok(photos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{gps_fields, keyword_field, write_photo, write_plain_jpeg};
    use tempfile::TempDir;

    fn photo(name: &str, tags: &[&str]) -> Photo {
        Photo {
            name: name.to_string(),
            title: name.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            longitude: NO_LOCATION,
            latitude: NO_LOCATION,
        }
    }

    fn names(photos: &[Photo]) -> Vec<&str> {
        photos.iter().map(|p| p.name.as_str()).collect()
    }

    // =========================================================================
    // Size limit
    // =========================================================================

    #[test]
    fn size_at_limit_accepted() {
        assert!(check_size("a.jpg", 26_214_400, 26_214_400).is_ok());
    }

    #[test]
    fn size_one_byte_over_rejected() {
        let err = check_size("a.jpg", 26_214_401, 26_214_400).unwrap_err();
        assert!(matches!(err, PhotoError::TooLarge { size: 26_214_401, .. }));
        assert!(err.to_string().starts_with("a.jpg: "));
    }

    #[test]
    fn oversized_file_aborts_read() {
        let tmp = TempDir::new().unwrap();
        write_photo(&tmp.path().join("a.jpg"), 16, 16, &[keyword_field("ok")]);
        let size = fs::metadata(tmp.path().join("a.jpg")).unwrap().len();

        let options = PhotoOptions {
            max_file_size: size - 1,
            ..PhotoOptions::default()
        };
        let err = read_photos(tmp.path(), &options).unwrap_err();
        assert!(matches!(err, PhotoError::TooLarge { .. }));

        let options = PhotoOptions {
            max_file_size: size,
            ..PhotoOptions::default()
        };
        assert_eq!(read_photos(tmp.path(), &options).unwrap().len(), 1);
    }

    // =========================================================================
    // Priority sort
    // =========================================================================

    #[test]
    fn priority_sort_orders_by_first_matching_tag() {
        let mut photos = vec![
            photo("A", &["x"]),
            photo("B", &["ok"]),
            photo("C", &["actually good"]),
        ];
        sort_by_priority(&mut photos, &PhotoOptions::default().sort_priority);
        assert_eq!(names(&photos), vec!["C", "B", "A"]);
    }

    #[test]
    fn priority_sort_is_stable() {
        let mut photos = vec![
            photo("a", &[]),
            photo("b", &["ok"]),
            photo("c", &[]),
            photo("d", &["ok"]),
        ];
        sort_by_priority(&mut photos, &PhotoOptions::default().sort_priority);
        assert_eq!(names(&photos), vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn priority_rank_uses_highest_priority_tag() {
        let priority = PhotoOptions::default().sort_priority;
        let tags = vec!["ok".to_string(), "actually good".to_string()];
        assert_eq!(priority_rank(&tags, &priority), 0);
        assert_eq!(priority_rank(&[], &priority), 2);
    }

    // =========================================================================
    // read_photos
    // =========================================================================

    #[test]
    fn read_photo_extracts_location_and_tags() {
        let tmp = TempDir::new().unwrap();
        let mut fields = gps_fields((40.5, 'N'), (3.75, 'W'));
        fields.push(keyword_field("street;ok"));
        write_photo(&tmp.path().join("a.jpg"), 32, 24, &fields);

        let photos = read_photos(tmp.path(), &PhotoOptions::default()).unwrap();
        assert_eq!(
            photos,
            vec![Photo {
                name: "a.jpg".to_string(),
                title: "a.jpg".to_string(),
                tags: vec!["street".to_string(), "ok".to_string()],
                longitude: -3.75,
                latitude: 40.5,
            }]
        );
    }

    #[test]
    fn photo_without_gps_gets_sentinel() {
        let tmp = TempDir::new().unwrap();
        write_photo(&tmp.path().join("a.jpg"), 16, 16, &[keyword_field("ok")]);

        let photos = read_photos(tmp.path(), &PhotoOptions::default()).unwrap();
        assert_eq!(photos[0].latitude, NO_LOCATION);
        assert_eq!(photos[0].longitude, NO_LOCATION);
        assert!(!photos[0].has_location());
    }

    #[test]
    fn photo_without_exif_is_an_error() {
        let tmp = TempDir::new().unwrap();
        write_plain_jpeg(&tmp.path().join("plain.jpg"), 16, 16);

        let err = read_photos(tmp.path(), &PhotoOptions::default()).unwrap_err();
        assert!(matches!(err, PhotoError::Exif { .. }));
    }

    #[test]
    fn read_photos_sorts_by_priority_then_name() {
        let tmp = TempDir::new().unwrap();
        write_photo(&tmp.path().join("a.jpg"), 16, 16, &[keyword_field("x")]);
        write_photo(&tmp.path().join("b.jpg"), 16, 16, &[keyword_field("ok")]);
        write_photo(
            &tmp.path().join("c.jpg"),
            16,
            16,
            &[keyword_field("actually good")],
        );

        let photos = read_photos(tmp.path(), &PhotoOptions::default()).unwrap();
        assert_eq!(names(&photos), vec!["c.jpg", "b.jpg", "a.jpg"]);
    }

    #[test]
    fn read_photos_empty_directory() {
        let tmp = TempDir::new().unwrap();
        assert!(
            read_photos(tmp.path(), &PhotoOptions::default())
                .unwrap()
                .is_empty()
        );
    }
}
