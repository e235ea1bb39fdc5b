//! Shared test utilities for the photoblog test suite.
//!
//! Provides EXIF builders, JPEG fixtures that carry a real EXIF block, and a
//! minimal site layout that the readers and the pipeline can run against.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let site = fixture_site();
//! write_photo(
//!     &site.path().join("photos/beach.jpg"),
//!     64,
//!     48,
//!     &[keyword_field("ok")],
//! );
//! ```

use exif::experimental::Writer;
use exif::{Exif, Field, In, Rational, Reader, Tag, Value};
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage};
use std::fs;
use std::io::Cursor;
use std::path::Path;
use tempfile::TempDir;

use crate::metadata::XP_KEYWORDS;

// =========================================================================
// EXIF builders
// =========================================================================

/// Serialize fields into a little-endian TIFF/EXIF blob.
pub fn exif_tiff(fields: &[Field]) -> Vec<u8> {
    let mut writer = Writer::new();
    for field in fields {
        writer.push_field(field);
    }
    let mut buf = Cursor::new(Vec::new());
    writer.write(&mut buf, true).unwrap();
    buf.into_inner()
}

/// Parse fields back through the real reader.
pub fn exif_from_fields(fields: Vec<Field>) -> Exif {
    Reader::new().read_raw(exif_tiff(&fields)).unwrap()
}

fn dms(value: f64) -> Vec<Rational> {
    let degrees = value.trunc();
    let minutes_full = (value - degrees) * 60.0;
    let minutes = minutes_full.trunc();
    let centiseconds = ((minutes_full - minutes) * 60.0 * 100.0).round();
    vec![
        Rational {
            num: degrees as u32,
            denom: 1,
        },
        Rational {
            num: minutes as u32,
            denom: 1,
        },
        Rational {
            num: centiseconds as u32,
            denom: 100,
        },
    ]
}

fn ascii(c: char) -> Value {
    Value::Ascii(vec![c.to_string().into_bytes()])
}

/// The four GPS fields for an unsigned `(degrees, hemisphere)` pair each.
pub fn gps_fields(latitude: (f64, char), longitude: (f64, char)) -> Vec<Field> {
    vec![
        Field {
            tag: Tag::GPSLatitudeRef,
            ifd_num: In::PRIMARY,
            value: ascii(latitude.1),
        },
        Field {
            tag: Tag::GPSLatitude,
            ifd_num: In::PRIMARY,
            value: Value::Rational(dms(latitude.0)),
        },
        Field {
            tag: Tag::GPSLongitudeRef,
            ifd_num: In::PRIMARY,
            value: ascii(longitude.1),
        },
        Field {
            tag: Tag::GPSLongitude,
            ifd_num: In::PRIMARY,
            value: Value::Rational(dms(longitude.0)),
        },
    ]
}

/// An `XPKeywords` field holding `keywords` as null-terminated UTF-16LE.
pub fn keyword_field(keywords: &str) -> Field {
    let mut bytes: Vec<u8> = keywords
        .encode_utf16()
        .flat_map(|unit| unit.to_le_bytes())
        .collect();
    bytes.extend_from_slice(&[0, 0]);
    Field {
        tag: XP_KEYWORDS,
        ifd_num: In::PRIMARY,
        value: Value::Byte(bytes),
    }
}

/// An `Orientation` field.
pub fn orientation_field(value: u16) -> Field {
    Field {
        tag: Tag::Orientation,
        ifd_num: In::PRIMARY,
        value: Value::Short(vec![value]),
    }
}

// =========================================================================
// Image fixtures
// =========================================================================

/// Encode a gradient JPEG of the given size.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut out = Vec::new();
    JpegEncoder::new(&mut out)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    out
}

/// Write a JPEG with an APP1 EXIF segment built from `fields`.
///
/// The segment goes right after SOI, where cameras put it.
pub fn write_photo(path: &Path, width: u32, height: u32, fields: &[Field]) {
    let jpeg = jpeg_bytes(width, height);
    let tiff = exif_tiff(fields);
    let segment_len = u16::try_from(2 + 6 + tiff.len()).unwrap();

    let mut out = Vec::with_capacity(jpeg.len() + tiff.len() + 10);
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&segment_len.to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(&tiff);
    out.extend_from_slice(&jpeg[2..]);
    fs::write(path, out).unwrap();
}

/// Write a JPEG without any EXIF segment.
pub fn write_plain_jpeg(path: &Path, width: u32, height: u32) {
    fs::write(path, jpeg_bytes(width, height)).unwrap();
}

// =========================================================================
// Site fixtures
// =========================================================================

pub const INDEX_TEMPLATE: &str =
    r#"<html><head><link rel="icon" href="{{ embed_svg("assets/favicon.svg") }}"></head></html>"#;
pub const BLOG_TEMPLATE: &str =
    r#"{% for a in articles %}<a href="/blog/{{ a.slug }}">{{ a.title }}</a>{% endfor %}"#;
pub const PHOTOS_TEMPLATE: &str =
    r#"{% for p in photos %}<img src="/thumbnails/{{ p.name }}" alt="{{ p.title }}">{% endfor %}"#;
pub const ARTICLE_TEMPLATE: &str = "<h1>{{ title }}</h1>\n{{ html_body }}";

pub const FAVICON_SVG: &str = "<svg xmlns=\"http://www.w3.org/2000/svg\">\n<circle fill=\"#ff0000\" r=\"4\"/>\n</svg>\n";

/// Front matter plus body for an entry file.
pub fn entry_source(title: &str, tags: &[&str], body: &str) -> String {
    let tags = tags
        .iter()
        .map(|t| format!("\"{t}\""))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "---\ntitle: \"{title}\"\nsummary: \"About {title}\"\ndate: \"2023-01-01\"\ntags: [{tags}]\n---\n{body}"
    )
}

/// Create the conventional layout with templates and a favicon, but no
/// entries and no photos.
pub fn fixture_site() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    for dir in ["entries", "photos", "templates", "assets"] {
        fs::create_dir_all(root.join(dir)).unwrap();
    }
    fs::write(root.join("templates/index.html"), INDEX_TEMPLATE).unwrap();
    fs::write(root.join("templates/blog.html"), BLOG_TEMPLATE).unwrap();
    fs::write(root.join("templates/photos.html"), PHOTOS_TEMPLATE).unwrap();
    fs::write(root.join("templates/article.html"), ARTICLE_TEMPLATE).unwrap();
    fs::write(root.join("assets/favicon.svg"), FAVICON_SVG).unwrap();
    tmp
}

/// [`fixture_site`] with one entry and two photos.
pub fn populated_site() -> TempDir {
    let tmp = fixture_site();
    let root = tmp.path();
    fs::write(
        root.join("entries/2023-01-01-first.md"),
        entry_source("First", &["misc"], "Hello :wave:\n"),
    )
    .unwrap();
    let mut fields = gps_fields((40.5, 'N'), (3.75, 'W'));
    fields.push(keyword_field("ok"));
    write_photo(&root.join("photos/a.jpg"), 80, 60, &fields);
    write_photo(
        &root.join("photos/b.jpg"),
        60,
        80,
        &[keyword_field("actually good")],
    );
    fs::write(root.join("assets/robots.txt"), "User-agent: *\n").unwrap();
    tmp
}
