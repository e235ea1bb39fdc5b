//! EXIF metadata extraction.
//!
//! Photos carry three pieces of metadata the site uses:
//!
//! - **Location**: `GPSLatitude`/`GPSLongitude` as degree/minute/second
//!   rational triples plus the `GPSLatitudeRef`/`GPSLongitudeRef` hemisphere
//!   letters. Southern latitudes and western longitudes come out negative.
//!
//! - **Keywords**: the Windows `XPKeywords` field (`0x9C9E`), a UTF-16LE
//!   string with `;` between keywords. Lightroom and the Windows photo
//!   viewer both write it.
//!
//! - **Orientation**: the `Orientation` tag (1-8), applied to pixels when
//!   thumbnails are generated.
//!
//! Everything here works on a parsed [`exif::Exif`] so it can be tested
//! without image files.

use exif::{Context, Exif, In, Rational, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use thiserror::Error;

/// The Windows `XPKeywords` tag. kamadak-exif has no constant for it.
pub const XP_KEYWORDS: Tag = Tag(Context::Tiff, 0x9c9e);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoordinateError {
    #[error("expected degrees, minutes and seconds, got {0} component(s)")]
    ComponentCount(usize),
    #[error("coordinate component {index} has a zero denominator")]
    ZeroDenominator { index: usize },
}

/// Convert an EXIF degrees/minutes/seconds triple to decimal degrees.
///
/// The result is unsigned; the hemisphere lives in a separate tag.
///
/// ```
/// # use photoblog::metadata::decode_dms;
/// use exif::Rational;
/// let parts = [
///     Rational { num: 40, denom: 1 },
///     Rational { num: 30, denom: 1 },
///     Rational { num: 0, denom: 1 },
/// ];
/// assert_eq!(decode_dms(&parts).unwrap(), 40.5);
/// ```
pub fn decode_dms(parts: &[Rational]) -> Result<f64, CoordinateError> {
    let [degrees, minutes, seconds] = parts else {
        return Err(CoordinateError::ComponentCount(parts.len()));
    };
    if let Some(index) = parts.iter().position(|r| r.denom == 0) {
        return Err(CoordinateError::ZeroDenominator { index });
    }
    Ok(degrees.to_f64() + minutes.to_f64() / 60.0 + seconds.to_f64() / 3600.0)
}

/// Read the EXIF block of an image file.
///
/// Fails when the file cannot be opened or carries no decodable EXIF data.
pub fn read_exif(path: &Path) -> Result<Exif, exif::Error> {
    let file = File::open(path).map_err(exif::Error::Io)?;
    Reader::new().read_from_container(&mut BufReader::new(file))
}

/// Signed `(latitude, longitude)` in decimal degrees.
///
/// `None` when any of the four GPS tags is missing or malformed.
pub fn gps_location(exif: &Exif) -> Option<(f64, f64)> {
    let latitude = signed_coordinate(exif, Tag::GPSLatitude, Tag::GPSLatitudeRef, b'S')?;
    let longitude = signed_coordinate(exif, Tag::GPSLongitude, Tag::GPSLongitudeRef, b'W')?;
    Some((latitude, longitude))
}

fn signed_coordinate(exif: &Exif, value_tag: Tag, ref_tag: Tag, negative: u8) -> Option<f64> {
    let degrees = match &exif.get_field(value_tag, In::PRIMARY)?.value {
        Value::Rational(parts) => match decode_dms(parts) {
            Ok(degrees) => degrees,
            Err(e) => {
                log::debug!("ignoring {value_tag}: {e}");
                return None;
            }
        },
        _ => return None,
    };
    let hemisphere = match &exif.get_field(ref_tag, In::PRIMARY)?.value {
        Value::Ascii(strings) => *strings.first()?.first()?,
        _ => return None,
    };
    if hemisphere.eq_ignore_ascii_case(&negative) {
        Some(-degrees)
    } else {
        Some(degrees)
    }
}

/// Keyword tags from `XPKeywords`, in stored order. Empty when absent.
pub fn keywords(exif: &Exif) -> Vec<String> {
    let Some(field) = exif.get_field(XP_KEYWORDS, In::PRIMARY) else {
        return Vec::new();
    };
    let bytes = match &field.value {
        Value::Byte(bytes) => bytes,
        Value::Undefined(bytes, _) => bytes,
        _ => return Vec::new(),
    };
    split_keywords(&decode_utf16le(bytes))
}

fn decode_utf16le(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

/// Split a `;`-separated keyword string. Null padding and empty entries are
/// dropped, surrounding whitespace trimmed.
pub fn split_keywords(raw: &str) -> Vec<String> {
    raw.replace('\0', "")
        .split(';')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

/// Raw `Orientation` tag value, if present.
pub fn orientation(exif: &Exif) -> Option<u32> {
    exif.get_field(Tag::Orientation, In::PRIMARY)?
        .value
        .get_uint(0)
}
