//! Image capture dates from EXIF tags (kamadak-exif).

use super::MetadataError;
use chrono::NaiveDateTime;
use exif::{Exif, In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Read the capture date of an image.
///
/// `DateTimeOriginal` (when the shutter fired) wins; `DateTime` (last
/// edit) is only consulted when the original is absent or unparsable.
/// A garbled `DateTimeOriginal` therefore still yields an embedded date
/// whenever `DateTime` parses; the file only falls through to its
/// modification time when neither tag does.
pub fn read_exif_date(path: &Path) -> Result<NaiveDateTime, MetadataError> {
    let file = File::open(path).map_err(|source| MetadataError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = BufReader::new(file);
    let exif = Reader::new()
        .read_from_container(&mut reader)
        .map_err(|e| MetadataError::Container(e.to_string()))?;

    match tag_datetime(&exif, Tag::DateTimeOriginal) {
        Ok(date) => Ok(date),
        Err(original) => tag_datetime(&exif, Tag::DateTime).map_err(|_| original),
    }
}

fn tag_datetime(exif: &Exif, tag: Tag) -> Result<NaiveDateTime, MetadataError> {
    let field = exif
        .get_field(tag, In::PRIMARY)
        .ok_or(MetadataError::MissingTag(tag_name(tag)))?;

    match field.value {
        Value::Ascii(ref strings) => {
            let bytes = strings
                .first()
                .ok_or(MetadataError::MissingTag(tag_name(tag)))?;
            let text = String::from_utf8_lossy(bytes);
            parse_exif_datetime(&text).ok_or_else(|| MetadataError::Unparsable(text.into_owned()))
        }
        _ => Err(MetadataError::Unparsable(
            field.display_value().to_string(),
        )),
    }
}

fn tag_name(tag: Tag) -> &'static str {
    if tag == Tag::DateTimeOriginal {
        "DateTimeOriginal"
    } else {
        "DateTime"
    }
}

/// Parse an EXIF timestamp (`2022:01:05 08:30:00`).
///
/// Trailing NULs and padding written by some cameras are ignored.
pub fn parse_exif_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    NaiveDateTime::parse_from_str(s, EXIF_DATETIME_FORMAT).ok()
}
