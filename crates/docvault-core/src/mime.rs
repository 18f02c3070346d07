//! Upload type policy and derived-artifact predicates.
//!
//! Two independent allow-lists gate uploads: one on the file-name extension,
//! one on the declared mime type. They are never cross-checked against each
//! other or against the bytes.

use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::path::Path;

use crate::defaults::MAX_FILE_SIZE_BYTES;
use crate::error::{Error, Result};

/// Accepted declared mime types.
static ALLOWED_MIME_TYPES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // Documents
        "application/pdf",
        "application/msword",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "application/vnd.ms-excel",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "application/vnd.ms-powerpoint",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "text/plain",
        "text/csv",
        "application/rtf",
        // Images
        "image/jpeg",
        "image/png",
        "image/gif",
        "image/webp",
        "image/svg+xml",
        "image/bmp",
        "image/tiff",
        // Video
        "video/mp4",
        "video/mpeg",
        "video/quicktime",
        "video/x-msvideo",
        "video/x-matroska",
        "video/webm",
    ]
    .into_iter()
    .collect()
});

/// Accepted file-name extensions, lower-case with the leading dot.
static ALLOWED_EXTENSIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx", ".txt", ".csv", ".rtf",
        ".jpg", ".jpeg", ".png", ".gif", ".webp", ".svg", ".bmp", ".tiff", ".tif", ".mp4",
        ".mpeg", ".mpg", ".mov", ".avi", ".mkv", ".webm",
    ]
    .into_iter()
    .collect()
});

/// Office formats the conversion service can render to PDF.
const OFFICE_TYPES: &[&str] = &[
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    "application/msword",
    "application/vnd.ms-excel",
    "application/vnd.ms-powerpoint",
    "application/vnd.oasis.opendocument.text",
    "application/vnd.oasis.opendocument.spreadsheet",
    "application/vnd.oasis.opendocument.presentation",
    "application/rtf",
    "text/rtf",
];

/// Additional types the extraction service handles beyond the office set.
const EXTRA_EXTRACTABLE_TYPES: &[&str] = &[
    "text/html",
    "application/pdf",
    "text/plain",
    "text/csv",
    "image/jpeg",
    "image/png",
    "image/tiff",
];

fn contains_ignore_case(set: &[&str], mime_type: &str) -> bool {
    set.iter().any(|m| m.eq_ignore_ascii_case(mime_type.trim()))
}

/// Lower-cased extension of `name` including the dot, or `""` if none.
pub fn extension_of(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default()
}

pub fn is_allowed_extension(ext: &str) -> bool {
    ALLOWED_EXTENSIONS.contains(ext.to_lowercase().as_str())
}

pub fn is_allowed_mime_type(mime_type: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(mime_type.trim().to_lowercase().as_str())
}

/// Preview applicability: office, OpenDocument, rich-text or HTML types.
pub fn is_convertible_to_pdf(mime_type: &str) -> bool {
    contains_ignore_case(OFFICE_TYPES, mime_type)
        || mime_type.trim().eq_ignore_ascii_case("text/html")
}

/// Whether the conversion service actually renders this type. HTML passes
/// the preview predicate but is rejected at conversion time.
pub fn is_office_document(mime_type: &str) -> bool {
    contains_ignore_case(OFFICE_TYPES, mime_type)
}

/// Extraction applicability: the convertible set plus PDF, plain text,
/// CSV and OCR-capable image types.
pub fn is_extractable_text(mime_type: &str) -> bool {
    is_convertible_to_pdf(mime_type) || contains_ignore_case(EXTRA_EXTRACTABLE_TYPES, mime_type)
}

/// Validate an upload's size, extension and declared type.
///
/// Returns the normalized extension on success.
pub fn validate_upload(name: &str, mime_type: &str, size: u64) -> Result<String> {
    if size == 0 {
        return Err(Error::Validation("file is empty".to_string()));
    }
    if size > MAX_FILE_SIZE_BYTES {
        return Err(Error::Validation(format!(
            "file size {} exceeds maximum of {} bytes",
            size, MAX_FILE_SIZE_BYTES
        )));
    }

    let ext = extension_of(name);
    if !is_allowed_extension(&ext) {
        return Err(Error::Validation(format!(
            "file extension '{}' is not allowed",
            ext
        )));
    }

    if !is_allowed_mime_type(mime_type) {
        return Err(Error::Validation(format!(
            "mime type '{}' is not allowed",
            mime_type
        )));
    }

    Ok(ext)
}
