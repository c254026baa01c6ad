//! Validation of uploaded media files.
//!
//! The recorded MIME type comes from the bytes, not the client. It must match
//! the declared media type, and the payload must fit the per-type size limit.

use crate::error::{Error, Result};
use crate::models::MediaType;

/// Fallback MIME type when nothing better is known.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Validate MIME type format per RFC 2045 (type/subtype).
///
/// Returns `true` if the format is valid: exactly one `/`, both parts non-empty,
/// no whitespace, and only printable ASCII characters.
pub fn is_valid_mime_type(mime: &str) -> bool {
    let mut parts = mime.split('/');
    let (Some(media_type), Some(subtype), None) = (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    if media_type.is_empty() || subtype.is_empty() {
        return false;
    }
    let is_token_char = |c: char| -> bool {
        c.is_ascii_alphanumeric() || matches!(c, '!' | '#' | '$' | '&' | '-' | '^' | '_' | '.' | '+')
    };
    media_type.chars().all(is_token_char) && subtype.chars().all(is_token_char)
}

/// Pick the MIME type to record for an upload.
///
/// Magic bytes win over the declared type. A declared image, video or audio
/// type the bytes do not back up becomes `application/octet-stream`, so
/// formats without a signature (SVG among them) never pass as media.
pub fn resolve_mime_type(declared: Option<&str>, data: &[u8]) -> String {
    if let Some(kind) = infer::get(data) {
        return kind.mime_type().to_string();
    }
    match declared.map(str::trim) {
        Some(declared) if is_valid_mime_type(declared) && !claims_binary_media(declared) => {
            declared.to_ascii_lowercase()
        }
        _ => OCTET_STREAM.to_string(),
    }
}

fn claims_binary_media(mime: &str) -> bool {
    let mime = mime.to_ascii_lowercase();
    ["image/", "video/", "audio/"]
        .iter()
        .any(|prefix| mime.starts_with(prefix))
}

/// Whether stored bytes of this type may be rendered by the browser.
///
/// Anything else is served as a download.
pub fn is_inline_safe(mime: &str) -> bool {
    matches!(
        mime,
        "image/png"
            | "image/jpeg"
            | "image/gif"
            | "image/webp"
            | "image/bmp"
            | "image/heif"
            | "image/avif"
            | "video/mp4"
            | "video/webm"
            | "video/quicktime"
            | "video/x-m4v"
    )
}

/// Check that a file is acceptable as a stored media item of `media_type`.
pub fn validate_media(media_type: MediaType, mime_type: &str, size: usize) -> Result<()> {
    if size == 0 {
        return Err(Error::InvalidInput("File is empty".to_string()));
    }
    if !mime_type.starts_with(media_type.mime_prefix()) {
        return Err(Error::InvalidInput(format!(
            "File type {} does not match media type {}",
            mime_type, media_type
        )));
    }
    let max = media_type.max_bytes();
    if size > max {
        return Err(Error::InvalidInput(format!(
            "File exceeds the {} size limit of {} bytes",
            media_type, max
        )));
    }
    Ok(())
}

/// Sanitize a client-supplied filename for storage in metadata.
pub fn sanitize_filename(filename: &str) -> String {
    // Remove path components
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);

    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '|' | '?' | '*' | '\0' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let sanitized = sanitized.trim();
    if sanitized.is_empty() {
        return "unnamed_file".to_string();
    }
    sanitized.chars().take(255).collect()
}
