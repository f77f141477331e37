//! Content type detection from leading magic bytes.

/// Bytes read from the head of a blob to identify its format.
pub(crate) const SNIFF_LEN: usize = 16;

pub(crate) const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Detect an image content type from the first bytes of a blob.
pub(crate) fn content_type(head: &[u8]) -> &'static str {
    // JPEG: FF D8 FF
    if head.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return "image/jpeg";
    }

    // PNG: 89 50 4E 47 0D 0A 1A 0A
    if head.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return "image/png";
    }

    // GIF87a / GIF89a
    if head.starts_with(b"GIF87a") || head.starts_with(b"GIF89a") {
        return "image/gif";
    }

    // WebP: RIFF....WEBP
    if head.len() >= 12 && &head[0..4] == b"RIFF" && &head[8..12] == b"WEBP" {
        return "image/webp";
    }

    // BMP: BM
    if head.starts_with(b"BM") {
        return "image/bmp";
    }

    FALLBACK_CONTENT_TYPE
}
