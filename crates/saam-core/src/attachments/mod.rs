//! Attachment boundary: classification and content extraction.
//!
//! An attachment lives for one dispatch cycle: raw bytes plus a declared
//! media type come in, get classified exactly once into a closed kind, and
//! are converted to either inline image data or extracted plain text before
//! the model call. Nothing here is persisted.

mod docx;
mod image;
mod pdf;

pub use docx::extract_docx_text;
pub use image::{DecodedImagePng, decode_image_to_png};
pub use pdf::extract_pdf_text;

/// MIME type for Word (.docx) documents.
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// A transient uploaded file supplied alongside one prompt.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub data: Vec<u8>,
    /// Declared media type (e.g. from the file extension or upload header).
    pub media_type: String,
}

impl Attachment {
    pub fn new(data: Vec<u8>, media_type: impl Into<String>) -> Self {
        Self {
            data,
            media_type: media_type.into(),
        }
    }

    /// Classifies this attachment once, at the boundary.
    pub fn kind(&self) -> AttachmentKind {
        AttachmentKind::classify(&self.media_type, &self.data)
    }
}

/// Closed attachment classification.
///
/// Decided once from the bytes (sniffed) with the declared type as a
/// fallback; the rest of the pipeline matches on this, never on raw media
/// type strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Image,
    Pdf,
    Docx,
    /// Unrecognized media type. Treated as "no attachment" downstream —
    /// a permissive default, not a validation error.
    Unsupported,
}

impl AttachmentKind {
    /// Classifies from the declared media type and the actual bytes.
    ///
    /// Sniffed content wins over the declared type; the declared type only
    /// decides when sniffing is inconclusive.
    pub fn classify(declared: &str, data: &[u8]) -> Self {
        if let Some(sniffed) = infer::get(data) {
            let kind = Self::from_media_type(sniffed.mime_type());
            if kind != AttachmentKind::Unsupported {
                return kind;
            }
        }
        Self::from_media_type(declared)
    }

    fn from_media_type(media_type: &str) -> Self {
        if media_type.starts_with("image/") {
            return AttachmentKind::Image;
        }
        match media_type {
            "application/pdf" => AttachmentKind::Pdf,
            DOCX_MIME => AttachmentKind::Docx,
            _ => AttachmentKind::Unsupported,
        }
    }
}

/// Returns the declared MIME type for a file path, by extension.
pub fn media_type_for_path(path: &std::path::Path) -> Option<&'static str> {
    let ext = path.extension().and_then(|e| e.to_str())?;

    match ext.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "pdf" => Some("application/pdf"),
        "docx" => Some(DOCX_MIME),
        _ => None,
    }
}
