//! Uploaded file domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Type tag carried by every upload, selecting validation rules,
/// destination directory, and whether a contract is auto-created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// `"1"`: contract documents (PDF). Uploads auto-create a contract.
    Contract,
    /// `"2"`: drawings (images).
    Drawing,
}

impl TypeTag {
    /// Parses the wire form of a type tag.
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "1" => Some(Self::Contract),
            "2" => Some(Self::Drawing),
            _ => None,
        }
    }

    /// Wire form stored in `file_upd.file_type`.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Contract => "1",
            Self::Drawing => "2",
        }
    }

    /// Subdirectory under the upload root for this tag.
    ///
    /// Tags that fail to parse fall back to `others`.
    #[must_use]
    pub fn directory(tag: &str) -> &'static str {
        match Self::parse(tag) {
            Some(Self::Contract) => "contracts",
            Some(Self::Drawing) => "drawings",
            None => "others",
        }
    }
}

/// A persisted uploaded file. Immutable after creation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    /// Human-readable id, e.g. `file_001`.
    pub id: String,
    /// Owning company id.
    pub company_id: String,
    /// Filename as provided by the uploader.
    pub original_name: String,
    /// Randomized on-disk filename, unique.
    pub stored_name: String,
    /// Type tag wire form (`"1"` or `"2"`).
    pub file_type: String,
    /// Size in bytes.
    pub file_size: i64,
    /// Absolute path of the on-disk copy.
    pub file_path: String,
    /// MIME type derived from the extension.
    pub mime_type: String,
    /// SHA-256 of the content, lowercase hex. Duplicates are allowed.
    pub file_hash: String,
    /// Page count for PDFs.
    pub page_count: Option<i32>,
    /// Extracted text layer or OCR output.
    pub text_content: Option<String>,
    /// Whether `text_content` came from OCR.
    pub has_ocr: bool,
    /// Mean OCR confidence, 0.0 when unknown.
    pub ocr_confidence: f32,
    /// When the file was uploaded.
    pub upload_time: DateTime<Utc>,
}

/// Input for inserting a file record. The database also keeps a copy of
/// the raw bytes in `file_content`.
#[derive(Debug, Clone)]
pub struct NewFileRecord {
    /// Owning company id.
    pub company_id: String,
    /// Filename as provided by the uploader.
    pub original_name: String,
    /// Randomized on-disk filename.
    pub stored_name: String,
    /// Type tag wire form.
    pub file_type: String,
    /// Size in bytes.
    pub file_size: i64,
    /// Absolute path of the on-disk copy.
    pub file_path: String,
    /// MIME type derived from the extension.
    pub mime_type: String,
    /// Raw file bytes.
    pub content: Vec<u8>,
    /// SHA-256 of the content, lowercase hex.
    pub file_hash: String,
    /// Page count for PDFs.
    pub page_count: Option<i32>,
    /// Extracted text layer or OCR output.
    pub text_content: Option<String>,
    /// Whether `text_content` came from OCR.
    pub has_ocr: bool,
    /// Mean OCR confidence, 0.0 when unknown.
    pub ocr_confidence: f32,
}

/// MIME type for a filename, derived from its extension.
#[must_use]
pub fn mime_type_for(filename: &str) -> &'static str {
    match extension(filename).as_deref() {
        Some("pdf") => "application/pdf",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Lowercased extension of a filename, without the dot.
#[must_use]
pub fn extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_tag_roundtrip() {
        assert_eq!(TypeTag::parse("1"), Some(TypeTag::Contract));
        assert_eq!(TypeTag::parse("2"), Some(TypeTag::Drawing));
        assert_eq!(TypeTag::parse("3"), None);
        assert_eq!(TypeTag::Contract.tag(), "1");
        assert_eq!(TypeTag::Drawing.tag(), "2");
    }

    #[test]
    fn test_type_tag_directories() {
        assert_eq!(TypeTag::directory("1"), "contracts");
        assert_eq!(TypeTag::directory("2"), "drawings");
        assert_eq!(TypeTag::directory("9"), "others");
        assert_eq!(TypeTag::directory(""), "others");
    }

    #[test]
    fn test_extension() {
        assert_eq!(extension("report.PDF"), Some("pdf".to_string()));
        assert_eq!(extension("archive.tar.gz"), Some("gz".to_string()));
        assert_eq!(extension("noext"), None);
        assert_eq!(extension("trailing."), None);
    }

    #[test]
    fn test_mime_type_for() {
        assert_eq!(mime_type_for("scan.jpeg"), "image/jpeg");
        assert_eq!(mime_type_for("contract.pdf"), "application/pdf");
        assert_eq!(mime_type_for("unknown.bin"), "application/octet-stream");
    }
}
