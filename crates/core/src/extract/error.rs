//! Extraction error types.

use thiserror::Error;

/// Content extraction errors.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The document could not be parsed.
    #[error("failed to parse document: {0}")]
    Parse(String),

    /// The OCR engine is not installed.
    #[error("no OCR engine available on PATH")]
    OcrUnavailable,

    /// The OCR engine ran but failed.
    #[error("OCR failed: {0}")]
    Ocr(String),

    /// Temp file or process IO error.
    #[error("extraction IO error: {0}")]
    Io(#[from] std::io::Error),
}
