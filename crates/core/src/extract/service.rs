//! Type-dispatched content extraction.

use tracing::warn;

use super::{image, ocr, pdf};
use crate::file::TypeTag;

/// Content metadata pulled out of an upload.
///
/// All fields are best-effort; a completely uninspectable file yields
/// the default value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extracted {
    /// Page count, PDFs only.
    pub page_count: Option<i32>,
    /// Text layer (PDF) or OCR text (image), when non-empty.
    pub text_content: Option<String>,
    /// Image dimensions in pixels.
    pub dimensions: Option<(u32, u32)>,
    /// Whether `text_content` came from OCR.
    pub has_ocr: bool,
    /// Mean OCR confidence (0..=100), 0.0 when unknown.
    pub ocr_confidence: f32,
}

/// Extract content metadata for an upload.
///
/// Dispatches on the type tag: contract documents get a page count and
/// their text layer, drawings get dimensions and OCR when an engine is
/// installed. Failures are logged and ignored; this function never
/// fails the upload.
pub async fn extract(tag: TypeTag, bytes: &[u8]) -> Extracted {
    let mut out = Extracted::default();

    match tag {
        TypeTag::Contract => {
            match pdf::page_count(bytes) {
                Ok(count) => out.page_count = Some(i32::try_from(count).unwrap_or(i32::MAX)),
                Err(e) => warn!(error = %e, "could not count PDF pages"),
            }
            match pdf::text(bytes) {
                Ok(text) if !text.is_empty() => out.text_content = Some(text),
                Ok(_) => {}
                Err(e) => warn!(error = %e, "could not extract PDF text"),
            }
        }
        TypeTag::Drawing => {
            match image::dimensions(bytes) {
                Ok(dims) => out.dimensions = Some(dims),
                Err(e) => warn!(error = %e, "could not read image dimensions"),
            }
            match ocr::recognize(bytes).await {
                Ok(result) => {
                    out.has_ocr = true;
                    out.ocr_confidence = result.confidence;
                    if !result.text.is_empty() {
                        out.text_content = Some(result.text);
                    }
                }
                Err(crate::extract::ExtractError::OcrUnavailable) => {}
                Err(e) => warn!(error = %e, "OCR failed"),
            }
        }
    }

    out
}
