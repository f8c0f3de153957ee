//! Content extraction for uploaded files.
//!
//! Extraction is best-effort: failures are reported as `ExtractError`
//! and the upload pipeline logs and ignores them. An upload never fails
//! because its content could not be inspected.

pub mod error;
pub mod image;
pub mod ocr;
pub mod pdf;
pub mod service;

pub use error::ExtractError;
pub use service::{Extracted, extract};
