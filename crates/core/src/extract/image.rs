//! Image dimension probing.

use std::io::Cursor;

use image::ImageReader;

use super::error::ExtractError;

/// Width and height of an image, in pixels.
///
/// Only headers are decoded, so this is cheap even for large files.
///
/// # Errors
///
/// Returns `ExtractError::Parse` if the format cannot be recognized.
pub fn dimensions(bytes: &[u8]) -> Result<(u32, u32), ExtractError> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ExtractError::Parse(e.to_string()))?
        .into_dimensions()
        .map_err(|e| ExtractError::Parse(e.to_string()))
}
