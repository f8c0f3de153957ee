//! OCR via a system `tesseract` binary.
//!
//! OCR is optional: when no engine is installed the caller records the
//! image without text. The engine is invoked in TSV mode so text and a
//! mean word confidence come from a single pass.

use std::io::Write;
use std::path::PathBuf;

use tracing::debug;

use super::error::ExtractError;

/// OCR result for one image.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrOutput {
    /// Recognized text, words joined with spaces per line.
    pub text: String,
    /// Mean word confidence reported by the engine (0..=100),
    /// 0.0 when no words were recognized.
    pub confidence: f32,
}

/// Path of the tesseract binary, if one is installed.
#[must_use]
pub fn engine_path() -> Option<PathBuf> {
    which::which("tesseract").ok()
}

/// Run OCR over raw image bytes.
///
/// # Errors
///
/// Returns `OcrUnavailable` when tesseract is not on PATH, `Ocr` when
/// the engine exits unsuccessfully, and `Io` for temp file failures.
pub async fn recognize(image_bytes: &[u8]) -> Result<OcrOutput, ExtractError> {
    let engine = engine_path().ok_or(ExtractError::OcrUnavailable)?;

    // Tesseract reads from a file, so spool the bytes to a temp path.
    let mut input = tempfile::NamedTempFile::new()?;
    input.write_all(image_bytes)?;
    input.flush()?;

    let output = tokio::process::Command::new(engine)
        .arg(input.path())
        .arg("stdout")
        .arg("tsv")
        .output()
        .await?;

    if !output.status.success() {
        return Err(ExtractError::Ocr(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    let parsed = parse_tsv(&String::from_utf8_lossy(&output.stdout));
    debug!(
        words = parsed.text.split_whitespace().count(),
        confidence = parsed.confidence,
        "OCR complete"
    );
    Ok(parsed)
}

/// Parse tesseract TSV output into text plus mean word confidence.
fn parse_tsv(tsv: &str) -> OcrOutput {
    let mut words = Vec::new();
    let mut conf_sum = 0.0f32;

    for line in tsv.lines().skip(1) {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 12 {
            continue;
        }
        let Ok(conf) = fields[10].parse::<f32>() else {
            continue;
        };
        let word = fields[11].trim();
        // Structural rows carry conf -1 and no word text.
        if conf < 0.0 || word.is_empty() {
            continue;
        }
        conf_sum += conf;
        words.push(word.to_string());
    }

    let confidence = if words.is_empty() {
        0.0
    } else {
        conf_sum / words.len() as f32
    };

    OcrOutput {
        text: words.join(" "),
        confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext";

    #[test]
    fn test_parse_tsv_words_and_confidence() {
        let tsv = format!(
            "{HEADER}\n\
             1\t1\t0\t0\t0\t0\t0\t0\t100\t100\t-1\t\n\
             5\t1\t1\t1\t1\t1\t5\t5\t20\t10\t90\tinvoice\n\
             5\t1\t1\t1\t1\t2\t30\t5\t20\t10\t70\ttotal\n"
        );
        let out = parse_tsv(&tsv);
        assert_eq!(out.text, "invoice total");
        assert!((out.confidence - 80.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_parse_tsv_no_words() {
        let tsv = format!("{HEADER}\n1\t1\t0\t0\t0\t0\t0\t0\t100\t100\t-1\t\n");
        let out = parse_tsv(&tsv);
        assert!(out.text.is_empty());
        assert!((out.confidence - 0.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_parse_tsv_skips_malformed_rows() {
        let tsv = format!("{HEADER}\nshort\trow\n5\t1\t1\t1\t1\t1\t0\t0\t1\t1\tnotanumber\tword\n");
        let out = parse_tsv(&tsv);
        assert!(out.text.is_empty());
    }
}
