//! Upload validation against the configured limits.

use pactfile_shared::config::UploadConfig;
use pactfile_shared::{AppError, AppResult};

use super::types::{self, TypeTag};

/// Validates incoming uploads before any bytes touch disk.
///
/// Checks the filename, the extension whitelist for the type tag, and
/// the size limit. Has no side effects.
#[derive(Debug, Clone)]
pub struct UploadValidator {
    config: UploadConfig,
}

impl UploadValidator {
    /// Creates a validator over the given upload configuration.
    #[must_use]
    pub fn new(config: UploadConfig) -> Self {
        Self { config }
    }

    /// Validates a single upload. Returns the parsed type tag on success.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` with a message naming the allowed
    /// extensions or the size limit.
    pub fn validate(&self, filename: &str, type_tag: &str, size: u64) -> AppResult<TypeTag> {
        if filename.trim().is_empty() {
            return Err(AppError::validation("filename must not be empty"));
        }

        let tag = TypeTag::parse(type_tag).ok_or_else(|| {
            AppError::validation(format!(
                "unknown file type '{type_tag}', expected \"1\" (contract) or \"2\" (drawing)"
            ))
        })?;

        let allowed = self
            .config
            .allowed_extensions
            .get(tag.tag())
            .map(Vec::as_slice)
            .unwrap_or_default();

        let ext = types::extension(filename);
        let permitted = ext
            .as_deref()
            .is_some_and(|e| allowed.iter().any(|a| a.eq_ignore_ascii_case(e)));
        if !permitted {
            return Err(AppError::validation(format!(
                "file type '{}' only accepts extensions: {}",
                tag.tag(),
                allowed.join(", ")
            )));
        }

        if size > self.config.max_file_size {
            return Err(AppError::validation(format!(
                "file size {size} bytes exceeds the {} byte limit",
                self.config.max_file_size
            )));
        }

        Ok(tag)
    }

    /// Maximum allowed upload size in bytes.
    #[must_use]
    pub const fn max_file_size(&self) -> u64 {
        self.config.max_file_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn validator() -> UploadValidator {
        UploadValidator::new(UploadConfig::default())
    }

    #[rstest]
    #[case("contract.pdf", "1", 1024)]
    #[case("CONTRACT.PDF", "1", 1024)]
    #[case("site-plan.png", "2", 1024)]
    #[case("photo.JPEG", "2", 1024)]
    fn test_accepts_whitelisted(#[case] name: &str, #[case] tag: &str, #[case] size: u64) {
        assert!(validator().validate(name, tag, size).is_ok());
    }

    #[rstest]
    #[case("contract.docx", "1")]
    #[case("drawing.pdf", "2")]
    #[case("noextension", "1")]
    #[case("trailing.", "2")]
    fn test_rejects_wrong_extension(#[case] name: &str, #[case] tag: &str) {
        let err = validator().validate(name, tag, 1024).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_rejects_unknown_tag() {
        let err = validator().validate("contract.pdf", "3", 1024).unwrap_err();
        assert!(err.to_string().contains("unknown file type"));
    }

    #[test]
    fn test_rejects_empty_filename() {
        let err = validator().validate("   ", "1", 1024).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_rejects_oversized() {
        let max = validator().max_file_size();
        assert!(validator().validate("a.pdf", "1", max).is_ok());
        let err = validator().validate("a.pdf", "1", max + 1).unwrap_err();
        assert!(err.to_string().contains("exceeds"));
    }

    proptest! {
        // Accepted uploads always carry a whitelisted extension for their tag.
        #[test]
        fn prop_accept_implies_whitelisted(
            stem in "[a-zA-Z0-9]{1,20}",
            ext in "[a-z]{1,5}",
            tag in "[0-9]",
        ) {
            let v = validator();
            let name = format!("{stem}.{ext}");
            if v.validate(&name, &tag, 1).is_ok() {
                let allowed = v.config.allowed_extensions.get(tag.as_str()).cloned().unwrap_or_default();
                prop_assert!(allowed.contains(&ext));
            }
        }
    }
}
