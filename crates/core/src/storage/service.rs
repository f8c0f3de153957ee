//! Disk storage implementation using Apache OpenDAL.

use std::path::{Path, PathBuf};

use opendal::{ErrorKind, Operator, services};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::error::StorageError;
use crate::file::{TypeTag, types};

/// Result of writing an upload to disk.
#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Randomized filename, unique per upload.
    pub stored_name: String,
    /// Key relative to the upload root, e.g. `contracts/ab12….pdf`.
    pub key: String,
    /// Absolute path of the written file.
    pub absolute_path: PathBuf,
    /// SHA-256 of the content, lowercase hex.
    pub sha256: String,
    /// Size in bytes.
    pub size: u64,
}

/// Storage service for uploaded file bytes.
///
/// Files land under the upload root in a subdirectory keyed by type tag
/// (`contracts`, `drawings`, or `others`). Stored names are random, so
/// concurrent writes cannot collide.
pub struct StorageService {
    operator: Operator,
    root: PathBuf,
}

impl StorageService {
    /// Create a storage service rooted at the given directory.
    ///
    /// The directory is created if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the root cannot be created or is not valid UTF-8.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, StorageError> {
        let root = root.as_ref();
        std::fs::create_dir_all(root).map_err(|e| StorageError::Operation(e.to_string()))?;
        let root = root
            .canonicalize()
            .map_err(|e| StorageError::Operation(e.to_string()))?;

        let builder = services::Fs::default().root(
            root.to_str()
                .ok_or_else(|| StorageError::configuration("upload root is not valid UTF-8"))?,
        );
        let operator = Operator::new(builder)
            .map_err(|e| StorageError::configuration(e.to_string()))?
            .finish();

        Ok(Self { operator, root })
    }

    /// Write upload bytes to disk and hash them.
    ///
    /// The stored name is a fresh random hex token plus the original
    /// extension; the destination directory follows the type tag.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails. Nothing is recorded elsewhere,
    /// so a failure here leaves no trace.
    pub async fn store(
        &self,
        original_name: &str,
        type_tag: &str,
        content: Vec<u8>,
    ) -> Result<StoredFile, StorageError> {
        let stored_name = match types::extension(original_name) {
            Some(ext) => format!("{}.{ext}", Uuid::new_v4().simple()),
            None => Uuid::new_v4().simple().to_string(),
        };
        let key = format!("{}/{stored_name}", TypeTag::directory(type_tag));

        let sha256 = hex::encode(Sha256::digest(&content));
        let size = content.len() as u64;

        self.operator.write(&key, content).await?;

        Ok(StoredFile {
            stored_name,
            absolute_path: self.root.join(&key),
            key,
            sha256,
            size,
        })
    }

    /// Read a stored file back from disk.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the file is missing.
    pub async fn read(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let buffer = self.operator.read(key).await?;
        Ok(buffer.to_vec())
    }

    /// Delete a stored file. Deleting a missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if deletion fails.
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.operator.delete(key).await.map_err(StorageError::from)
    }

    /// Check whether a file exists on disk.
    pub async fn exists(&self, key: &str) -> bool {
        match self.operator.stat(key).await {
            Ok(_) => true,
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(_) => false,
        }
    }

    /// Storage key for a file given its type tag and stored name.
    #[must_use]
    pub fn key_for(type_tag: &str, stored_name: &str) -> String {
        format!("{}/{stored_name}", TypeTag::directory(type_tag))
    }

    /// The canonicalized upload root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Sanitize a client-supplied filename for safe display and storage.
///
/// Path separators and control characters are replaced; the result is
/// never empty.
#[must_use]
pub fn sanitize_filename(filename: &str) -> String {
    let cleaned: String = filename
        .trim()
        .chars()
        .map(|c| {
            if c == '/' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    // Reject names that are only dots, they would vanish as path components.
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "unnamed".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("invoice.pdf"), "invoice.pdf");
        assert_eq!(sanitize_filename("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_filename("a\\b.pdf"), "a_b.pdf");
        assert_eq!(sanitize_filename("  spaced.pdf  "), "spaced.pdf");
        assert_eq!(sanitize_filename(".."), "unnamed");
        assert_eq!(sanitize_filename(""), "unnamed");
    }

    #[tokio::test]
    async fn test_store_and_read_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = StorageService::new(dir.path()).expect("storage");

        let stored = storage
            .store("contract.pdf", "1", b"%PDF-1.4 fake".to_vec())
            .await
            .expect("store");

        assert!(stored.key.starts_with("contracts/"));
        assert!(stored.stored_name.ends_with(".pdf"));
        assert_eq!(stored.size, 13);
        assert!(stored.absolute_path.is_absolute());

        let bytes = storage.read(&stored.key).await.expect("read");
        assert_eq!(bytes, b"%PDF-1.4 fake");
        assert!(storage.exists(&stored.key).await);
    }

    #[tokio::test]
    async fn test_stored_names_are_unique() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = StorageService::new(dir.path()).expect("storage");

        let a = storage
            .store("plan.png", "2", vec![1, 2, 3])
            .await
            .expect("store a");
        let b = storage
            .store("plan.png", "2", vec![1, 2, 3])
            .await
            .expect("store b");

        assert_ne!(a.stored_name, b.stored_name);
        assert_eq!(a.sha256, b.sha256);
        assert!(a.key.starts_with("drawings/"));
    }

    #[tokio::test]
    async fn test_delete_removes_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = StorageService::new(dir.path()).expect("storage");

        let stored = storage
            .store("x.pdf", "1", vec![0u8; 16])
            .await
            .expect("store");
        storage.delete(&stored.key).await.expect("delete");
        assert!(!storage.exists(&stored.key).await);
        assert!(matches!(
            storage.read(&stored.key).await,
            Err(StorageError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_tag_goes_to_others() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = StorageService::new(dir.path()).expect("storage");

        let stored = storage
            .store("blob.bin", "9", vec![7u8; 4])
            .await
            .expect("store");
        assert!(stored.key.starts_with("others/"));
    }

    #[test]
    fn test_sha256_is_hex_of_content() {
        // sha256("abc")
        let expected = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";
        assert_eq!(hex::encode(Sha256::digest(b"abc")), expected);
    }
}
