//! Upload pipeline service.

use std::sync::Arc;

use pactfile_shared::{AppError, AppResult};
use tracing::{debug, info, warn};

use super::types::{IngestOutcome, NewLinkedContract, UploadCommand};
use crate::contract::ContractRecord;
use crate::extract;
use crate::file::{FileRecord, NewFileRecord, TypeTag, UploadValidator, types as file_types};
use crate::storage::{StorageService, service::sanitize_filename};

/// Repository trait for file persistence.
///
/// Implemented by the db crate against the `file_upd` table.
pub trait FileRepository: Send + Sync {
    /// Insert a new file record, allocating its id.
    fn insert(
        &self,
        input: NewFileRecord,
    ) -> impl std::future::Future<Output = AppResult<FileRecord>> + Send;

    /// Most recent earlier file with the given content hash, if any.
    fn find_by_hash(
        &self,
        hash: &str,
    ) -> impl std::future::Future<Output = AppResult<Option<FileRecord>>> + Send;
}

/// Repository trait for the contract auto-linker.
pub trait ContractLinkRepository: Send + Sync {
    /// Insert a skeletal active contract linked to a file.
    fn insert_linked(
        &self,
        input: NewLinkedContract,
    ) -> impl std::future::Future<Output = AppResult<ContractRecord>> + Send;
}

/// Runs the whole upload pipeline for one file.
///
/// Order of operations: validate, write to disk, hash, extract
/// content, insert the record, and auto-link a contract for contract
/// documents. A failed database insert rolls the disk write back; a
/// failed auto-link never fails the upload.
pub struct IngestService<F, C> {
    validator: UploadValidator,
    storage: Arc<StorageService>,
    files: Arc<F>,
    contracts: Arc<C>,
}

impl<F, C> IngestService<F, C>
where
    F: FileRepository,
    C: ContractLinkRepository,
{
    /// Create the pipeline over its collaborators.
    #[must_use]
    pub fn new(
        validator: UploadValidator,
        storage: Arc<StorageService>,
        files: Arc<F>,
        contracts: Arc<C>,
    ) -> Self {
        Self {
            validator,
            storage,
            files,
            contracts,
        }
    }

    /// Ingest one upload.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for rejected uploads, `Internal` for disk
    /// failures, and whatever the file repository reports for insert
    /// failures. Extraction and auto-link problems are logged, never
    /// returned.
    pub async fn ingest(&self, command: UploadCommand) -> AppResult<IngestOutcome> {
        if command.company_id.trim().is_empty() {
            return Err(AppError::validation("company id is required"));
        }

        let original_name = sanitize_filename(&command.original_name);
        let tag = self.validator.validate(
            &original_name,
            &command.type_tag,
            command.content.len() as u64,
        )?;

        let content = command.content;
        let stored = self
            .storage
            .store(&original_name, tag.tag(), content.clone())
            .await?;

        // Identical content elsewhere is worth knowing about but never
        // blocks the upload.
        let duplicate_of = match self.files.find_by_hash(&stored.sha256).await {
            Ok(Some(existing)) => {
                info!(
                    hash = %stored.sha256,
                    existing = %existing.id,
                    "uploaded content duplicates an existing file"
                );
                Some(existing.id)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "duplicate-hash lookup failed");
                None
            }
        };

        let extracted = extract::extract(tag, &content).await;
        if let Some((width, height)) = extracted.dimensions {
            debug!(width, height, "image dimensions");
        }

        let new_record = NewFileRecord {
            company_id: command.company_id.clone(),
            original_name: original_name.clone(),
            stored_name: stored.stored_name.clone(),
            file_type: tag.tag().to_string(),
            file_size: i64::try_from(stored.size).unwrap_or(i64::MAX),
            file_path: stored.absolute_path.display().to_string(),
            mime_type: file_types::mime_type_for(&original_name).to_string(),
            content,
            file_hash: stored.sha256.clone(),
            page_count: extracted.page_count,
            text_content: extracted.text_content,
            has_ocr: extracted.has_ocr,
            ocr_confidence: extracted.ocr_confidence,
        };

        let file = match self.files.insert(new_record).await {
            Ok(file) => file,
            Err(e) => {
                // The disk write already happened; take it back so no
                // orphan remains.
                if let Err(del) = self.storage.delete(&stored.key).await {
                    warn!(key = %stored.key, error = %del, "compensating delete failed");
                }
                return Err(e);
            }
        };

        let contract = if tag == TypeTag::Contract {
            self.auto_link(&file).await
        } else {
            None
        };

        info!(
            file_id = %file.id,
            company_id = %file.company_id,
            size = file.file_size,
            contract = contract.as_ref().map(|c| c.id.clone()),
            "upload ingested"
        );

        Ok(IngestOutcome {
            file,
            contract,
            duplicate_of,
        })
    }

    /// Create the skeletal contract for a contract-document upload.
    ///
    /// Failures are logged and swallowed; the uploaded file stands on
    /// its own either way.
    async fn auto_link(&self, file: &FileRecord) -> Option<ContractRecord> {
        if file.id.is_empty() || file.company_id.is_empty() {
            warn!("cannot auto-link contract without file id and company id");
            return None;
        }

        let input = NewLinkedContract {
            file_id: file.id.clone(),
            company_id: file.company_id.clone(),
            file_path: file.file_path.clone(),
            file_name: file.original_name.clone(),
        };

        match self.contracts.insert_linked(input).await {
            Ok(contract) => {
                info!(contract_id = %contract.id, file_id = %file.id, "contract auto-created");
                Some(contract)
            }
            Err(e) => {
                warn!(file_id = %file.id, error = %e, "contract auto-creation failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::Utc;

    use super::*;
    use crate::contract::ContractStatus;
    use pactfile_shared::config::UploadConfig;

    #[derive(Default)]
    struct MockFileRepo {
        inserted: Mutex<Vec<NewFileRecord>>,
        existing_hash: Option<String>,
        fail_insert: bool,
    }

    impl FileRepository for MockFileRepo {
        async fn insert(&self, input: NewFileRecord) -> AppResult<FileRecord> {
            if self.fail_insert {
                return Err(AppError::Database("insert failed".to_string()));
            }
            let record = FileRecord {
                id: format!("file_{:03}", self.inserted.lock().unwrap().len() + 1),
                company_id: input.company_id.clone(),
                original_name: input.original_name.clone(),
                stored_name: input.stored_name.clone(),
                file_type: input.file_type.clone(),
                file_size: input.file_size,
                file_path: input.file_path.clone(),
                mime_type: input.mime_type.clone(),
                file_hash: input.file_hash.clone(),
                page_count: input.page_count,
                text_content: input.text_content.clone(),
                has_ocr: input.has_ocr,
                ocr_confidence: input.ocr_confidence,
                upload_time: Utc::now(),
            };
            self.inserted.lock().unwrap().push(input);
            Ok(record)
        }

        async fn find_by_hash(&self, hash: &str) -> AppResult<Option<FileRecord>> {
            Ok(self.existing_hash.as_deref().filter(|h| *h == hash).map(|_| {
                FileRecord {
                    id: "file_900".to_string(),
                    company_id: "company_00001".to_string(),
                    original_name: "earlier.pdf".to_string(),
                    stored_name: "earlier".to_string(),
                    file_type: "1".to_string(),
                    file_size: 1,
                    file_path: "/tmp/earlier".to_string(),
                    mime_type: "application/pdf".to_string(),
                    file_hash: hash.to_string(),
                    page_count: None,
                    text_content: None,
                    has_ocr: false,
                    ocr_confidence: 0.0,
                    upload_time: Utc::now(),
                }
            }))
        }
    }

    #[derive(Default)]
    struct MockContractRepo {
        linked: Mutex<Vec<NewLinkedContract>>,
        fail: bool,
    }

    impl ContractLinkRepository for MockContractRepo {
        async fn insert_linked(&self, input: NewLinkedContract) -> AppResult<ContractRecord> {
            if self.fail {
                return Err(AppError::Database("link failed".to_string()));
            }
            let record = ContractRecord {
                id: "contract_001".to_string(),
                file_id: input.file_id.clone(),
                company_id: input.company_id.clone(),
                contract_title: None,
                contract_amount: None,
                paid_amount: None,
                start_date: None,
                end_date: None,
                final_payment_date: None,
                final_payment_amount: None,
                file_path: Some(input.file_path.clone()),
                file_name: Some(input.file_name.clone()),
                main_content: None,
                memo: None,
                status: ContractStatus::Active,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            };
            self.linked.lock().unwrap().push(input);
            Ok(record)
        }
    }

    fn service(
        files: MockFileRepo,
        contracts: MockContractRepo,
    ) -> (
        IngestService<MockFileRepo, MockContractRepo>,
        Arc<MockFileRepo>,
        Arc<MockContractRepo>,
        Arc<StorageService>,
        tempfile::TempDir,
    ) {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = Arc::new(StorageService::new(dir.path()).expect("storage"));
        let files = Arc::new(files);
        let contracts = Arc::new(contracts);
        let svc = IngestService::new(
            UploadValidator::new(UploadConfig::default()),
            Arc::clone(&storage),
            Arc::clone(&files),
            Arc::clone(&contracts),
        );
        (svc, files, contracts, storage, dir)
    }

    fn pdf_upload() -> UploadCommand {
        UploadCommand {
            original_name: "agreement.pdf".to_string(),
            type_tag: "1".to_string(),
            company_id: "company_00001".to_string(),
            content: b"%PDF-1.4 minimal".to_vec(),
        }
    }

    #[tokio::test]
    async fn test_contract_upload_creates_file_and_contract() {
        let (svc, files, contracts, _storage, _dir) =
            service(MockFileRepo::default(), MockContractRepo::default());

        let outcome = svc.ingest(pdf_upload()).await.expect("ingest");

        assert_eq!(outcome.file.file_type, "1");
        assert_eq!(outcome.file.mime_type, "application/pdf");
        let contract = outcome.contract.expect("auto-created contract");
        assert_eq!(contract.file_id, outcome.file.id);
        assert_eq!(contract.status, ContractStatus::Active);
        assert_eq!(files.inserted.lock().unwrap().len(), 1);
        assert_eq!(contracts.linked.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_drawing_upload_skips_contract() {
        let (svc, _files, contracts, _storage, _dir) =
            service(MockFileRepo::default(), MockContractRepo::default());

        let outcome = svc
            .ingest(UploadCommand {
                original_name: "plan.png".to_string(),
                type_tag: "2".to_string(),
                company_id: "company_00001".to_string(),
                content: vec![0u8; 32],
            })
            .await
            .expect("ingest");

        assert!(outcome.contract.is_none());
        assert!(contracts.linked.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_upload_writes_nothing() {
        let (svc, files, _contracts, _storage, dir) =
            service(MockFileRepo::default(), MockContractRepo::default());

        let err = svc
            .ingest(UploadCommand {
                original_name: "malware.exe".to_string(),
                type_tag: "1".to_string(),
                company_id: "company_00001".to_string(),
                content: vec![1, 2, 3],
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert!(files.inserted.lock().unwrap().is_empty());
        assert!(walk(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_missing_company_id_rejected() {
        let (svc, _files, _contracts, _storage, _dir) =
            service(MockFileRepo::default(), MockContractRepo::default());

        let err = svc
            .ingest(UploadCommand {
                company_id: "  ".to_string(),
                ..pdf_upload()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_insert_failure_removes_disk_file() {
        let (svc, _files, _contracts, storage, dir) = service(
            MockFileRepo {
                fail_insert: true,
                ..MockFileRepo::default()
            },
            MockContractRepo::default(),
        );

        let err = svc.ingest(pdf_upload()).await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));

        // No orphaned bytes under the upload root.
        let mut entries = Vec::new();
        for entry in walk(dir.path()) {
            entries.push(entry);
        }
        assert!(entries.is_empty(), "orphaned files: {entries:?}");
        drop(storage);
    }

    #[tokio::test]
    async fn test_duplicate_hash_reported_but_allowed() {
        let hash = hex::encode(sha2::Sha256::digest(b"%PDF-1.4 minimal"));
        let (svc, files, _contracts, _storage, _dir) = service(
            MockFileRepo {
                existing_hash: Some(hash),
                ..MockFileRepo::default()
            },
            MockContractRepo::default(),
        );

        let outcome = svc.ingest(pdf_upload()).await.expect("ingest");
        assert_eq!(outcome.duplicate_of.as_deref(), Some("file_900"));
        assert_eq!(files.inserted.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_auto_link_failure_keeps_file() {
        let (svc, files, _contracts, _storage, _dir) = service(
            MockFileRepo::default(),
            MockContractRepo {
                fail: true,
                ..MockContractRepo::default()
            },
        );

        let outcome = svc.ingest(pdf_upload()).await.expect("ingest");
        assert!(outcome.contract.is_none());
        assert_eq!(files.inserted.lock().unwrap().len(), 1);
    }

    use sha2::Digest;

    fn walk(dir: &std::path::Path) -> Vec<std::path::PathBuf> {
        let mut files = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    files.extend(walk(&path));
                } else {
                    files.push(path);
                }
            }
        }
        files
    }
}
