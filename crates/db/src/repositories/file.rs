//! File repository for database operations on `file_upd`.

use chrono::Utc;
use pactfile_core::file::{FileRecord, NewFileRecord};
use pactfile_core::ingest;
use pactfile_shared::types::{EntityKind, PageRequest, PageResponse};
use pactfile_shared::{AppError, AppResult};
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::{debug, info};

use super::{db_err, like_pattern, sequence};
use crate::entities::{contracts, file_upd};

/// Filters for the file listing endpoint.
#[derive(Debug, Clone, Default)]
pub struct FileListFilter {
    /// Restrict to one type tag.
    pub file_type: Option<String>,
    /// Restrict to one company.
    pub company_id: Option<String>,
    /// Case-insensitive substring over name and extracted text.
    pub keyword: Option<String>,
}

/// Aggregate counts for the file stats endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStats {
    /// All files.
    pub total: u64,
    /// Files with type tag `"1"`.
    pub contracts: u64,
    /// Files with type tag `"2"`.
    pub drawings: u64,
}

/// File repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct FileRepository {
    db: DatabaseConnection,
}

impl FileRepository {
    /// Creates a new file repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Insert a file record, allocating its id inside one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails; the caller owns cleaning
    /// up the already-written disk file in that case.
    pub async fn create(&self, input: NewFileRecord) -> AppResult<FileRecord> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let id = sequence::next_id(&txn, EntityKind::File)
            .await
            .map_err(db_err)?;
        let model = file_upd::ActiveModel {
            id: Set(id),
            company_id: Set(input.company_id),
            original_name: Set(input.original_name),
            stored_name: Set(input.stored_name),
            file_type: Set(input.file_type),
            file_size: Set(input.file_size),
            file_path: Set(input.file_path),
            mime_type: Set(input.mime_type),
            file_content: Set(input.content),
            file_hash: Set(input.file_hash),
            page_count: Set(input.page_count),
            text_content: Set(input.text_content),
            has_ocr: Set(input.has_ocr),
            ocr_confidence: Set(input.ocr_confidence),
            upload_time: Set(Utc::now().into()),
        };
        let model = model.insert(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        info!(id = %model.id, company_id = %model.company_id, "file record created");
        Ok(model.into())
    }

    /// Find a file by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<FileRecord>> {
        let model = file_upd::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(Into::into))
    }

    /// Database-stored bytes of a file.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the file does not exist.
    pub async fn content(&self, id: &str) -> AppResult<(FileRecord, Vec<u8>)> {
        let model = file_upd::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| AppError::NotFound(format!("file {id}")))?;

        let content = model.file_content.clone();
        Ok((model.into(), content))
    }

    /// Most recent earlier file with the given content hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find_duplicate(&self, hash: &str) -> AppResult<Option<FileRecord>> {
        let model = file_upd::Entity::find()
            .filter(file_upd::Column::FileHash.eq(hash))
            .order_by_desc(file_upd::Column::UploadTime)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(Into::into))
    }

    /// Paginated file listing, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(
        &self,
        filter: &FileListFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<FileRecord>> {
        let query = Self::filtered(filter);

        let total = query.clone().count(&self.db).await.map_err(db_err)?;
        let models = query
            .order_by_desc(file_upd::Column::UploadTime)
            .offset(page.offset())
            .limit(page.page_size())
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(PageResponse::new(
            models.into_iter().map(Into::into).collect(),
            page,
            total,
        ))
    }

    /// Keyword search without pagination, capped at 100 rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn search(
        &self,
        keyword: &str,
        file_type: Option<&str>,
    ) -> AppResult<Vec<FileRecord>> {
        debug!(keyword, file_type, "file search");
        let filter = FileListFilter {
            file_type: file_type.map(str::to_string),
            company_id: None,
            keyword: Some(keyword.to_string()),
        };
        let models = Self::filtered(&filter)
            .order_by_desc(file_upd::Column::UploadTime)
            .limit(100)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    /// The most recently uploaded files.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn recent(&self, limit: u64) -> AppResult<Vec<FileRecord>> {
        let models = file_upd::Entity::find()
            .order_by_desc(file_upd::Column::UploadTime)
            .limit(limit.clamp(1, 100))
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    /// Aggregate counts by type tag.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn stats(&self) -> AppResult<FileStats> {
        let total = file_upd::Entity::find()
            .count(&self.db)
            .await
            .map_err(db_err)?;
        let contracts = file_upd::Entity::find()
            .filter(file_upd::Column::FileType.eq("1"))
            .count(&self.db)
            .await
            .map_err(db_err)?;
        let drawings = file_upd::Entity::find()
            .filter(file_upd::Column::FileType.eq("2"))
            .count(&self.db)
            .await
            .map_err(db_err)?;

        Ok(FileStats {
            total,
            contracts,
            drawings,
        })
    }

    /// Delete a file record and its companion contract, if any.
    ///
    /// Returns the deleted record so the caller can remove the on-disk
    /// copy afterwards. Contract rows linked to the file go with it;
    /// the company is untouched.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the file does not exist.
    pub async fn delete(&self, id: &str) -> AppResult<FileRecord> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let model = file_upd::Entity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| AppError::NotFound(format!("file {id}")))?;

        contracts::Entity::delete_many()
            .filter(contracts::Column::FileId.eq(id))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        file_upd::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        info!(id = %model.id, "file record deleted");
        Ok(model.into())
    }

    fn filtered(filter: &FileListFilter) -> sea_orm::Select<file_upd::Entity> {
        let mut query = file_upd::Entity::find();

        if let Some(file_type) = filter.file_type.as_deref() {
            query = query.filter(file_upd::Column::FileType.eq(file_type));
        }
        if let Some(company_id) = filter.company_id.as_deref() {
            query = query.filter(file_upd::Column::CompanyId.eq(company_id));
        }
        if let Some(keyword) = filter.keyword.as_deref().filter(|k| !k.trim().is_empty()) {
            let pattern = like_pattern(keyword.trim());
            query = query.filter(
                Condition::any()
                    .add(Expr::col(file_upd::Column::OriginalName).ilike(pattern.clone()))
                    .add(Expr::col(file_upd::Column::TextContent).ilike(pattern)),
            );
        }

        query
    }
}

impl ingest::FileRepository for FileRepository {
    async fn insert(&self, input: NewFileRecord) -> AppResult<FileRecord> {
        self.create(input).await
    }

    async fn find_by_hash(&self, hash: &str) -> AppResult<Option<FileRecord>> {
        self.find_duplicate(hash).await
    }
}
