//! File management routes: upload pipeline, listing, download, delete.

use std::sync::Arc;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use pactfile_core::file::{FileRecord, UploadValidator};
use pactfile_core::ingest::{IngestService, UploadCommand};
use pactfile_core::storage::StorageService;
use pactfile_db::repositories::file::FileListFilter;
use pactfile_db::{ContractRepository, FileRepository};
use pactfile_shared::types::PageRequest;
use pactfile_shared::AppError;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::response::{ApiResponse, ApiResult};
use crate::AppState;

/// Creates the file routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload))
        .route("/files", get(list))
        .route("/files/batch", post(batch_upload).delete(batch_delete))
        .route("/files/stats", get(stats))
        .route("/files/recent", get(recent))
        .route("/files/search", get(search))
        .route("/files/{id}", get(get_file).delete(delete_file))
        .route("/files/{id}/download", get(download))
        .route("/files/{id}/content", get(content))
}

/// Payload for a successful upload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadData {
    file: FileRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    contract: Option<pactfile_core::contract::ContractRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duplicate_of: Option<String>,
}

/// Per-file outcomes of a batch upload. Files are independent; one
/// rejected file never blocks the rest.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchUploadData {
    uploaded: Vec<UploadData>,
    failed: Vec<BatchUploadFailure>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchUploadFailure {
    file_name: String,
    error: String,
}

#[derive(Debug, Deserialize)]
struct BatchDeleteBody {
    #[serde(alias = "fileIds")]
    file_ids: Vec<String>,
}

/// Outcome of a file batch delete.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchDeleteData {
    deleted: Vec<String>,
    missing: Vec<String>,
}

/// Query parameters for the file listing.
#[derive(Debug, Default, Deserialize)]
struct ListQuery {
    #[serde(rename = "type")]
    file_type: Option<String>,
    search: Option<String>,
    #[serde(alias = "companyId")]
    company_id: Option<String>,
    page: Option<u64>,
    #[serde(alias = "pageSize")]
    page_size: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RecentQuery {
    limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    q: String,
    #[serde(alias = "fileType")]
    file_type: Option<String>,
}

/// POST `/upload`: run the whole ingest pipeline for one file.
///
/// Multipart fields: `file` (required), `fileType`, `companyId`, and an
/// optional `fileName` overriding the part's filename.
async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let mut content: Option<Vec<u8>> = None;
    let mut part_filename: Option<String> = None;
    let mut name_override: Option<String> = None;
    let mut file_type: Option<String> = None;
    let mut company_id: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("invalid multipart request: {e}")))?
    {
        match field.name() {
            Some("file") => {
                part_filename = field.file_name().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::validation(format!("could not read file part: {e}")))?;
                content = Some(bytes.to_vec());
            }
            Some("fileType") => file_type = Some(read_text(field).await?),
            Some("fileName") => name_override = Some(read_text(field).await?),
            Some("companyId") => company_id = Some(read_text(field).await?),
            _ => {}
        }
    }

    let content = content.ok_or_else(|| AppError::validation("file part is required"))?;
    let original_name = name_override
        .filter(|n| !n.trim().is_empty())
        .or(part_filename)
        .ok_or_else(|| AppError::validation("filename must not be empty"))?;

    let ingest = ingest_service(&state);
    let outcome = ingest
        .ingest(UploadCommand {
            original_name,
            type_tag: file_type.unwrap_or_default(),
            company_id: company_id.unwrap_or_default(),
            content,
        })
        .await?;

    Ok(ApiResponse::with_message(
        "file uploaded",
        UploadData {
            file: outcome.file,
            contract: outcome.contract,
            duplicate_of: outcome.duplicate_of,
        },
    ))
}

/// POST `/files/batch`. Runs the ingest pipeline once per `files`
/// part, sharing the `fileType` and `companyId` fields.
///
/// Always 200 when the request itself is well formed; per-file
/// problems land in the `failed` list.
async fn batch_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let mut parts: Vec<(String, Vec<u8>)> = Vec::new();
    let mut file_type: Option<String> = None;
    let mut company_id: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("invalid multipart request: {e}")))?
    {
        match field.name() {
            Some("files" | "file") => {
                let name = field.file_name().map(str::to_string).unwrap_or_default();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::validation(format!("could not read file part: {e}")))?;
                parts.push((name, bytes.to_vec()));
            }
            Some("fileType") => file_type = Some(read_text(field).await?),
            Some("companyId") => company_id = Some(read_text(field).await?),
            _ => {}
        }
    }

    if parts.is_empty() {
        return Err(AppError::validation("at least one file part is required").into());
    }

    let ingest = ingest_service(&state);
    let mut outcome = BatchUploadData {
        uploaded: Vec::new(),
        failed: Vec::new(),
    };
    for (name, content) in parts {
        let command = UploadCommand {
            original_name: name.clone(),
            type_tag: file_type.clone().unwrap_or_default(),
            company_id: company_id.clone().unwrap_or_default(),
            content,
        };
        match ingest.ingest(command).await {
            Ok(ingested) => outcome.uploaded.push(UploadData {
                file: ingested.file,
                contract: ingested.contract,
                duplicate_of: ingested.duplicate_of,
            }),
            Err(e) => outcome.failed.push(BatchUploadFailure {
                file_name: name,
                error: e.to_string(),
            }),
        }
    }

    let message = format!(
        "{} uploaded, {} failed",
        outcome.uploaded.len(),
        outcome.failed.len()
    );
    Ok(ApiResponse::with_message(message, outcome))
}

/// DELETE `/files/batch`. Deletes many files, skipping missing ids;
/// each deleted record takes its companion contract and on-disk copy
/// with it.
async fn batch_delete(
    State(state): State<AppState>,
    Json(body): Json<BatchDeleteBody>,
) -> ApiResult<impl IntoResponse> {
    if body.file_ids.is_empty() {
        return Err(AppError::validation("file_ids must not be empty").into());
    }

    let repo = FileRepository::new(state.db.clone());
    let mut outcome = BatchDeleteData::default();
    for id in body.file_ids {
        match repo.delete(&id).await {
            Ok(deleted) => {
                let key = StorageService::key_for(&deleted.file_type, &deleted.stored_name);
                if let Err(e) = state.storage.delete(&key).await {
                    warn!(key = %key, error = %e, "could not remove on-disk file");
                }
                outcome.deleted.push(deleted.id);
            }
            Err(AppError::NotFound(_)) => outcome.missing.push(id),
            Err(e) => return Err(e.into()),
        }
    }

    Ok(ApiResponse::with_message("batch delete finished", outcome))
}

/// GET `/files`: paginated listing with type, company, and keyword filters.
async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<impl IntoResponse> {
    let repo = FileRepository::new(state.db);
    let filter = FileListFilter {
        file_type: query.file_type,
        company_id: query.company_id,
        keyword: query.search,
    };
    let page = PageRequest {
        page: query.page,
        page_size: query.page_size,
    };
    let response = repo.list(&filter, &page).await?;
    Ok(ApiResponse::ok(response))
}

/// GET `/files/stats`: counts per type tag.
async fn stats(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let repo = FileRepository::new(state.db);
    Ok(ApiResponse::ok(repo.stats().await?))
}

/// GET `/files/recent`: the newest uploads.
async fn recent(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> ApiResult<impl IntoResponse> {
    let repo = FileRepository::new(state.db);
    Ok(ApiResponse::ok(repo.recent(query.limit.unwrap_or(10)).await?))
}

/// GET `/files/search`: keyword search over names and extracted text.
async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<impl IntoResponse> {
    let repo = FileRepository::new(state.db);
    let results = repo.search(&query.q, query.file_type.as_deref()).await?;
    Ok(ApiResponse::ok(results))
}

/// GET `/files/{id}`.
async fn get_file(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let repo = FileRepository::new(state.db);
    let file = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("file {id}")))?;
    Ok(ApiResponse::ok(file))
}

/// DELETE `/files/{id}`: removes the record, the companion contract,
/// and the on-disk copy.
async fn delete_file(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let repo = FileRepository::new(state.db.clone());
    let deleted = repo.delete(&id).await?;

    let key = StorageService::key_for(&deleted.file_type, &deleted.stored_name);
    if let Err(e) = state.storage.delete(&key).await {
        warn!(key = %key, error = %e, "could not remove on-disk file");
    }

    Ok(ApiResponse::with_message(
        "file deleted",
        serde_json::json!({ "id": deleted.id }),
    ))
}

/// GET `/files/{id}/download`: serve the on-disk bytes as an attachment.
async fn download(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let repo = FileRepository::new(state.db.clone());
    let file = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("file {id}")))?;

    let key = StorageService::key_for(&file.file_type, &file.stored_name);
    let bytes = state.storage.read(&key).await.map_err(AppError::from)?;

    Ok((
        [
            (header::CONTENT_TYPE, file.mime_type.clone()),
            (
                header::CONTENT_DISPOSITION,
                attachment_disposition(&file.original_name),
            ),
        ],
        bytes,
    ))
}

/// GET `/files/{id}/content`: serve the database-stored copy.
async fn content(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let repo = FileRepository::new(state.db);
    let (_, bytes) = repo.content(&id).await?;

    Ok((
        [(
            header::CONTENT_TYPE,
            "application/octet-stream".to_string(),
        )],
        bytes,
    ))
}

/// Build the ingest pipeline from request state.
pub(crate) fn ingest_service(
    state: &AppState,
) -> IngestService<FileRepository, ContractRepository> {
    IngestService::new(
        UploadValidator::new(state.upload.clone()),
        Arc::clone(&state.storage),
        Arc::new(FileRepository::new(state.db.clone())),
        Arc::new(ContractRepository::new(state.db.clone())),
    )
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::validation(format!("could not read form field: {e}")))
}

/// RFC 6266 disposition with an RFC 5987 encoded filename and an ASCII
/// fallback.
pub(crate) fn attachment_disposition(original_name: &str) -> String {
    let fallback: String = original_name
        .chars()
        .map(|c| {
            if c.is_ascii_graphic() && c != '"' || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!(
        "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
        urlencoding::encode(original_name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_disposition_ascii() {
        let disposition = attachment_disposition("report 2026.pdf");
        assert!(disposition.starts_with("attachment; filename=\"report 2026.pdf\""));
        assert!(disposition.contains("filename*=UTF-8''report%202026.pdf"));
    }

    #[test]
    fn test_attachment_disposition_non_ascii() {
        let disposition = attachment_disposition("合同.pdf");
        // ASCII fallback replaces the multibyte characters.
        assert!(disposition.contains("filename=\"__.pdf\""));
        // The encoded form keeps them, percent-escaped.
        assert!(disposition.contains("filename*=UTF-8''%E5%90%88%E5%90%8C.pdf"));
    }

    #[test]
    fn test_attachment_disposition_escapes_quotes() {
        let disposition = attachment_disposition("a\"b.pdf");
        assert!(disposition.contains("filename=\"a_b.pdf\""));
    }
}
