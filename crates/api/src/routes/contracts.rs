//! Contract management routes, including company-checked file access.

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use pactfile_core::contract::{ContractInput, validation};
use pactfile_core::storage::StorageService;
use pactfile_db::repositories::contract::ContractListFilter;
use pactfile_db::{ContractRepository, FileRepository};
use pactfile_shared::types::PageRequest;
use pactfile_shared::AppError;
use serde::Deserialize;

use crate::response::{ApiResponse, ApiResult};
use crate::routes::files::attachment_disposition;
use crate::AppState;

/// Creates the contract routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/contracts", get(list).post(create))
        .route("/contracts/search", get(search))
        .route("/contracts/stats", get(stats))
        .route("/contracts/expiring", get(expiring))
        .route("/contracts/overdue", get(overdue))
        .route(
            "/contracts/{id}",
            get(get_contract).put(update).delete(delete_contract),
        )
        .route("/contracts/{id}/download", get(download))
        .route("/contracts/files/{id}/preview", get(preview_file))
        .route("/contracts/files/{id}/content", get(file_content))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    search: Option<String>,
    #[serde(alias = "companyId")]
    company_id: Option<String>,
    page: Option<u64>,
    #[serde(alias = "pageSize")]
    page_size: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    q: String,
    #[serde(alias = "companyId")]
    company_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatsQuery {
    #[serde(alias = "companyId")]
    company_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExpiringQuery {
    days: Option<i64>,
}

/// Company claim for contract file access; a mismatch is a 403.
#[derive(Debug, Deserialize)]
struct FileAccessQuery {
    #[serde(alias = "companyId")]
    company_id: String,
}

/// GET `/contracts`: paginated listing, most recently updated first.
async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<impl IntoResponse> {
    let repo = ContractRepository::new(state.db);
    let filter = ContractListFilter {
        company_id: query.company_id,
        keyword: query.search,
    };
    let page = PageRequest {
        page: query.page,
        page_size: query.page_size,
    };
    Ok(ApiResponse::ok(repo.list(&filter, &page).await?))
}

/// POST `/contracts`: direct creation with full validation.
async fn create(
    State(state): State<AppState>,
    Json(input): Json<ContractInput>,
) -> ApiResult<impl IntoResponse> {
    validation::validate_create(&input)?;
    let repo = ContractRepository::new(state.db);
    let contract = repo.create(input).await?;
    Ok(ApiResponse::with_message("contract created", contract))
}

/// GET `/contracts/search?q=&companyId=`.
async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<impl IntoResponse> {
    let repo = ContractRepository::new(state.db);
    let results = repo.search(&query.q, query.company_id.as_deref()).await?;
    Ok(ApiResponse::ok(results))
}

/// GET `/contracts/stats?companyId=`: amount totals and averages.
async fn stats(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> ApiResult<impl IntoResponse> {
    let repo = ContractRepository::new(state.db);
    Ok(ApiResponse::ok(
        repo.stats(query.company_id.as_deref()).await?,
    ))
}

/// GET `/contracts/expiring?days=30`: active contracts ending soon.
async fn expiring(
    State(state): State<AppState>,
    Query(query): Query<ExpiringQuery>,
) -> ApiResult<impl IntoResponse> {
    let repo = ContractRepository::new(state.db);
    Ok(ApiResponse::ok(
        repo.expiring(query.days.unwrap_or(30)).await?,
    ))
}

/// GET `/contracts/overdue`: active contracts past their end date.
async fn overdue(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let repo = ContractRepository::new(state.db);
    Ok(ApiResponse::ok(repo.overdue().await?))
}

/// GET `/contracts/{id}`.
async fn get_contract(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let repo = ContractRepository::new(state.db);
    let contract = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("contract {id}")))?;
    Ok(ApiResponse::ok(contract))
}

/// PUT `/contracts/{id}`: partial update; rules run on the merged state.
async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<ContractInput>,
) -> ApiResult<impl IntoResponse> {
    let repo = ContractRepository::new(state.db);
    let contract = repo.update(&id, input).await?;
    Ok(ApiResponse::with_message("contract updated", contract))
}

/// DELETE `/contracts/{id}`: the linked file stays.
async fn delete_contract(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let repo = ContractRepository::new(state.db);
    repo.delete(&id).await?;
    Ok(ApiResponse::with_message(
        "contract deleted",
        serde_json::json!({ "id": id }),
    ))
}

/// GET `/contracts/{id}/download`. Serves the linked file's on-disk
/// bytes as an attachment.
async fn download(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let repo = ContractRepository::new(state.db.clone());
    let contract = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("contract {id}")))?;

    let files = FileRepository::new(state.db.clone());
    let file = files
        .find_by_id(&contract.file_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("file {} for contract {id}", contract.file_id)))?;

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

/// GET `/contracts/files/{id}/preview?companyId=`: inline PDF preview
/// from disk, only for the owning company.
async fn preview_file(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(access): Query<FileAccessQuery>,
) -> ApiResult<impl IntoResponse> {
    let file = checked_file(&state, &id, &access.company_id).await?;
    if file.mime_type != "application/pdf" {
        return Err(AppError::validation("preview is only available for PDF files").into());
    }

    let key = StorageService::key_for(&file.file_type, &file.stored_name);
    let bytes = state.storage.read(&key).await.map_err(AppError::from)?;

    Ok((
        [
            (header::CONTENT_TYPE, file.mime_type.clone()),
            (header::CONTENT_DISPOSITION, "inline".to_string()),
        ],
        bytes,
    ))
}

/// GET `/contracts/files/{id}/content?companyId=`: database-stored
/// bytes as an attachment, only for the owning company.
async fn file_content(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(access): Query<FileAccessQuery>,
) -> ApiResult<impl IntoResponse> {
    let file = checked_file(&state, &id, &access.company_id).await?;

    let repo = FileRepository::new(state.db.clone());
    let (_, bytes) = repo.content(&file.id).await?;

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

/// Load a file and verify the caller's company claim.
async fn checked_file(
    state: &AppState,
    file_id: &str,
    company_id: &str,
) -> Result<pactfile_core::file::FileRecord, AppError> {
    let repo = FileRepository::new(state.db.clone());
    let file = repo
        .find_by_id(file_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("file {file_id}")))?;

    if file.company_id != company_id {
        return Err(AppError::Forbidden(format!(
            "file {file_id} does not belong to company {company_id}"
        )));
    }

    Ok(file)
}
