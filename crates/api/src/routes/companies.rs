//! Company management routes.

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::{delete, get};
use axum::{Json, Router};
use pactfile_core::company::{CompanyRecord, CompanyInput, validation};
use pactfile_db::CompanyRepository;
use pactfile_shared::types::PageRequest;
use pactfile_shared::AppError;
use serde::Deserialize;

use crate::response::{ApiResponse, ApiResult};
use crate::AppState;

/// Creates the company routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/companies", get(list).post(create))
        .route("/companies/search", get(search))
        .route("/companies/stats", get(stats))
        .route("/companies/export", get(export))
        .route("/companies/list", get(list_slim))
        .route("/companies/batch", delete(batch_delete))
        .route(
            "/companies/{id}",
            get(get_company).put(update).delete(delete_company),
        )
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    search: Option<String>,
    page: Option<u64>,
    #[serde(alias = "pageSize")]
    page_size: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    q: String,
}

#[derive(Debug, Deserialize)]
struct BatchDeleteBody {
    #[serde(alias = "companyIds")]
    company_ids: Vec<String>,
}

/// GET `/companies`: paginated listing, newest first.
async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<impl IntoResponse> {
    let repo = CompanyRepository::new(state.db);
    let page = PageRequest {
        page: query.page,
        page_size: query.page_size,
    };
    let response = repo.list(query.search.as_deref(), &page).await?;
    Ok(ApiResponse::ok(response))
}

/// POST `/companies`.
async fn create(
    State(state): State<AppState>,
    Json(input): Json<CompanyInput>,
) -> ApiResult<impl IntoResponse> {
    validation::validate(&input)?;
    let repo = CompanyRepository::new(state.db);
    let company = repo.create(input).await?;
    Ok(ApiResponse::with_message("company created", company))
}

/// GET `/companies/search?q=`: keyword search over all text columns.
async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<impl IntoResponse> {
    let repo = CompanyRepository::new(state.db);
    Ok(ApiResponse::ok(repo.search(&query.q).await?))
}

/// GET `/companies/stats`: totals for dashboards.
async fn stats(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let repo = CompanyRepository::new(state.db);
    Ok(ApiResponse::ok(repo.stats().await?))
}

/// GET `/companies/export`: all companies as a CSV attachment.
async fn export(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let repo = CompanyRepository::new(state.db);
    let companies = repo.list_all().await?;
    let csv = to_csv(&companies);

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"companies.csv\"".to_string(),
            ),
        ],
        csv,
    ))
}

/// GET `/companies/list`: slim id/name pairs for dropdowns.
async fn list_slim(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let repo = CompanyRepository::new(state.db);
    Ok(ApiResponse::ok(repo.list_slim().await?))
}

/// DELETE `/companies/batch`: delete many, skipping companies that
/// still have contracts.
async fn batch_delete(
    State(state): State<AppState>,
    Json(body): Json<BatchDeleteBody>,
) -> ApiResult<impl IntoResponse> {
    if body.company_ids.is_empty() {
        return Err(AppError::validation("company_ids must not be empty").into());
    }
    let repo = CompanyRepository::new(state.db);
    let outcome = repo.batch_delete(&body.company_ids).await?;
    Ok(ApiResponse::with_message("batch delete finished", outcome))
}

/// GET `/companies/{id}`.
async fn get_company(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let repo = CompanyRepository::new(state.db);
    let company = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("company {id}")))?;
    Ok(ApiResponse::ok(company))
}

/// PUT `/companies/{id}`.
async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<CompanyInput>,
) -> ApiResult<impl IntoResponse> {
    validation::validate(&input)?;
    let repo = CompanyRepository::new(state.db);
    let company = repo.update(&id, input).await?;
    Ok(ApiResponse::with_message("company updated", company))
}

/// DELETE `/companies/{id}`: blocked while contracts reference it.
async fn delete_company(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let repo = CompanyRepository::new(state.db);
    repo.delete(&id).await?;
    Ok(ApiResponse::with_message(
        "company deleted",
        serde_json::json!({ "id": id }),
    ))
}

/// Render companies as CSV with a header row.
fn to_csv(companies: &[CompanyRecord]) -> String {
    let mut out = String::from(
        "id,company_name,tax_id,company_address,contact_person,phone,\
         contact_person2,phone2,bank_name,bank_account,bank_code,remarks,created_at\n",
    );
    for company in companies {
        let row = [
            company.id.as_str(),
            company.company_name.as_str(),
            company.tax_id.as_str(),
            company.company_address.as_deref().unwrap_or(""),
            company.contact_person.as_str(),
            company.phone.as_str(),
            company.contact_person2.as_deref().unwrap_or(""),
            company.phone2.as_deref().unwrap_or(""),
            company.bank_name.as_str(),
            company.bank_account.as_str(),
            company.bank_code.as_str(),
            company.remarks.as_deref().unwrap_or(""),
        ];
        let created = company.created_at.to_rfc3339();
        let mut fields: Vec<String> = row.iter().map(|f| csv_escape(f)).collect();
        fields.push(csv_escape(&created));
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    out
}

fn csv_escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_escape() {
        assert_eq!(csv_escape("plain"), "plain");
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_escape("line\nbreak"), "\"line\nbreak\"");
    }

    #[test]
    fn test_to_csv_header_and_rows() {
        let company = CompanyRecord {
            id: "company_00001".to_string(),
            company_name: "Acme, Inc".to_string(),
            tax_id: "91330100".to_string(),
            company_address: None,
            contact_person: "Li Wei".to_string(),
            phone: "13812345678".to_string(),
            contact_person2: None,
            phone2: None,
            bank_name: "First Bank".to_string(),
            bank_account: "6222".to_string(),
            bank_code: "102100099996".to_string(),
            remarks: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        let csv = to_csv(&[company]);
        let mut lines = csv.lines();
        assert!(lines.next().expect("header").starts_with("id,company_name"));
        let row = lines.next().expect("row");
        assert!(row.starts_with("company_00001,\"Acme, Inc\""));
    }
}
