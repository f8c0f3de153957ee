//! Repository integration tests against a live Postgres.
//!
//! These need a database; run them with
//! `DATABASE_URL=postgres://... cargo test -p pactfile-db -- --ignored`.

use chrono::NaiveDate;
use pactfile_core::company::CompanyInput;
use pactfile_core::contract::ContractInput;
use pactfile_core::file::NewFileRecord;
use pactfile_shared::AppError;
use pactfile_shared::config::DatabaseConfig;
use pactfile_shared::types::PageRequest;
use rust_decimal_macros::dec;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;

use super::{CompanyRepository, ContractRepository, FileRepository};
use crate::migration::Migrator;

async fn connect() -> DatabaseConnection {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let db = crate::connect(&DatabaseConfig {
        url,
        max_connections: 5,
        min_connections: 1,
    })
    .await
    .expect("connect");
    Migrator::up(&db, None).await.expect("migrate");
    db
}

fn company_input(name: &str) -> CompanyInput {
    CompanyInput {
        company_name: name.to_string(),
        tax_id: "91330100MA27X".to_string(),
        company_address: None,
        contact_person: "Li Wei".to_string(),
        phone: "13812345678".to_string(),
        contact_person2: None,
        phone2: None,
        bank_name: "First Bank".to_string(),
        bank_account: "6222021234567890".to_string(),
        bank_code: "102100099996".to_string(),
        remarks: None,
    }
}

fn file_input(company_id: &str, hash: &str) -> NewFileRecord {
    NewFileRecord {
        company_id: company_id.to_string(),
        original_name: "agreement.pdf".to_string(),
        stored_name: format!("{hash}-stored.pdf"),
        file_type: "1".to_string(),
        file_size: 4,
        file_path: "/tmp/agreement.pdf".to_string(),
        mime_type: "application/pdf".to_string(),
        content: vec![1, 2, 3, 4],
        file_hash: hash.to_string(),
        page_count: Some(2),
        text_content: None,
        has_ocr: false,
        ocr_confidence: 0.0,
    }
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn test_company_crud_and_delete_guard() {
    let db = connect().await;
    let companies = CompanyRepository::new(db.clone());
    let files = FileRepository::new(db.clone());
    let contracts = ContractRepository::new(db);

    let name = format!("Integration Co {}", chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0));
    let company = companies.create(company_input(&name)).await.expect("create");
    assert!(company.id.starts_with("company_"));

    // Duplicate names conflict.
    let err = companies.create(company_input(&name)).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // A contract blocks deletion.
    let file = files
        .create(file_input(&company.id, &format!("{}-hash1", company.id)))
        .await
        .expect("file");
    let contract = contracts
        .create(ContractInput {
            file_id: Some(file.id.clone()),
            company_id: Some(company.id.clone()),
            contract_amount: Some(dec!(1000)),
            start_date: NaiveDate::from_ymd_opt(2026, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2026, 12, 31),
            ..ContractInput::default()
        })
        .await
        .expect("contract");
    let err = companies.delete(&company.id).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // Deleting the file cascades to the contract, then the company frees up.
    files.delete(&file.id).await.expect("delete file");
    assert!(contracts.find_by_id(&contract.id).await.expect("find").is_none());
    companies.delete(&company.id).await.expect("delete company");
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn test_file_pagination_and_duplicate_lookup() {
    let db = connect().await;
    let companies = CompanyRepository::new(db.clone());
    let files = FileRepository::new(db);

    let name = format!("Paging Co {}", chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0));
    let company = companies.create(company_input(&name)).await.expect("create");

    let hash = format!("{:0>64}", company.id);
    for _ in 0..3 {
        let mut input = file_input(&company.id, &hash);
        input.stored_name = format!("{}-{}", uuid_like(), input.stored_name);
        input.file_type = "2".to_string();
        files.create(input).await.expect("file");
    }

    // Duplicate hashes resolve to the newest file and never block inserts.
    let dup = files.find_duplicate(&hash).await.expect("dup").expect("some");
    assert_eq!(dup.file_hash, hash);

    let page = files
        .list(
            &super::file::FileListFilter {
                company_id: Some(company.id.clone()),
                ..Default::default()
            },
            &PageRequest {
                page: Some(1),
                page_size: Some(2),
            },
        )
        .await
        .expect("list");
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.meta.total, 3);
    assert_eq!(page.meta.total_pages, 2);

    // A page past the end is empty but reports the true total.
    let past = files
        .list(
            &super::file::FileListFilter {
                company_id: Some(company.id),
                ..Default::default()
            },
            &PageRequest {
                page: Some(9),
                page_size: Some(2),
            },
        )
        .await
        .expect("list");
    assert!(past.items.is_empty());
    assert_eq!(past.meta.total, 3);
}

fn uuid_like() -> String {
    format!("{:x}", std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default())
}
