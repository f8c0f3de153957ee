//! Initial schema: companies, contracts, uploaded files, id counters.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(INITIAL_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "DROP TABLE IF EXISTS contracts CASCADE;\n\
             DROP TABLE IF EXISTS file_upd CASCADE;\n\
             DROP TABLE IF EXISTS company_mst CASCADE;\n\
             DROP TABLE IF EXISTS id_counters CASCADE;",
        )
        .await?;
        Ok(())
    }
}

const INITIAL_SQL: &str = r"
-- Company master data, including banking details
CREATE TABLE company_mst (
    id VARCHAR(32) PRIMARY KEY,
    company_name VARCHAR(255) NOT NULL UNIQUE,
    tax_id VARCHAR(64) NOT NULL,
    company_address TEXT,
    contact_person VARCHAR(128) NOT NULL,
    phone VARCHAR(32) NOT NULL,
    contact_person2 VARCHAR(128),
    phone2 VARCHAR(32),
    bank_name VARCHAR(255) NOT NULL,
    bank_account VARCHAR(30) NOT NULL,
    bank_code VARCHAR(12) NOT NULL,
    remarks TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_company_mst_name ON company_mst(company_name);
CREATE INDEX idx_company_mst_created ON company_mst(created_at DESC);

-- Uploaded files; bytes are kept both on disk (file_path) and in file_content
CREATE TABLE file_upd (
    id VARCHAR(32) PRIMARY KEY,
    company_id VARCHAR(32) NOT NULL,
    original_name VARCHAR(512) NOT NULL,
    stored_name VARCHAR(128) NOT NULL UNIQUE,
    file_type VARCHAR(8) NOT NULL,
    file_size BIGINT NOT NULL,
    file_path TEXT NOT NULL,
    mime_type VARCHAR(128) NOT NULL,
    file_content BYTEA NOT NULL,
    file_hash VARCHAR(64) NOT NULL,
    page_count INTEGER,
    text_content TEXT,
    has_ocr BOOLEAN NOT NULL DEFAULT FALSE,
    ocr_confidence REAL NOT NULL DEFAULT 0.0,
    upload_time TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- Duplicate detection is a lookup, not a constraint: identical content
-- is allowed to exist under several records.
CREATE INDEX idx_file_upd_hash ON file_upd(file_hash);
CREATE INDEX idx_file_upd_company ON file_upd(company_id, upload_time DESC);
CREATE INDEX idx_file_upd_type ON file_upd(file_type, upload_time DESC);

-- Contracts; one per file, removed with their company
CREATE TABLE contracts (
    id VARCHAR(32) PRIMARY KEY,
    file_id VARCHAR(32) NOT NULL UNIQUE,
    company_id VARCHAR(32) NOT NULL REFERENCES company_mst(id) ON DELETE CASCADE,
    contract_title VARCHAR(512),
    contract_amount NUMERIC(18, 2),
    paid_amount NUMERIC(18, 2),
    start_date DATE,
    end_date DATE,
    final_payment_date DATE,
    final_payment_amount NUMERIC(18, 2),
    file_path TEXT,
    file_name VARCHAR(512),
    main_content TEXT,
    memo TEXT,
    status VARCHAR(16) NOT NULL DEFAULT 'active',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_contracts_status CHECK (status IN ('active', 'completed', 'terminated'))
);

CREATE INDEX idx_contracts_company ON contracts(company_id, updated_at DESC);
CREATE INDEX idx_contracts_status_end ON contracts(status, end_date);

-- Sequential id allocation, one locked row per entity kind
CREATE TABLE id_counters (
    entity VARCHAR(16) PRIMARY KEY,
    value BIGINT NOT NULL DEFAULT 0
);

INSERT INTO id_counters (entity, value) VALUES
    ('file', 0),
    ('contract', 0),
    ('company', 0);
";
