//! `SeaORM` Entity for uploaded files.
//!
//! `file_content` keeps a redundant copy of the bytes in the database;
//! the authoritative copy lives on disk at `file_path`.

use chrono::Utc;
use pactfile_core::file::FileRecord;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "file_upd")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub company_id: String,
    pub original_name: String,
    #[sea_orm(unique)]
    pub stored_name: String,
    pub file_type: String,
    pub file_size: i64,
    pub file_path: String,
    pub mime_type: String,
    #[serde(skip)]
    pub file_content: Vec<u8>,
    pub file_hash: String,
    pub page_count: Option<i32>,
    pub text_content: Option<String>,
    pub has_ocr: bool,
    #[sea_orm(column_type = "Float")]
    pub ocr_confidence: f32,
    pub upload_time: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for FileRecord {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            company_id: model.company_id,
            original_name: model.original_name,
            stored_name: model.stored_name,
            file_type: model.file_type,
            file_size: model.file_size,
            file_path: model.file_path,
            mime_type: model.mime_type,
            file_hash: model.file_hash,
            page_count: model.page_count,
            text_content: model.text_content,
            has_ocr: model.has_ocr,
            ocr_confidence: model.ocr_confidence,
            upload_time: model.upload_time.with_timezone(&Utc),
        }
    }
}
