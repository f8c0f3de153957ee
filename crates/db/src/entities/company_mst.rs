//! `SeaORM` Entity for the company master table.

use chrono::Utc;
use pactfile_core::company::CompanyRecord;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "company_mst")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub company_name: String,
    pub tax_id: String,
    pub company_address: Option<String>,
    pub contact_person: String,
    pub phone: String,
    pub contact_person2: Option<String>,
    pub phone2: Option<String>,
    pub bank_name: String,
    pub bank_account: String,
    pub bank_code: String,
    pub remarks: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::contracts::Entity")]
    Contracts,
}

impl Related<super::contracts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contracts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for CompanyRecord {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            company_name: model.company_name,
            tax_id: model.tax_id,
            company_address: model.company_address,
            contact_person: model.contact_person,
            phone: model.phone,
            contact_person2: model.contact_person2,
            phone2: model.phone2,
            bank_name: model.bank_name,
            bank_account: model.bank_account,
            bank_code: model.bank_code,
            remarks: model.remarks,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}
