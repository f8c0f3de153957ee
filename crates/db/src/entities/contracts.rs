//! `SeaORM` Entity for contracts.

use chrono::Utc;
use pactfile_core::contract::{ContractRecord, ContractStatus};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contracts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub file_id: String,
    pub company_id: String,
    pub contract_title: Option<String>,
    pub contract_amount: Option<Decimal>,
    pub paid_amount: Option<Decimal>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub final_payment_date: Option<Date>,
    pub final_payment_amount: Option<Decimal>,
    pub file_path: Option<String>,
    pub file_name: Option<String>,
    pub main_content: Option<String>,
    pub memo: Option<String>,
    pub status: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::company_mst::Entity",
        from = "Column::CompanyId",
        to = "super::company_mst::Column::Id"
    )]
    Company,
}

impl Related<super::company_mst::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Company.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ContractRecord {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            file_id: model.file_id,
            company_id: model.company_id,
            contract_title: model.contract_title,
            contract_amount: model.contract_amount,
            paid_amount: model.paid_amount,
            start_date: model.start_date,
            end_date: model.end_date,
            final_payment_date: model.final_payment_date,
            final_payment_amount: model.final_payment_amount,
            file_path: model.file_path,
            file_name: model.file_name,
            main_content: model.main_content,
            memo: model.memo,
            status: ContractStatus::parse(&model.status).unwrap_or(ContractStatus::Active),
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}
