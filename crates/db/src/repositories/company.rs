//! Company repository for database operations on `company_mst`.

use chrono::{Duration, Utc};
use pactfile_core::company::{CompanyInput, CompanyRecord};
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
use crate::entities::{company_mst, contracts};

/// Aggregate counts for the company stats endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyStats {
    /// All companies.
    pub total: u64,
    /// Companies created in the last 30 days.
    pub recent: u64,
}

/// Slim company listing for dropdowns.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanySummary {
    /// Company id.
    pub id: String,
    /// Company name.
    pub company_name: String,
}

/// Outcome of a batch delete: some companies may be skipped because
/// contracts still reference them.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchDeleteOutcome {
    /// Ids that were deleted.
    pub deleted: Vec<String>,
    /// Ids that were skipped because contracts reference them.
    pub blocked: Vec<String>,
    /// Ids that did not exist.
    pub missing: Vec<String>,
}

/// Company repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct CompanyRepository {
    db: DatabaseConnection,
}

impl CompanyRepository {
    /// Creates a new company repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a company.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the name is already taken.
    pub async fn create(&self, input: CompanyInput) -> AppResult<CompanyRecord> {
        let txn = self.db.begin().await.map_err(db_err)?;

        if Self::name_taken(&txn, &input.company_name, None).await? {
            return Err(AppError::Conflict(format!(
                "company '{}' already exists",
                input.company_name.trim()
            )));
        }

        let id = sequence::next_id(&txn, EntityKind::Company)
            .await
            .map_err(db_err)?;
        let now = Utc::now().into();
        let model = company_mst::ActiveModel {
            id: Set(id),
            company_name: Set(input.company_name.trim().to_string()),
            tax_id: Set(input.tax_id.trim().to_string()),
            company_address: Set(input.company_address),
            contact_person: Set(input.contact_person.trim().to_string()),
            phone: Set(input.phone.trim().to_string()),
            contact_person2: Set(input.contact_person2),
            phone2: Set(input.phone2),
            bank_name: Set(input.bank_name.trim().to_string()),
            bank_account: Set(input.bank_account.trim().to_string()),
            bank_code: Set(input.bank_code.trim().to_string()),
            remarks: Set(input.remarks),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let model = model.insert(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        info!(id = %model.id, name = %model.company_name, "company created");
        Ok(model.into())
    }

    /// Find a company by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<CompanyRecord>> {
        let model = company_mst::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(Into::into))
    }

    /// Update a company. All fields are replaced.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the company does not exist and `Conflict`
    /// if the new name belongs to another company.
    pub async fn update(&self, id: &str, input: CompanyInput) -> AppResult<CompanyRecord> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let model = company_mst::Entity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| AppError::NotFound(format!("company {id}")))?;

        if Self::name_taken(&txn, &input.company_name, Some(id)).await? {
            return Err(AppError::Conflict(format!(
                "company '{}' already exists",
                input.company_name.trim()
            )));
        }

        let mut active: company_mst::ActiveModel = model.into();
        active.company_name = Set(input.company_name.trim().to_string());
        active.tax_id = Set(input.tax_id.trim().to_string());
        active.company_address = Set(input.company_address);
        active.contact_person = Set(input.contact_person.trim().to_string());
        active.phone = Set(input.phone.trim().to_string());
        active.contact_person2 = Set(input.contact_person2);
        active.phone2 = Set(input.phone2);
        active.bank_name = Set(input.bank_name.trim().to_string());
        active.bank_account = Set(input.bank_account.trim().to_string());
        active.bank_code = Set(input.bank_code.trim().to_string());
        active.remarks = Set(input.remarks);
        active.updated_at = Set(Utc::now().into());
        let model = active.update(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        info!(id = %model.id, "company updated");
        Ok(model.into())
    }

    /// Delete a company.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if it does not exist and `Conflict` while any
    /// contract still references it.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let exists = company_mst::Entity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(db_err)?
            .is_some();
        if !exists {
            return Err(AppError::NotFound(format!("company {id}")));
        }

        if Self::contract_count(&txn, id).await? > 0 {
            return Err(AppError::Conflict(format!(
                "company {id} still has contracts and cannot be deleted"
            )));
        }

        company_mst::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(db_err)?;
        txn.commit().await.map_err(db_err)?;
        info!(id, "company deleted");
        Ok(())
    }

    /// Delete several companies, skipping those with contracts.
    ///
    /// # Errors
    ///
    /// Returns an error only for database failures; per-company
    /// outcomes are reported in the result.
    pub async fn batch_delete(&self, ids: &[String]) -> AppResult<BatchDeleteOutcome> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let mut outcome = BatchDeleteOutcome {
            deleted: Vec::new(),
            blocked: Vec::new(),
            missing: Vec::new(),
        };

        for id in ids {
            let exists = company_mst::Entity::find_by_id(id)
                .one(&txn)
                .await
                .map_err(db_err)?
                .is_some();
            if !exists {
                outcome.missing.push(id.clone());
                continue;
            }
            if Self::contract_count(&txn, id).await? > 0 {
                outcome.blocked.push(id.clone());
                continue;
            }
            company_mst::Entity::delete_by_id(id)
                .exec(&txn)
                .await
                .map_err(db_err)?;
            outcome.deleted.push(id.clone());
        }

        txn.commit().await.map_err(db_err)?;
        info!(
            deleted = outcome.deleted.len(),
            blocked = outcome.blocked.len(),
            missing = outcome.missing.len(),
            "company batch delete finished"
        );
        Ok(outcome)
    }

    /// Paginated company listing, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(
        &self,
        keyword: Option<&str>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<CompanyRecord>> {
        let query = Self::filtered(keyword);

        let total = query.clone().count(&self.db).await.map_err(db_err)?;
        let models = query
            .order_by_desc(company_mst::Column::CreatedAt)
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
    pub async fn search(&self, keyword: &str) -> AppResult<Vec<CompanyRecord>> {
        debug!(keyword, "company search");
        let models = Self::filtered(Some(keyword))
            .order_by_desc(company_mst::Column::CreatedAt)
            .limit(100)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    /// Every company, newest first. Used for the CSV export.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_all(&self) -> AppResult<Vec<CompanyRecord>> {
        let models = company_mst::Entity::find()
            .order_by_desc(company_mst::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    /// Slim id/name listing for selection dropdowns, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_slim(&self) -> AppResult<Vec<CompanySummary>> {
        let models = company_mst::Entity::find()
            .order_by_asc(company_mst::Column::CompanyName)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models
            .into_iter()
            .map(|m| CompanySummary {
                id: m.id,
                company_name: m.company_name,
            })
            .collect())
    }

    /// Aggregate counts for dashboards.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn stats(&self) -> AppResult<CompanyStats> {
        let total = company_mst::Entity::find()
            .count(&self.db)
            .await
            .map_err(db_err)?;
        let cutoff: sea_orm::prelude::DateTimeWithTimeZone = (Utc::now() - Duration::days(30)).into();
        let recent = company_mst::Entity::find()
            .filter(company_mst::Column::CreatedAt.gte(cutoff))
            .count(&self.db)
            .await
            .map_err(db_err)?;

        Ok(CompanyStats { total, recent })
    }

    async fn name_taken<C: sea_orm::ConnectionTrait>(
        conn: &C,
        name: &str,
        exclude_id: Option<&str>,
    ) -> AppResult<bool> {
        let mut query = company_mst::Entity::find()
            .filter(company_mst::Column::CompanyName.eq(name.trim()));
        if let Some(id) = exclude_id {
            query = query.filter(company_mst::Column::Id.ne(id));
        }
        let count = query.count(conn).await.map_err(db_err)?;
        Ok(count > 0)
    }

    async fn contract_count<C: sea_orm::ConnectionTrait>(conn: &C, id: &str) -> AppResult<u64> {
        contracts::Entity::find()
            .filter(contracts::Column::CompanyId.eq(id))
            .count(conn)
            .await
            .map_err(db_err)
    }

    fn filtered(keyword: Option<&str>) -> sea_orm::Select<company_mst::Entity> {
        let mut query = company_mst::Entity::find();

        if let Some(keyword) = keyword.filter(|k| !k.trim().is_empty()) {
            let pattern = like_pattern(keyword.trim());
            query = query.filter(
                Condition::any()
                    .add(Expr::col(company_mst::Column::CompanyName).ilike(pattern.clone()))
                    .add(Expr::col(company_mst::Column::CompanyAddress).ilike(pattern.clone()))
                    .add(Expr::col(company_mst::Column::ContactPerson).ilike(pattern.clone()))
                    .add(Expr::col(company_mst::Column::Phone).ilike(pattern.clone()))
                    .add(Expr::col(company_mst::Column::TaxId).ilike(pattern.clone()))
                    .add(Expr::col(company_mst::Column::BankName).ilike(pattern.clone()))
                    .add(Expr::col(company_mst::Column::BankAccount).ilike(pattern.clone()))
                    .add(Expr::col(company_mst::Column::Remarks).ilike(pattern)),
            );
        }

        query
    }
}
