//! Contract repository for database operations on `contracts`.

use chrono::Utc;
use pactfile_core::contract::{ContractInput, ContractRecord, ContractStatus, validation};
use pactfile_core::ingest::{self, NewLinkedContract};
use pactfile_shared::types::{EntityKind, PageRequest, PageResponse};
use pactfile_shared::{AppError, AppResult};
use rust_decimal::Decimal;
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

/// Filters for the contract listing endpoint.
#[derive(Debug, Clone, Default)]
pub struct ContractListFilter {
    /// Restrict to one company.
    pub company_id: Option<String>,
    /// Case-insensitive substring over title, content, memo, and file name.
    pub keyword: Option<String>,
}

/// Aggregate amounts for the contract stats endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractStats {
    /// Number of contracts in scope.
    pub total_count: u64,
    /// Sum of contract amounts.
    pub total_amount: Decimal,
    /// Sum of paid amounts.
    pub paid_amount: Decimal,
    /// `total_amount - paid_amount`.
    pub remaining_amount: Decimal,
    /// Mean contract amount, zero when there are none.
    pub average_amount: Decimal,
}

/// Contract repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct ContractRepository {
    db: DatabaseConnection,
}

impl ContractRepository {
    /// Creates a new contract repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a contract directly through the API.
    ///
    /// The caller is expected to have run
    /// [`validation::validate_create`] already; this enforces the link
    /// constraints on top: the file must be named and not yet linked.
    ///
    /// # Errors
    ///
    /// Returns `Validation` when no file id is given and `Conflict`
    /// when the file already has a contract.
    pub async fn create(&self, input: ContractInput) -> AppResult<ContractRecord> {
        let Some(file_id) = input.file_id.as_deref().filter(|id| !id.trim().is_empty()) else {
            return Err(AppError::validation("file id is required"));
        };

        let txn = self.db.begin().await.map_err(db_err)?;

        let already_linked = contracts::Entity::find()
            .filter(contracts::Column::FileId.eq(file_id))
            .count(&txn)
            .await
            .map_err(db_err)?
            > 0;
        if already_linked {
            return Err(AppError::Conflict(format!(
                "file {file_id} is already linked to a contract"
            )));
        }

        // Cache the linked file's path and name when the file exists.
        let linked_file = file_upd::Entity::find_by_id(file_id)
            .one(&txn)
            .await
            .map_err(db_err)?;

        let id = sequence::next_id(&txn, EntityKind::Contract)
            .await
            .map_err(db_err)?;
        let now = Utc::now().into();
        let model = contracts::ActiveModel {
            id: Set(id),
            file_id: Set(file_id.to_string()),
            company_id: Set(input.company_id.unwrap_or_default()),
            contract_title: Set(input.contract_title),
            contract_amount: Set(input.contract_amount),
            paid_amount: Set(input.paid_amount),
            start_date: Set(input.start_date),
            end_date: Set(input.end_date),
            final_payment_date: Set(input.final_payment_date),
            final_payment_amount: Set(input.final_payment_amount),
            file_path: Set(linked_file.as_ref().map(|f| f.file_path.clone())),
            file_name: Set(linked_file.as_ref().map(|f| f.original_name.clone())),
            main_content: Set(input.main_content),
            memo: Set(input.memo),
            status: Set(input
                .status
                .unwrap_or(ContractStatus::Active)
                .as_str()
                .to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let model = model.insert(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        info!(id = %model.id, file_id = %model.file_id, "contract created");
        Ok(model.into())
    }

    /// Create the skeletal contract for a fresh contract-document upload.
    ///
    /// All business fields start empty; status is active.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails. The upload pipeline logs
    /// and swallows it.
    pub async fn create_linked(&self, input: NewLinkedContract) -> AppResult<ContractRecord> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let id = sequence::next_id(&txn, EntityKind::Contract)
            .await
            .map_err(db_err)?;
        let now = Utc::now().into();
        let model = contracts::ActiveModel {
            id: Set(id),
            file_id: Set(input.file_id),
            company_id: Set(input.company_id),
            contract_title: Set(None),
            contract_amount: Set(None),
            paid_amount: Set(None),
            start_date: Set(None),
            end_date: Set(None),
            final_payment_date: Set(None),
            final_payment_amount: Set(None),
            file_path: Set(Some(input.file_path)),
            file_name: Set(Some(input.file_name)),
            main_content: Set(None),
            memo: Set(None),
            status: Set(ContractStatus::Active.as_str().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let model = model.insert(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        info!(id = %model.id, file_id = %model.file_id, "contract auto-linked");
        Ok(model.into())
    }

    /// Find a contract by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<ContractRecord>> {
        let model = contracts::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(Into::into))
    }

    /// Update a contract. Absent fields keep their stored values.
    ///
    /// Cross-field rules are checked against the merged state, so an
    /// update raising only `paid_amount` is still held against the
    /// stored contract amount.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the contract does not exist and
    /// `Validation` when the merged state violates a rule.
    pub async fn update(&self, id: &str, input: ContractInput) -> AppResult<ContractRecord> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let model = contracts::Entity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| AppError::NotFound(format!("contract {id}")))?;

        let merged = ContractInput {
            file_id: Some(model.file_id.clone()),
            company_id: Some(model.company_id.clone()),
            contract_title: input.contract_title.clone().or(model.contract_title.clone()),
            contract_amount: input.contract_amount.or(model.contract_amount),
            paid_amount: input.paid_amount.or(model.paid_amount),
            start_date: input.start_date.or(model.start_date),
            end_date: input.end_date.or(model.end_date),
            final_payment_date: input.final_payment_date.or(model.final_payment_date),
            final_payment_amount: input.final_payment_amount.or(model.final_payment_amount),
            main_content: input.main_content.clone().or(model.main_content.clone()),
            memo: input.memo.clone().or(model.memo.clone()),
            status: input.status,
        };
        validation::validate_rules(&merged)?;

        let mut active: contracts::ActiveModel = model.into();
        active.contract_title = Set(merged.contract_title);
        active.contract_amount = Set(merged.contract_amount);
        active.paid_amount = Set(merged.paid_amount);
        active.start_date = Set(merged.start_date);
        active.end_date = Set(merged.end_date);
        active.final_payment_date = Set(merged.final_payment_date);
        active.final_payment_amount = Set(merged.final_payment_amount);
        active.main_content = Set(merged.main_content);
        active.memo = Set(merged.memo);
        if let Some(status) = merged.status {
            active.status = Set(status.as_str().to_string());
        }
        active.updated_at = Set(Utc::now().into());
        let model = active.update(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        info!(id = %model.id, "contract updated");
        Ok(model.into())
    }

    /// Delete a contract. The linked file stays.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the contract does not exist.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let result = contracts::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("contract {id}")));
        }
        info!(id, "contract deleted");
        Ok(())
    }

    /// Paginated contract listing, most recently updated first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(
        &self,
        filter: &ContractListFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<ContractRecord>> {
        let query = Self::filtered(filter);

        let total = query.clone().count(&self.db).await.map_err(db_err)?;
        let models = query
            .order_by_desc(contracts::Column::UpdatedAt)
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
        company_id: Option<&str>,
    ) -> AppResult<Vec<ContractRecord>> {
        debug!(keyword, company_id, "contract search");
        let filter = ContractListFilter {
            company_id: company_id.map(str::to_string),
            keyword: Some(keyword.to_string()),
        };
        let models = Self::filtered(&filter)
            .order_by_desc(contracts::Column::UpdatedAt)
            .limit(100)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    /// Aggregate amounts, optionally scoped to one company.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn stats(&self, company_id: Option<&str>) -> AppResult<ContractStats> {
        let mut query = contracts::Entity::find();
        if let Some(company_id) = company_id {
            query = query.filter(contracts::Column::CompanyId.eq(company_id));
        }
        let models = query.all(&self.db).await.map_err(db_err)?;

        let total_count = models.len() as u64;
        let total_amount: Decimal = models.iter().filter_map(|m| m.contract_amount).sum();
        let paid_amount: Decimal = models.iter().filter_map(|m| m.paid_amount).sum();
        let average_amount = if total_count == 0 {
            Decimal::ZERO
        } else {
            total_amount / Decimal::from(total_count)
        };

        Ok(ContractStats {
            total_count,
            total_amount,
            paid_amount,
            remaining_amount: total_amount - paid_amount,
            average_amount,
        })
    }

    /// Active contracts ending within the next `days` days.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn expiring(&self, days: i64) -> AppResult<Vec<ContractRecord>> {
        let today = Utc::now().date_naive();
        let horizon = today + chrono::Duration::days(days.max(0));
        let models = contracts::Entity::find()
            .filter(contracts::Column::Status.eq(ContractStatus::Active.as_str()))
            .filter(contracts::Column::EndDate.gte(today))
            .filter(contracts::Column::EndDate.lte(horizon))
            .order_by_asc(contracts::Column::EndDate)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    /// Active contracts whose end date has already passed.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn overdue(&self) -> AppResult<Vec<ContractRecord>> {
        let today = Utc::now().date_naive();
        let models = contracts::Entity::find()
            .filter(contracts::Column::Status.eq(ContractStatus::Active.as_str()))
            .filter(contracts::Column::EndDate.lt(today))
            .order_by_asc(contracts::Column::EndDate)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    fn filtered(filter: &ContractListFilter) -> sea_orm::Select<contracts::Entity> {
        let mut query = contracts::Entity::find();

        if let Some(company_id) = filter.company_id.as_deref() {
            query = query.filter(contracts::Column::CompanyId.eq(company_id));
        }
        if let Some(keyword) = filter.keyword.as_deref().filter(|k| !k.trim().is_empty()) {
            let pattern = like_pattern(keyword.trim());
            query = query.filter(
                Condition::any()
                    .add(Expr::col(contracts::Column::ContractTitle).ilike(pattern.clone()))
                    .add(Expr::col(contracts::Column::MainContent).ilike(pattern.clone()))
                    .add(Expr::col(contracts::Column::Memo).ilike(pattern.clone()))
                    .add(Expr::col(contracts::Column::FileName).ilike(pattern)),
            );
        }

        query
    }
}

impl ingest::ContractLinkRepository for ContractRepository {
    async fn insert_linked(&self, input: NewLinkedContract) -> AppResult<ContractRecord> {
        self.create_linked(input).await
    }
}
