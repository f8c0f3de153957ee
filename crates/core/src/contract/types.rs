//! Contract domain types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractStatus {
    /// Work in progress. Initial status for every contract.
    Active,
    /// Fully delivered and settled.
    Completed,
    /// Ended early.
    Terminated,
}

impl ContractStatus {
    /// Wire/database form of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Terminated => "terminated",
        }
    }

    /// Parses the wire form.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "completed" => Some(Self::Completed),
            "terminated" => Some(Self::Terminated),
            _ => None,
        }
    }
}

/// A contract record. At most one per uploaded file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractRecord {
    /// Human-readable id, e.g. `contract_001`.
    pub id: String,
    /// Linked uploaded file id, unique across contracts.
    pub file_id: String,
    /// Owning company id.
    pub company_id: String,
    /// Contract title.
    pub contract_title: Option<String>,
    /// Total contract amount.
    pub contract_amount: Option<Decimal>,
    /// Amount paid so far, never above `contract_amount`.
    pub paid_amount: Option<Decimal>,
    /// Contract start date.
    pub start_date: Option<NaiveDate>,
    /// Contract end date, never before `start_date`.
    pub end_date: Option<NaiveDate>,
    /// Date of the final payment.
    pub final_payment_date: Option<NaiveDate>,
    /// Amount of the final payment.
    pub final_payment_amount: Option<Decimal>,
    /// Cached path of the linked file.
    pub file_path: Option<String>,
    /// Cached original name of the linked file.
    pub file_name: Option<String>,
    /// Summary of the contract content.
    pub main_content: Option<String>,
    /// Free-form notes.
    pub memo: Option<String>,
    /// Lifecycle status.
    pub status: ContractStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating or updating a contract through the API.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractInput {
    /// Linked uploaded file id.
    #[serde(default)]
    pub file_id: Option<String>,
    /// Owning company id.
    #[serde(default)]
    pub company_id: Option<String>,
    /// Contract title.
    #[serde(default)]
    pub contract_title: Option<String>,
    /// Total contract amount.
    #[serde(default)]
    pub contract_amount: Option<Decimal>,
    /// Amount paid so far.
    #[serde(default)]
    pub paid_amount: Option<Decimal>,
    /// Contract start date.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Contract end date.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Date of the final payment.
    #[serde(default)]
    pub final_payment_date: Option<NaiveDate>,
    /// Amount of the final payment.
    #[serde(default)]
    pub final_payment_amount: Option<Decimal>,
    /// Summary of the contract content.
    #[serde(default)]
    pub main_content: Option<String>,
    /// Free-form notes.
    #[serde(default)]
    pub memo: Option<String>,
    /// Lifecycle status.
    #[serde(default)]
    pub status: Option<ContractStatus>,
}
