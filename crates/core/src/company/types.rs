//! Company domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A client company with its banking details.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyRecord {
    /// Human-readable id, e.g. `company_00001`.
    pub id: String,
    /// Company name, unique.
    pub company_name: String,
    /// Tax registration number.
    pub tax_id: String,
    /// Registered address.
    pub company_address: Option<String>,
    /// Primary contact name.
    pub contact_person: String,
    /// Primary contact phone.
    pub phone: String,
    /// Secondary contact name.
    pub contact_person2: Option<String>,
    /// Secondary contact phone.
    pub phone2: Option<String>,
    /// Bank name for payments.
    pub bank_name: String,
    /// Bank account number.
    pub bank_account: String,
    /// Bank routing code.
    pub bank_code: String,
    /// Free-form notes.
    pub remarks: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating or updating a company.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInput {
    /// Company name, unique.
    pub company_name: String,
    /// Tax registration number, at least 5 characters.
    pub tax_id: String,
    /// Registered address.
    #[serde(default)]
    pub company_address: Option<String>,
    /// Primary contact name.
    pub contact_person: String,
    /// Primary contact phone.
    pub phone: String,
    /// Secondary contact name.
    #[serde(default)]
    pub contact_person2: Option<String>,
    /// Secondary contact phone.
    #[serde(default)]
    pub phone2: Option<String>,
    /// Bank name for payments.
    pub bank_name: String,
    /// Bank account number, digits only.
    pub bank_account: String,
    /// Bank routing code, exactly 12 digits.
    pub bank_code: String,
    /// Free-form notes.
    #[serde(default)]
    pub remarks: Option<String>,
}
