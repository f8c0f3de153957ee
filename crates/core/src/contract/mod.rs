//! Contract domain types and business-rule validation.

pub mod types;
pub mod validation;

pub use types::{ContractInput, ContractRecord, ContractStatus};
