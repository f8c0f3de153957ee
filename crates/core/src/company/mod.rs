//! Company domain types and field validation.

pub mod types;
pub mod validation;

pub use types::{CompanyInput, CompanyRecord};
