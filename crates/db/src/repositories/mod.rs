//! Repository abstractions for data access.

pub mod company;
pub mod contract;
pub mod file;
pub mod sequence;

#[cfg(test)]
mod integration_tests;

pub use company::CompanyRepository;
pub use contract::ContractRepository;
pub use file::FileRepository;

use pactfile_shared::AppError;
use sea_orm::DbErr;

/// Map a database error into the application error taxonomy.
pub(crate) fn db_err(err: DbErr) -> AppError {
    AppError::Database(err.to_string())
}

/// Escape LIKE metacharacters and wrap in `%...%` for substring match.
pub(crate) fn like_pattern(keyword: &str) -> String {
    let escaped = keyword
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}
