//! Uploaded file domain types and upload validation.

pub mod types;
pub mod validator;

pub use types::{FileRecord, NewFileRecord, TypeTag};
pub use validator::UploadValidator;
