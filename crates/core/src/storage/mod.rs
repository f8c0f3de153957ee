//! Local disk storage for uploaded files.

pub mod error;
pub mod service;

pub use error::StorageError;
pub use service::{StorageService, StoredFile};
