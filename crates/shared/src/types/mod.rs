//! Common types used across the application.

pub mod id;
pub mod pagination;

pub use id::EntityKind;
pub use pagination::{PageMeta, PageRequest, PageResponse};
