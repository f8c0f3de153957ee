//! The upload pipeline: validate, store, extract, persist, auto-link.

pub mod service;
pub mod types;

pub use service::{ContractLinkRepository, FileRepository, IngestService};
pub use types::{IngestOutcome, NewLinkedContract, UploadCommand};
