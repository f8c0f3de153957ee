//! Shared types, errors, and configuration for Pactfile.
//!
//! This crate provides common types used across all other crates:
//! - Human-readable entity ids (`file_001`, `contract_001`, `company_00001`)
//! - Pagination types for list endpoints
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
