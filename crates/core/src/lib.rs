//! Core business logic for Pactfile.
//!
//! This crate contains the domain types and services for managing
//! companies, contracts, and uploaded files. It has no web or database
//! dependencies; persistence is abstracted behind repository traits that
//! the db crate implements.

pub mod company;
pub mod contract;
pub mod extract;
pub mod file;
pub mod ingest;
pub mod storage;
