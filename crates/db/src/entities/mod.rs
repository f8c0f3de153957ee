//! `SeaORM` entity definitions.

pub mod company_mst;
pub mod contracts;
pub mod file_upd;
pub mod id_counters;
