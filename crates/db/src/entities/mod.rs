//! `SeaORM` entity definitions.

pub mod audit_log;
pub mod concepts;
pub mod cost_centers;
pub mod engineers;
pub mod export_closures;
pub mod projects;
pub mod time_entries;
pub mod users;
