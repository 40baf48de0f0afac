//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! `ClosureRepository` and `TimeEntryRepository` implement the core store traits.

pub mod audit;
pub mod catalog;
pub mod closure;
pub mod time_entry;

pub use audit::{AuditAction, AuditRecord, AuditRepository};
pub use catalog::{
    CatalogError, CatalogRepository, NewConcept, NewCostCenter, NewEngineer, NewProject, NewUser,
};
pub use closure::ClosureRepository;
pub use time_entry::TimeEntryRepository;
