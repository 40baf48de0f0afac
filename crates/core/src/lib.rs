//! Core business logic for Ziklo.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and workflow decisions live here.
//!
//! # Modules
//!
//! - `closure` - Export closures: fingerprints, mutation gate, reopen lifecycle
//! - `timesheet` - Time entry validation and gated writes
//! - `export` - Rendering export artifacts
//! - `storage` - Artifact storage via Apache OpenDAL

pub mod closure;
pub mod export;
pub mod storage;
pub mod timesheet;

#[cfg(test)]
mod testing;
