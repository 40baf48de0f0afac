//! Time entries and the rules that guard them.
//!
//! # Modules
//!
//! - `types` - Entries, inputs and filters
//! - `rules` - Date parsing, positive hours and the daily limit
//! - `store` - Persistence seam implemented by the db crate
//! - `service` - Gated create, update and delete

pub mod error;
pub mod rules;
pub mod service;
pub mod store;
pub mod types;

pub use error::TimesheetError;
pub use rules::TimesheetRules;
pub use service::TimesheetService;
pub use store::TimeEntryStore;
pub use types::{TimeEntry, TimeEntryFilter, TimeEntryInput};
