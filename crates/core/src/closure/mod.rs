//! Export closures.
//!
//! An export freezes the time entries of its scope. The closure it creates
//! can later be reopened totally or partially, and exporting the same scope
//! again closes it once more under a new revision.
//!
//! # Modules
//!
//! - `scope` - Normalized scopes and fingerprints
//! - `types` - Closure records, statuses and requests
//! - `gate` - Mutation gate over covering closures
//! - `lifecycle` - Export and reopen transitions
//! - `store` - Persistence seam implemented by the db crate
//! - `manager` - Orchestration with locking, artifacts and retries

pub mod error;
pub mod gate;
pub mod lifecycle;
pub mod manager;
pub mod scope;
pub mod store;
pub mod types;

#[cfg(test)]
mod gate_props;
#[cfg(test)]
mod scope_props;

pub use error::ClosureError;
pub use gate::{BlockReason, GateDecision, MutationKind};
pub use lifecycle::ClosureLifecycle;
pub use manager::{ClosureManager, ExportOutcome};
pub use scope::{ClosureScope, EntryCoordinates, Fingerprint, ScopeDimension};
pub use store::ClosureStore;
pub use types::{
    ClosureException, ClosureStatus, ClosureVerdict, ExceptionInput, ExportClosure,
    ExportRequest, ReopenMode, ReopenRequest,
};
