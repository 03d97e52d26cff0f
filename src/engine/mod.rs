mod errors;
mod transaction_engine;
mod validation;

pub use transaction_engine::{CostResolution, SearchOutcome, SubmitOutcome, TransactionEngine};
pub use errors::{SubmitError, ValidationError};
pub use validation::validate;

/// Lifecycle of a draft inside the engine.
///
/// `Uninitialized → Ready ⇄ Submitting → Closed`. At most one outstanding
/// create/update call exists per draft: a submit while `Submitting` is
/// dropped, never double-sent.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum DraftPhase {
    Uninitialized,
    Ready,
    Submitting,
    Closed
}
