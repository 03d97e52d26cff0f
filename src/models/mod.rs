mod asset;
mod draft;
mod errors;
mod line_item;
mod transaction;

use serde::{Deserialize, Serialize};

pub use asset::{Asset, AssetSnapshot, AverageCostQuote, Warehouse};
pub use draft::TransactionDraft;
pub use errors::DraftError;
pub use line_item::{LineItem, LinePatch, SearchState, StockStatus};
pub use transaction::{AssetTransactionRecord, Transaction};

/// Fixed inbound/outbound classification of a transaction.
///
/// Stamped onto the draft when it is opened and immutable for its lifetime.
/// Determines whether unit cost is entered manually (`In`) or resolved
/// server-side from historical average cost (`Out`).
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    In,
    Out
}

/// Whether the draft composes a new transaction or corrects a posted one.
///
/// In `Edit` mode line items are immutable ledger facts: only descriptive
/// metadata may change, and the lines are display data.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum DraftMode {
    Create,
    Edit
}
