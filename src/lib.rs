//! Stateful draft engine for fixed-asset inventory transactions.
//!
//! The engine owns an in-progress transaction draft (metadata plus an ordered
//! set of line items), runs the per-line asset-selection workflow against
//! injected async collaborators (asset search, average-cost lookup), and
//! coordinates validated create/update submissions. Transport, auth storage
//! and rendering are the caller's problem; they reach the engine only through
//! the trait seams in [`api`].

pub mod api;
pub mod engine;
pub mod models;
pub mod types;

pub use api::{
    ApiError, AssetDirectory, Attachment, CreateTransactionPayload, CredentialProvider,
    LineItemPayload, SessionToken, TransactionGateway, UpdateTransactionPayload,
    WarehouseDirectory,
};
pub use engine::{
    CostResolution, DraftPhase, SearchOutcome, SubmitError, SubmitOutcome, TransactionEngine,
    ValidationError,
};
pub use models::{
    Asset, AssetSnapshot, AverageCostQuote, Direction, DraftError, DraftMode, LineItem, LinePatch,
    StockStatus, Transaction, TransactionDraft, Warehouse,
};
pub use types::{AssetId, LineId, TransactionId, WarehouseId};
