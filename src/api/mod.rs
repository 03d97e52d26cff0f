mod errors;
mod payloads;

use async_trait::async_trait;

use crate::models::{Asset, AverageCostQuote, Transaction, Warehouse};
use crate::types::{AssetId, TransactionId};

pub use errors::ApiError;
pub use payloads::{
    Attachment, CreateTransactionPayload, LineItemPayload, UpdateTransactionPayload,
};

/// Page size requested from the asset-search collaborator.
pub const SEARCH_PAGE_SIZE: u32 = 20;

/// Ambient session credential, resolved per call rather than read from
/// global state.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SessionToken(pub String);

/// Supplies the session token the engine's external calls depend on.
///
/// Injected so the engine never reaches into ambient session storage; a
/// `None` surfaces as [`ApiError::Unauthorized`] through the same recoverable
/// channels as a transport failure.
pub trait CredentialProvider: Send + Sync {
    fn session_token(&self) -> Option<SessionToken>;
}

/// Asset search and historical-cost lookups.
#[async_trait]
pub trait AssetDirectory: Send + Sync {
    async fn search_assets(
        &self,
        token: &SessionToken,
        query: &str,
        page_size: u32
    ) -> Result<Vec<Asset>, ApiError>;

    async fn average_cost(
        &self,
        token: &SessionToken,
        asset_id: AssetId
    ) -> Result<AverageCostQuote, ApiError>;
}

#[async_trait]
pub trait WarehouseDirectory: Send + Sync {
    async fn warehouses(&self, token: &SessionToken) -> Result<Vec<Warehouse>, ApiError>;
}

/// Reads and writes of posted transactions.
#[async_trait]
pub trait TransactionGateway: Send + Sync {
    async fn transaction(
        &self,
        token: &SessionToken,
        id: TransactionId
    ) -> Result<Transaction, ApiError>;

    async fn create_transaction(
        &self,
        token: &SessionToken,
        payload: CreateTransactionPayload
    ) -> Result<(), ApiError>;

    async fn update_transaction(
        &self,
        token: &SessionToken,
        id: TransactionId,
        payload: UpdateTransactionPayload
    ) -> Result<(), ApiError>;
}
