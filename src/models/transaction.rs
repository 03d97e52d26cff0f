use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::models::{Asset, Direction};
use crate::types::{AssetId, TransactionId, WarehouseId};

/// A posted transaction as returned by the gateway, used to hydrate an
/// edit-mode draft.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub reference_number: String,
    pub warehouse_id: Option<WarehouseId>,
    pub direction: Direction,
    /// Nested line records. Immutable ledger facts once posted.
    #[serde(default)]
    pub asset_transactions: Vec<AssetTransactionRecord>
}

/// One persisted line of a posted transaction.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetTransactionRecord {
    pub id: u64,
    pub asset_id: AssetId,
    pub asset: Asset,
    pub quantity: u32,
    pub amount: Decimal,
    pub total_value: Decimal
}
