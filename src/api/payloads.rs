use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::Direction;
use crate::types::{AssetId, WarehouseId};

/// Binary file attached to a create submission. Carried as the second part
/// of the multipart message, never serialized into the JSON body.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>
}

/// JSON body of the create-transaction multipart call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionPayload {
    pub date: Option<NaiveDate>,
    pub description: String,
    pub reference_number: String,
    pub warehouse_id: WarehouseId,
    pub direction: Direction,
    pub line_items: Vec<LineItemPayload>,
    #[serde(skip)]
    pub attachment: Option<Attachment>
}

/// One `{assetId, quantity, amount}` triple of a create submission.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemPayload {
    pub asset_id: AssetId,
    pub quantity: u32,
    pub amount: Decimal
}

/// Metadata-only body of an edit submission. Posted line items are immutable
/// ledger facts and are never re-sent.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransactionPayload {
    pub date: Option<NaiveDate>,
    pub description: String,
    pub reference_number: String,
    pub warehouse_id: WarehouseId
}
