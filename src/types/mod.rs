pub type AssetId = u64;
pub type WarehouseId = u64;
pub type TransactionId = u64;

/// Client-generated line identifier, stable per line and never reused after
/// removal within a draft.
pub type LineId = u64;
