use rust_decimal::Decimal;

use crate::models::errors::DraftError;
use crate::models::{Asset, AssetSnapshot, AssetTransactionRecord, Direction};
use crate::types::{AssetId, LineId};

/// One asset/quantity/cost row of a transaction draft.
///
/// `line_total` is derived, never stored independently: it is recomputed in
/// the same step as any change to `quantity` or `unit_amount`, so no caller
/// can observe a stale total between the two writes.
#[derive(Debug, Clone)]
pub struct LineItem {
    pub id: LineId,
    pub asset_id: Option<AssetId>,
    pub asset: Option<AssetSnapshot>,
    pub quantity: u32,
    pub unit_amount: Decimal,
    pub line_total: Decimal,
    /// Transient workflow state; irrelevant once the asset is confirmed.
    pub search: SearchState
}

impl LineItem {
    pub(crate) fn new(id: LineId) -> Self {
        Self {
            id,
            asset_id: None,
            asset: None,
            quantity: 1,
            unit_amount: Decimal::ZERO,
            line_total: Decimal::ZERO,
            search: SearchState::default()
        }
    }

    /// Reconstructs a read-only display line from a posted record.
    pub(crate) fn from_record(id: LineId, record: &AssetTransactionRecord) -> Self {
        // Posted totals are server facts; keep the persisted value if the
        // product does not fit.
        let line_total = Decimal::from(record.quantity)
            .checked_mul(record.amount)
            .unwrap_or(record.total_value);

        Self {
            id,
            asset_id: Some(record.asset_id),
            asset: Some(AssetSnapshot::from(&record.asset)),
            quantity: record.quantity,
            unit_amount: record.amount,
            line_total,
            search: SearchState::default()
        }
    }

    /// Merges the patch and recomputes `line_total` in one step. Nothing is
    /// written unless the new total fits, so a failed merge leaves the line
    /// exactly as it was.
    pub(crate) fn apply_patch(&mut self, patch: LinePatch) -> Result<(), DraftError> {
        let quantity = patch.quantity.unwrap_or(self.quantity);
        let unit_amount = patch.unit_amount.unwrap_or(self.unit_amount);
        let line_total = Decimal::from(quantity)
            .checked_mul(unit_amount)
            .ok_or_else(|| DraftError::overflow(self.id))?;

        self.quantity = quantity;
        self.unit_amount = unit_amount;
        self.line_total = line_total;

        Ok(())
    }

    /// Commits a selected asset and resets cost state pending resolution.
    /// Any in-flight search or cost lookup for the line is invalidated.
    pub(crate) fn commit_asset(&mut self, asset: &Asset) {
        self.asset_id = Some(asset.id);
        self.asset = Some(AssetSnapshot::from(asset));
        self.unit_amount = Decimal::ZERO;
        self.line_total = Decimal::ZERO;
        self.search.invalidate();
    }

    /// Soft stock check for outbound lines. Exceeding on-hand stock never
    /// blocks typing, only submission.
    pub fn stock_status(&self, direction: Direction) -> StockStatus {
        if direction != Direction::Out {
            return StockStatus::NotApplicable;
        }

        let Some(snapshot) = &self.asset else {
            return StockStatus::NotApplicable;
        };

        if self.quantity > snapshot.on_hand {
            StockStatus::Exceeded {
                requested: self.quantity,
                on_hand: snapshot.on_hand
            }
        } else {
            StockStatus::Ok
        }
    }
}

/// Partial update merged into a line item atomically with the total
/// recomputation.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinePatch {
    pub quantity: Option<u32>,
    pub unit_amount: Option<Decimal>
}

impl LinePatch {
    pub fn quantity(quantity: u32) -> Self {
        Self { quantity: Some(quantity), unit_amount: None }
    }

    pub fn unit_amount(unit_amount: Decimal) -> Self {
        Self { quantity: None, unit_amount: Some(unit_amount) }
    }
}

/// Result of the soft stock-availability check on a line.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum StockStatus {
    Ok,
    Exceeded { requested: u32, on_hand: u32 },
    /// Inbound line, or no asset selected yet.
    NotApplicable
}

/// Per-line asset-search and cost-resolution workflow state.
///
/// The sequence counters grow monotonically per line; every async lookup
/// carries the token it was issued with, and a response whose token is no
/// longer the latest is discarded. This closes the race where two rapid
/// searches on the same line resolve out of order.
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    pub query: String,
    pub results: Vec<Asset>,
    pub searching: bool,
    pub resolving_cost: bool,
    seq: u64,
    cost_seq: u64
}

impl SearchState {
    /// Stamps a new search and returns its token.
    pub(crate) fn begin(&mut self, query: &str) -> u64 {
        self.seq += 1;
        self.query = query.to_string();
        self.searching = true;
        self.seq
    }

    pub(crate) fn is_latest(&self, token: u64) -> bool {
        self.seq == token
    }

    /// Applies the result set of the latest search.
    pub(crate) fn complete(&mut self, results: Vec<Asset>) {
        self.results = results;
        self.searching = false;
    }

    /// Stamps a new cost resolution and returns its token.
    pub(crate) fn begin_cost(&mut self) -> u64 {
        self.cost_seq += 1;
        self.resolving_cost = true;
        self.cost_seq
    }

    pub(crate) fn cost_is_latest(&self, token: u64) -> bool {
        self.cost_seq == token
    }

    pub(crate) fn finish_cost(&mut self) {
        self.resolving_cost = false;
    }

    /// Drops search state and bumps both counters so in-flight lookups for
    /// the previous state can never land.
    pub(crate) fn invalidate(&mut self) {
        self.seq += 1;
        self.cost_seq += 1;
        self.query.clear();
        self.results.clear();
        self.searching = false;
        self.resolving_cost = false;
    }
}
