use rust_decimal::Decimal;
use serde::Deserialize;

use crate::types::{AssetId, WarehouseId};

/// An asset as returned by the search collaborator.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: AssetId,
    pub name_en: String,
    pub name_ar: String,
    pub product_code: String,
    /// Stock on hand at the warehouse at search time.
    pub quantity: u32,
    /// Older API versions omit the flag; absent means active.
    #[serde(default = "default_active")]
    pub is_active: bool
}

fn default_active() -> bool {
    true
}

/// Denormalized copy of a selected asset's identifying fields.
///
/// Captured onto the line item at selection time so the line keeps rendering
/// correctly even after the search result list is discarded.
#[derive(Debug, Clone)]
pub struct AssetSnapshot {
    pub name_en: String,
    pub name_ar: String,
    pub product_code: String,
    /// Stock on hand at selection time. Outbound quantities are soft-capped
    /// against this value.
    pub on_hand: u32,
    pub is_active: bool
}

impl From<&Asset> for AssetSnapshot {
    fn from(asset: &Asset) -> Self {
        Self {
            name_en: asset.name_en.clone(),
            name_ar: asset.name_ar.clone(),
            product_code: asset.product_code.clone(),
            on_hand: asset.quantity,
            is_active: asset.is_active
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Warehouse {
    pub id: WarehouseId,
    pub name_en: String,
    pub name_ar: String
}

/// The average-cost endpoint answers in two shapes depending on the server
/// version: a bare number, or an object wrapping it as `{"average": n}`.
/// Both are accepted; anything the wrapped form leaves out resolves to zero.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub enum AverageCostQuote {
    Bare(Decimal),
    Wrapped {
        #[serde(default)]
        average: Option<Decimal>
    }
}

impl AverageCostQuote {
    pub fn value(self) -> Decimal {
        match self {
            Self::Bare(average) => average,
            Self::Wrapped { average } => average.unwrap_or(Decimal::ZERO)
        }
    }
}
