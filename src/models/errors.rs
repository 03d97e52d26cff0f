use thiserror::Error;

use crate::types::LineId;

#[derive(Debug, Error)]
pub enum DraftError {
    #[error("No draft is open")]
    NotOpen,
    #[error("The draft is busy submitting and cannot be mutated")]
    Busy,
    #[error("Line [{line_id}] was not found on the draft")]
    LineNotFound {
        line_id: LineId
    },
    #[error("Line items are read-only while editing a posted transaction")]
    LineItemsLocked,
    #[error("A draft must retain at least one line item")]
    LastLineItem,
    #[error("Quantity must be a positive integer")]
    InvalidQuantity,
    #[error("Unit cost must be a non-negative amount")]
    InvalidUnitAmount,
    #[error("Unit cost on outbound lines is resolved from average cost, not entered")]
    UnitAmountLocked,
    #[error("Numeric overflow computing the total for line [{line_id}]")]
    Overflow {
        line_id: LineId
    }
}

impl DraftError {
    pub fn overflow(line_id: LineId) -> Self {
        Self::Overflow { line_id }
    }
}
