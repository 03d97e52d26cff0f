use thiserror::Error;

use crate::api::ApiError;
use crate::types::LineId;

/// Aggregate-state violations found before any network call is made.
/// Checked in declaration order; the first hit aborts submission.
#[derive(Debug, Error, Clone, Copy, Eq, PartialEq)]
pub enum ValidationError {
    #[error("A warehouse must be selected before submission")]
    MissingWarehouse,
    #[error("Line [{line_id}] has no asset selected")]
    MissingAsset {
        line_id: LineId
    },
    #[error("Line [{line_id}] requests [{requested}] units but only [{on_hand}] are on hand")]
    StockExceeded {
        line_id: LineId,
        requested: u32,
        on_hand: u32
    }
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Gateway(#[from] ApiError),
    #[error("No draft is open for submission")]
    NotOpen
}
