use crate::engine::errors::ValidationError;
use crate::models::{DraftMode, StockStatus, TransactionDraft};

/// Checks the aggregate draft ahead of submission.
///
/// Order matters: warehouse first, then per-line checks. Line items are only
/// validated in create mode; in edit mode they are immutable display data
/// that was already valid when posted.
pub fn validate(draft: &TransactionDraft) -> Result<(), ValidationError> {
    if draft.warehouse_id.is_none() {
        return Err(ValidationError::MissingWarehouse);
    }

    if draft.mode() == DraftMode::Edit {
        return Ok(());
    }

    for line in draft.line_items() {
        if line.asset_id.is_none() {
            return Err(ValidationError::MissingAsset { line_id: line.id });
        }
    }

    for line in draft.line_items() {
        if let StockStatus::Exceeded { requested, on_hand } = line.stock_status(draft.direction())
        {
            return Err(ValidationError::StockExceeded {
                line_id: line.id,
                requested,
                on_hand
            });
        }
    }

    Ok(())
}
