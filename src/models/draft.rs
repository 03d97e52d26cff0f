use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::api::Attachment;
use crate::models::errors::DraftError;
use crate::models::{Asset, Direction, DraftMode, LineItem, LinePatch, Transaction};
use crate::types::{LineId, TransactionId, WarehouseId};

/// The in-progress transaction being composed or edited.
///
/// Owns the metadata fields and the ordered line-item collection, and is the
/// only place line mutations happen. Whether lines may be mutated at all is a
/// single capability flag set at construction from the mode; every mutation
/// entry point consults it rather than re-deriving the rule.
///
/// Metadata fields are deliberately public and unvalidated: validation is the
/// submission coordinator's job, not the form's.
#[derive(Debug, Clone)]
pub struct TransactionDraft {
    pub date: Option<NaiveDate>,
    pub description: String,
    pub reference_number: String,
    pub warehouse_id: Option<WarehouseId>,
    pub attachment: Option<Attachment>,
    direction: Direction,
    mode: DraftMode,
    line_items_editable: bool,
    editing_id: Option<TransactionId>,
    line_items: Vec<LineItem>,
    next_line_id: LineId
}

impl TransactionDraft {
    /// Opens a fresh create-mode draft with one default line.
    pub fn new(direction: Direction) -> Self {
        let mut draft = Self {
            date: None,
            description: String::new(),
            reference_number: String::new(),
            warehouse_id: None,
            attachment: None,
            direction,
            mode: DraftMode::Create,
            line_items_editable: true,
            editing_id: None,
            line_items: Vec::new(),
            next_line_id: 0
        };
        draft.push_default_line();
        draft
    }

    /// Reconstructs an edit-mode draft from a posted transaction.
    ///
    /// Lines become read-only display data, one per persisted record. A
    /// posted transaction without records still gets one default line so the
    /// edit view never renders an empty table.
    pub fn from_posted(transaction: &Transaction) -> Self {
        let mut draft = Self {
            date: transaction.date,
            description: transaction.description.clone(),
            reference_number: transaction.reference_number.clone(),
            warehouse_id: transaction.warehouse_id,
            attachment: None,
            direction: transaction.direction,
            mode: DraftMode::Edit,
            line_items_editable: false,
            editing_id: Some(transaction.id),
            line_items: Vec::new(),
            next_line_id: 0
        };

        for record in &transaction.asset_transactions {
            let id = draft.allocate_line_id();
            draft.line_items.push(LineItem::from_record(id, record));
        }

        if draft.line_items.is_empty() {
            draft.push_default_line();
        }

        draft
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn mode(&self) -> DraftMode {
        self.mode
    }

    pub fn line_items_editable(&self) -> bool {
        self.line_items_editable
    }

    /// Identifier of the posted transaction being edited, if any.
    pub fn editing_id(&self) -> Option<TransactionId> {
        self.editing_id
    }

    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    pub fn line(&self, id: LineId) -> Result<&LineItem, DraftError> {
        self.line_items
            .iter()
            .find(|line| line.id == id)
            .ok_or(DraftError::LineNotFound { line_id: id })
    }

    pub(crate) fn line_mut(&mut self, id: LineId) -> Result<&mut LineItem, DraftError> {
        self.line_items
            .iter_mut()
            .find(|line| line.id == id)
            .ok_or(DraftError::LineNotFound { line_id: id })
    }

    /// Appends an empty line with a fresh id.
    pub fn add_line(&mut self) -> Result<LineId, DraftError> {
        self.ensure_lines_editable()?;
        Ok(self.push_default_line())
    }

    /// Removes a line. The draft always retains at least one line.
    pub fn remove_line(&mut self, id: LineId) -> Result<(), DraftError> {
        self.ensure_lines_editable()?;

        if self.line_items.len() <= 1 {
            return Err(DraftError::LastLineItem);
        }

        let position = self
            .line_items
            .iter()
            .position(|line| line.id == id)
            .ok_or(DraftError::LineNotFound { line_id: id })?;

        self.line_items.remove(position);

        Ok(())
    }

    /// Merges the patch into the target line, recomputing its total in the
    /// same step.
    ///
    /// # Errors
    /// - `LineItemsLocked` in edit mode.
    /// - `InvalidQuantity` for a zero quantity.
    /// - `UnitAmountLocked` for a manual amount on an outbound line, where
    ///   cost is resolved from historical averages instead.
    /// - `InvalidUnitAmount` for a negative amount.
    /// - `Overflow` when the new total does not fit; the line is unchanged.
    pub fn update_line(&mut self, id: LineId, patch: LinePatch) -> Result<(), DraftError> {
        self.ensure_lines_editable()?;

        if patch.quantity == Some(0) {
            return Err(DraftError::InvalidQuantity);
        }

        if patch.unit_amount.is_some() && self.direction == Direction::Out {
            return Err(DraftError::UnitAmountLocked);
        }

        if matches!(patch.unit_amount, Some(amount) if amount.is_sign_negative()) {
            return Err(DraftError::InvalidUnitAmount);
        }

        self.line_mut(id)?.apply_patch(patch)
    }

    /// Commits a selected asset onto a line, resetting its cost state.
    pub(crate) fn select_asset(&mut self, id: LineId, asset: &Asset) -> Result<(), DraftError> {
        self.ensure_lines_editable()?;
        self.line_mut(id)?.commit_asset(asset);
        Ok(())
    }

    /// Applies a server-resolved average cost. Bypasses the manual-entry
    /// lock since this is the resolver writing, not the user.
    pub(crate) fn apply_resolved_cost(
        &mut self,
        id: LineId,
        average: Decimal
    ) -> Result<(), DraftError> {
        let line = self.line_mut(id)?;
        line.apply_patch(LinePatch::unit_amount(average))?;
        line.search.finish_cost();
        Ok(())
    }

    /// Sum of all current line totals. Derived, never stored.
    pub fn grand_total(&self) -> Result<Decimal, DraftError> {
        self.line_items.iter().try_fold(Decimal::ZERO, |total, line| {
            total
                .checked_add(line.line_total)
                .ok_or_else(|| DraftError::overflow(line.id))
        })
    }

    fn ensure_lines_editable(&self) -> Result<(), DraftError> {
        if self.line_items_editable {
            Ok(())
        } else {
            Err(DraftError::LineItemsLocked)
        }
    }

    fn push_default_line(&mut self) -> LineId {
        let id = self.allocate_line_id();
        self.line_items.push(LineItem::new(id));
        id
    }

    fn allocate_line_id(&mut self) -> LineId {
        self.next_line_id += 1;
        self.next_line_id
    }
}
