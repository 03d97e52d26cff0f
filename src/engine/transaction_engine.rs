use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use moka::future::Cache;
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

use crate::api::{
    ApiError, AssetDirectory, Attachment, CreateTransactionPayload, CredentialProvider,
    LineItemPayload, SessionToken, TransactionGateway, UpdateTransactionPayload,
    WarehouseDirectory, SEARCH_PAGE_SIZE,
};
use crate::engine::errors::{SubmitError, ValidationError};
use crate::engine::{validation, DraftPhase};
use crate::models::{
    Asset, Direction, DraftError, DraftMode, LinePatch, StockStatus, TransactionDraft, Warehouse,
};
use crate::types::{AssetId, LineId, TransactionId, WarehouseId};

/// Result of an asset search issued for a line.
#[derive(Debug)]
pub enum SearchOutcome {
    /// The line's result set was replaced; carries the result count.
    Applied(usize),
    /// Empty query, no call made.
    Skipped,
    /// A newer search (or a selection) superseded this one; response discarded.
    Stale,
    /// The lookup failed; the line degraded to empty results.
    Failed(ApiError)
}

/// Outcome of cost resolution after an asset is selected.
#[derive(Debug)]
pub enum CostResolution {
    /// Inbound line: unit cost is entered by the user.
    ManualEntry,
    /// Outbound line: average cost resolved and applied.
    Resolved(Decimal),
    /// The lookup succeeded but no historical cost exists; advisory for the
    /// user, unit cost stays zero.
    NoHistoricalCost,
    /// The lookup failed; unit cost stays zero and the user should enter it
    /// manually. Never fatal to the draft.
    LookupFailed(ApiError),
    /// A newer selection or a line removal happened while the lookup was in
    /// flight; response discarded.
    Superseded
}

/// Outcome of a submission attempt.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SubmitOutcome {
    Created,
    Updated,
    /// A submission was already in flight; this one was ignored.
    Dropped
}

enum SubmitCall {
    Create(CreateTransactionPayload),
    Update {
        id: TransactionId,
        payload: UpdateTransactionPayload
    }
}

struct EngineState {
    phase: DraftPhase,
    draft: Option<TransactionDraft>,
    /// Bumped every time a draft is installed. Async responses stamped under
    /// an earlier generation can never land on a replacement draft, even when
    /// its line ids and sequence tokens line up with the old one's.
    generation: u64,
    warehouses: Vec<Warehouse>
}

impl EngineState {
    fn install_draft(&mut self, draft: TransactionDraft, phase: DraftPhase) {
        self.generation += 1;
        self.draft = Some(draft);
        self.phase = phase;
    }

    /// The draft, for user-initiated mutation. Rejects mutation while a
    /// submission is in flight so the payload sent is exactly what the user
    /// submitted.
    fn draft_mut(&mut self) -> Result<&mut TransactionDraft, DraftError> {
        match self.phase {
            DraftPhase::Ready => self.draft.as_mut().ok_or(DraftError::NotOpen),
            DraftPhase::Submitting => Err(DraftError::Busy),
            DraftPhase::Uninitialized | DraftPhase::Closed => Err(DraftError::NotOpen)
        }
    }

    /// The draft, for applying async lookup responses. Anything but an open,
    /// ready draft means the response is no longer wanted.
    fn draft_if_ready(&mut self) -> Option<&mut TransactionDraft> {
        match self.phase {
            DraftPhase::Ready => self.draft.as_mut(),
            _ => None
        }
    }
}

/// The transaction line-item engine.
///
/// Owns the draft behind a single async mutex; all methods take `&self` so a
/// UI shell can share the engine via [`Arc`] and keep every line interactive
/// while another line's search or cost lookup is awaiting its collaborator.
/// The lock is never held across a collaborator call: workflows stamp a
/// sequence token, release the lock for the await, then re-acquire it and
/// apply the response only if the token is still the latest for that line.
pub struct TransactionEngine {
    assets: Arc<dyn AssetDirectory>,
    warehouses: Arc<dyn WarehouseDirectory>,
    gateway: Arc<dyn TransactionGateway>,
    credentials: Arc<dyn CredentialProvider>,
    /// Positive average-cost quotes, so re-selecting an asset does not
    /// re-query. Zero and failed quotes are never cached.
    quotes: Cache<AssetId, Decimal>,
    state: Mutex<EngineState>
}

impl TransactionEngine {
    pub fn new(
        assets: Arc<dyn AssetDirectory>,
        warehouses: Arc<dyn WarehouseDirectory>,
        gateway: Arc<dyn TransactionGateway>,
        credentials: Arc<dyn CredentialProvider>
    ) -> Self {
        Self {
            assets,
            warehouses,
            gateway,
            credentials,
            quotes: Cache::builder()
                .max_capacity(1024)
                .time_to_live(Duration::from_secs(300))
                .build(),
            state: Mutex::new(EngineState {
                phase: DraftPhase::Uninitialized,
                draft: None,
                generation: 0,
                warehouses: Vec::new()
            })
        }
    }

    /// Opens a fresh create-mode draft, replacing any previous state.
    pub async fn open(&self, direction: Direction) {
        let mut state = self.state.lock().await;
        state.install_draft(TransactionDraft::new(direction), DraftPhase::Ready);
        debug!("Opened create draft with direction [{direction:?}]");
    }

    /// Fetches a posted transaction and opens it as a read-only edit draft.
    ///
    /// A fetch failure is recoverable and leaves any previous state untouched.
    pub async fn open_for_edit(&self, id: TransactionId) -> Result<(), ApiError> {
        let session = self.session()?;
        let transaction = self.gateway.transaction(&session, id).await?;

        let mut state = self.state.lock().await;
        state.install_draft(TransactionDraft::from_posted(&transaction), DraftPhase::Ready);
        debug!("Opened edit draft for transaction [{id}]");

        Ok(())
    }

    /// Fetches the warehouse list and caches it for display.
    pub async fn load_warehouses(&self) -> Result<Vec<Warehouse>, ApiError> {
        let session = self.session()?;
        let warehouses = self.warehouses.warehouses(&session).await?;

        let mut state = self.state.lock().await;
        state.warehouses = warehouses.clone();

        Ok(warehouses)
    }

    pub async fn warehouses(&self) -> Vec<Warehouse> {
        self.state.lock().await.warehouses.clone()
    }

    // Metadata setters. No validation here; the submission coordinator checks
    // the aggregate state.

    pub async fn set_date(&self, date: Option<NaiveDate>) -> Result<(), DraftError> {
        self.state.lock().await.draft_mut()?.date = date;
        Ok(())
    }

    pub async fn set_description(&self, description: impl Into<String>) -> Result<(), DraftError> {
        self.state.lock().await.draft_mut()?.description = description.into();
        Ok(())
    }

    pub async fn set_reference_number(
        &self,
        reference_number: impl Into<String>
    ) -> Result<(), DraftError> {
        self.state.lock().await.draft_mut()?.reference_number = reference_number.into();
        Ok(())
    }

    pub async fn set_warehouse(&self, warehouse_id: Option<WarehouseId>) -> Result<(), DraftError> {
        self.state.lock().await.draft_mut()?.warehouse_id = warehouse_id;
        Ok(())
    }

    pub async fn set_attachment(&self, attachment: Option<Attachment>) -> Result<(), DraftError> {
        self.state.lock().await.draft_mut()?.attachment = attachment;
        Ok(())
    }

    /// Appends an empty line with a fresh id. Rejected in edit mode.
    pub async fn add_line(&self) -> Result<LineId, DraftError> {
        self.state.lock().await.draft_mut()?.add_line()
    }

    /// Removes a line. The draft always retains at least one line.
    pub async fn remove_line(&self, line_id: LineId) -> Result<(), DraftError> {
        self.state.lock().await.draft_mut()?.remove_line(line_id)
    }

    /// Sets a line's quantity, recomputing its total in the same step, and
    /// reports the soft stock check so the caller can flag outbound lines
    /// that exceed on-hand stock without blocking input.
    pub async fn set_quantity(
        &self,
        line_id: LineId,
        quantity: u32
    ) -> Result<StockStatus, DraftError> {
        let mut state = self.state.lock().await;
        let draft = state.draft_mut()?;

        draft.update_line(line_id, LinePatch::quantity(quantity))?;

        let status = draft.line(line_id)?.stock_status(draft.direction());
        if let StockStatus::Exceeded { requested, on_hand } = status {
            debug!("Line [{line_id}] quantity [{requested}] exceeds on-hand stock [{on_hand}]");
        }

        Ok(status)
    }

    /// Sets a line's unit cost manually. Only valid on inbound lines;
    /// outbound cost is resolved from historical averages.
    pub async fn set_unit_amount(
        &self,
        line_id: LineId,
        unit_amount: Decimal
    ) -> Result<(), DraftError> {
        self.state
            .lock()
            .await
            .draft_mut()?
            .update_line(line_id, LinePatch::unit_amount(unit_amount))
    }

    /// Runs an asset search for a line.
    ///
    /// An empty query is a no-op. The response replaces the line's result set
    /// only if no newer search or selection was issued for the line in the
    /// meantime; a lookup failure degrades to empty results and is never
    /// fatal.
    pub async fn search_assets(
        &self,
        line_id: LineId,
        query: &str
    ) -> Result<SearchOutcome, DraftError> {
        let query = query.trim().to_string();
        if query.is_empty() {
            return Ok(SearchOutcome::Skipped);
        }

        let (generation, token) = {
            let mut state = self.state.lock().await;
            let generation = state.generation;
            let draft = state.draft_mut()?;

            if !draft.line_items_editable() {
                return Err(DraftError::LineItemsLocked);
            }

            (generation, draft.line_mut(line_id)?.search.begin(&query))
        };

        let result = match self.session() {
            Ok(session) => self.assets.search_assets(&session, &query, SEARCH_PAGE_SIZE).await,
            Err(error) => Err(error)
        };

        let mut state = self.state.lock().await;
        if state.generation != generation {
            return Ok(SearchOutcome::Stale);
        }
        let Some(draft) = state.draft_if_ready() else {
            return Ok(SearchOutcome::Stale);
        };
        let Ok(line) = draft.line_mut(line_id) else {
            return Ok(SearchOutcome::Stale);
        };
        if !line.search.is_latest(token) {
            return Ok(SearchOutcome::Stale);
        }

        match result {
            Ok(results) => {
                let count = results.len();
                line.search.complete(results);
                Ok(SearchOutcome::Applied(count))
            }
            Err(error) => {
                warn!("Asset search for line [{line_id}] degraded to empty results: {error}");
                line.search.complete(Vec::new());
                Ok(SearchOutcome::Failed(error))
            }
        }
    }

    /// Commits an asset onto a line and resolves its unit cost.
    ///
    /// Inbound lines are left at zero for manual entry. Outbound lines get
    /// the server's historical average; a failed lookup leaves the cost at
    /// zero with a warning to enter it manually.
    pub async fn select_asset(
        &self,
        line_id: LineId,
        asset: Asset
    ) -> Result<CostResolution, DraftError> {
        let asset_id = asset.id;

        let (generation, cost_token) = {
            let mut state = self.state.lock().await;
            let generation = state.generation;
            let draft = state.draft_mut()?;

            draft.select_asset(line_id, &asset)?;

            if draft.direction() == Direction::In {
                debug!("Line [{line_id}] selected asset [{asset_id}], awaiting manual cost entry");
                return Ok(CostResolution::ManualEntry);
            }

            (generation, draft.line_mut(line_id)?.search.begin_cost())
        };

        let quote = match self.quotes.get(&asset_id).await {
            Some(cached) => Ok(cached),
            None => match self.session() {
                Ok(session) => self
                    .assets
                    .average_cost(&session, asset_id)
                    .await
                    .map(|quote| quote.value()),
                Err(error) => Err(error)
            }
        };

        let mut state = self.state.lock().await;
        if state.generation != generation {
            return Ok(CostResolution::Superseded);
        }
        let Some(draft) = state.draft_if_ready() else {
            return Ok(CostResolution::Superseded);
        };
        let still_latest = draft
            .line(line_id)
            .map(|line| line.search.cost_is_latest(cost_token))
            .unwrap_or(false);
        if !still_latest {
            return Ok(CostResolution::Superseded);
        }

        match quote {
            Ok(average) => {
                draft.apply_resolved_cost(line_id, average)?;

                if average > Decimal::ZERO {
                    drop(state);
                    self.quotes.insert(asset_id, average).await;
                    Ok(CostResolution::Resolved(average))
                } else {
                    debug!("No historical cost available for asset [{asset_id}]");
                    Ok(CostResolution::NoHistoricalCost)
                }
            }
            Err(error) => {
                warn!("Average-cost lookup failed for asset [{asset_id}], enter cost manually: {error}");
                draft.apply_resolved_cost(line_id, Decimal::ZERO)?;
                Ok(CostResolution::LookupFailed(error))
            }
        }
    }

    /// Validates the draft and issues exactly one create or update call.
    ///
    /// Validation failures abort before any network call with the draft
    /// untouched. A submission failure restores the draft to `Ready` with
    /// its state fully preserved for retry. On success the draft resets to a
    /// single default line and the phase moves to `Closed`; at most one
    /// submission is ever in flight, a second request while `Submitting` is
    /// dropped.
    pub async fn submit(&self) -> Result<SubmitOutcome, SubmitError> {
        let call = {
            let mut state = self.state.lock().await;

            match state.phase {
                DraftPhase::Ready => {}
                DraftPhase::Submitting => {
                    debug!("Submit dropped: a submission is already in flight");
                    return Ok(SubmitOutcome::Dropped);
                }
                DraftPhase::Uninitialized | DraftPhase::Closed => {
                    return Err(SubmitError::NotOpen)
                }
            }

            let Some(draft) = state.draft.as_ref() else {
                return Err(SubmitError::NotOpen);
            };

            validation::validate(draft)?;
            let call = Self::build_call(draft)?;
            state.phase = DraftPhase::Submitting;
            call
        };

        let result = match self.session() {
            Ok(session) => self.execute(&session, call).await,
            Err(error) => Err(error)
        };

        let mut state = self.state.lock().await;
        match result {
            Ok(outcome) => {
                let direction = state.draft.as_ref().map(TransactionDraft::direction);
                match direction {
                    Some(direction) => {
                        state.install_draft(TransactionDraft::new(direction), DraftPhase::Closed)
                    }
                    None => state.phase = DraftPhase::Closed
                }
                debug!("Submission completed: [{outcome:?}]");
                Ok(outcome)
            }
            Err(gateway_error) => {
                state.phase = DraftPhase::Ready;
                error!("Submission failed, draft preserved for retry: {gateway_error}");
                Err(SubmitError::Gateway(gateway_error))
            }
        }
    }

    /// Clone of the current draft for display, if one is open.
    pub async fn draft(&self) -> Option<TransactionDraft> {
        self.state.lock().await.draft.clone()
    }

    pub async fn phase(&self) -> DraftPhase {
        self.state.lock().await.phase
    }

    /// Sum of all current line totals, zero when no draft is open.
    pub async fn grand_total(&self) -> Result<Decimal, DraftError> {
        match &self.state.lock().await.draft {
            Some(draft) => draft.grand_total(),
            None => Ok(Decimal::ZERO)
        }
    }

    fn build_call(draft: &TransactionDraft) -> Result<SubmitCall, SubmitError> {
        let Some(warehouse_id) = draft.warehouse_id else {
            return Err(ValidationError::MissingWarehouse.into());
        };

        match draft.mode() {
            DraftMode::Edit => {
                let Some(id) = draft.editing_id() else {
                    return Err(SubmitError::NotOpen);
                };

                Ok(SubmitCall::Update {
                    id,
                    payload: UpdateTransactionPayload {
                        date: draft.date,
                        description: draft.description.clone(),
                        reference_number: draft.reference_number.clone(),
                        warehouse_id
                    }
                })
            }
            DraftMode::Create => {
                let mut line_items = Vec::with_capacity(draft.line_items().len());

                for line in draft.line_items() {
                    let Some(asset_id) = line.asset_id else {
                        return Err(ValidationError::MissingAsset { line_id: line.id }.into());
                    };

                    line_items.push(LineItemPayload {
                        asset_id,
                        quantity: line.quantity,
                        amount: line.unit_amount
                    });
                }

                Ok(SubmitCall::Create(CreateTransactionPayload {
                    date: draft.date,
                    description: draft.description.clone(),
                    reference_number: draft.reference_number.clone(),
                    warehouse_id,
                    direction: draft.direction(),
                    line_items,
                    attachment: draft.attachment.clone()
                }))
            }
        }
    }

    async fn execute(
        &self,
        session: &SessionToken,
        call: SubmitCall
    ) -> Result<SubmitOutcome, ApiError> {
        match call {
            SubmitCall::Create(payload) => self
                .gateway
                .create_transaction(session, payload)
                .await
                .map(|()| SubmitOutcome::Created),
            SubmitCall::Update { id, payload } => self
                .gateway
                .update_transaction(session, id, payload)
                .await
                .map(|()| SubmitOutcome::Updated)
        }
    }

    fn session(&self) -> Result<SessionToken, ApiError> {
        self.credentials.session_token().ok_or(ApiError::Unauthorized)
    }
}
