use std::sync::Arc;
use std::time::Duration;

use basket_optimizer_sdk::{
    ErrorKind, OptimizationItem, OptimizerError, RankedStoresResult, Result,
    SingleStoreEvaluation, TopMultiStoreSolutionsResult,
};
use log::{debug, info, warn};
use parking_lot::{Mutex, MutexGuard};

use crate::domain::backend::OptimizationBackend;
use crate::domain::grocery_list::GroceryList;
use crate::domain::presentation::{
    missing_items_for, stores_with_missing_items, ExpansionState, MissingItem,
};
use crate::domain::request::{build_request, OptimizationRequest};
use crate::domain::validate::{validate_multi_store, validate_ranked_stores};
use crate::models::{
    Coordinates, LocationStatus, OptimizationMode, OptimizationSettings, PriorityChip,
};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// What caused a request to be issued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    AutoRun,
    ChipToggled,
    ModeSwitched,
    Retry,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Success,
    Failed {
        kind: ErrorKind,
        message: String,
    },
}

/// Raised once per newly applied single-store result that is a partial match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialMatchNotice {
    pub seq: u64,
    pub stores_with_missing: usize,
}

/// A request that has been issued and awaits its response
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub seq: u64,
    pub trigger: Trigger,
    pub request: OptimizationRequest,
}

/// A backend response tagged with the endpoint it came from
#[derive(Debug)]
pub enum Outcome {
    SingleStore(Result<RankedStoresResult>),
    MultiStore(Result<TopMultiStoreSolutionsResult>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// A newer request for the same mode was issued, or the search context changed
    Stale,
}

#[derive(Debug)]
struct InFlight {
    seq: u64,
    items: Vec<OptimizationItem>,
}

#[derive(Debug)]
struct ModeSlot<T> {
    phase: Phase,
    in_flight: Option<InFlight>,
    result: Option<Arc<T>>,
    result_items: Vec<OptimizationItem>,
}

impl<T> Default for ModeSlot<T> {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            in_flight: None,
            result: None,
            result_items: Vec::new(),
        }
    }
}

impl<T> ModeSlot<T> {
    fn reset(&mut self) {
        *self = Self::default();
    }

    // Returns the items the request was built from when `seq` is the live request.
    fn settle(&mut self, seq: u64) -> Option<Vec<OptimizationItem>> {
        match self.in_flight.take() {
            Some(in_flight) if in_flight.seq == seq => Some(in_flight.items),
            other => {
                self.in_flight = other;
                None
            }
        }
    }
}

// ---------- State container ----------

/// Single source of truth for one comparison session.
///
/// Only the transitions below mutate mode, chip, or the result slots.
#[derive(Debug, Default)]
pub struct OrchestratorState {
    mode: OptimizationMode,
    chip: PriorityChip,
    items: Vec<OptimizationItem>,
    location: LocationStatus,
    settings: OptimizationSettings,
    single: ModeSlot<RankedStoresResult>,
    multi: ModeSlot<TopMultiStoreSolutionsResult>,
    last_seq: u64,
    notice: Option<PartialMatchNotice>,
    expansion: ExpansionState,
}

impl OrchestratorState {
    pub fn new(settings: OptimizationSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> OptimizationMode {
        self.mode
    }

    pub fn chip(&self) -> PriorityChip {
        self.chip
    }

    pub fn items(&self) -> &[OptimizationItem] {
        &self.items
    }

    pub fn location(&self) -> LocationStatus {
        self.location
    }

    pub fn settings(&self) -> &OptimizationSettings {
        &self.settings
    }

    /// Replace the list to price; a different list drops current results.
    ///
    /// Lines are merged by item code and zero quantities dropped. Order is
    /// not significant.
    pub fn set_items(&mut self, items: Vec<OptimizationItem>) {
        let items = items.into_iter().collect::<GroceryList>().into_items();
        if !same_items(&self.items, &items) {
            self.items = items;
            self.clear_results();
        }
    }

    /// Record the latest location signal; a different position drops current results.
    pub fn set_location(&mut self, location: LocationStatus) {
        if self.location != location {
            self.location = location;
            self.clear_results();
        }
    }

    /// Takes effect on the next request.
    pub fn set_settings(&mut self, settings: OptimizationSettings) {
        self.settings = settings;
    }

    /// Returns false when `mode` is already active.
    pub fn select_mode(&mut self, mode: OptimizationMode) -> bool {
        if self.mode == mode {
            return false;
        }
        debug!("mode {} -> {}", self.mode, mode);
        self.mode = mode;
        self.clear_results();
        true
    }

    /// Select `chip`, or deselect it when it is already active.
    pub fn toggle_chip(&mut self, chip: PriorityChip) -> PriorityChip {
        let next = self.chip.toggled(chip);
        debug!("priority {} -> {}", self.chip, next);
        self.chip = next;
        self.clear_results();
        next
    }

    // In-flight requests were built for the old context, so they are dropped too.
    fn clear_results(&mut self) {
        self.single.reset();
        self.multi.reset();
        self.notice = None;
        self.expansion.reset();
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        self.location.coordinates()
    }

    /// Location or items are missing, so the view should prompt instead of search
    pub fn needs_input(&self) -> bool {
        self.coordinates().is_none() || self.items.is_empty()
    }

    pub fn should_auto_run(&self) -> bool {
        !self.needs_input() && *self.phase() == Phase::Idle
    }

    /// Issue a request for the active mode.
    ///
    /// # Errors
    ///
    /// `MissingPreconditions` leaves state untouched. Any other build error
    /// (`InvalidRequest`) also fails the active mode so the view can show it.
    pub fn begin(&mut self, trigger: Trigger) -> Result<PendingRequest> {
        let request = match build_request(
            self.mode,
            self.chip,
            &self.items,
            self.coordinates(),
            &self.settings,
        ) {
            Ok(request) => request,
            Err(e) if e.kind() == ErrorKind::MissingPreconditions => return Err(e),
            Err(e) => {
                warn!("{} request not issued: {}", self.mode, e);
                let failed = Phase::Failed {
                    kind: e.kind(),
                    message: e.user_message(),
                };
                match self.mode {
                    OptimizationMode::SingleStore => fail_slot(&mut self.single, failed),
                    OptimizationMode::MultiStore => fail_slot(&mut self.multi, failed),
                }
                return Err(e);
            }
        };

        self.last_seq += 1;
        let seq = self.last_seq;
        let in_flight = InFlight {
            seq,
            items: request.items().to_vec(),
        };

        match self.mode {
            OptimizationMode::SingleStore => begin_slot(&mut self.single, in_flight),
            OptimizationMode::MultiStore => begin_slot(&mut self.multi, in_flight),
        }
        self.notice = None;
        self.expansion.reset();

        Ok(PendingRequest {
            seq,
            trigger,
            request,
        })
    }

    /// Apply a response; anything but the live request for its mode is discarded.
    pub fn complete(&mut self, seq: u64, outcome: Outcome) -> Completion {
        match outcome {
            Outcome::SingleStore(result) => {
                let Some(items) = self.single.settle(seq) else {
                    debug!("discarding stale single-store response #{}", seq);
                    return Completion::Stale;
                };
                match result.and_then(|r| validate_ranked_stores(r, &items).map_err(Into::into)) {
                    Ok(result) => {
                        if result.is_partial_match && self.mode == OptimizationMode::SingleStore {
                            self.notice = Some(PartialMatchNotice {
                                seq,
                                stores_with_missing: stores_with_missing_items(&result).len(),
                            });
                        }
                        info!(
                            "single-store response #{}: {} store(s), partial={}",
                            seq,
                            result.ranked_stores.len(),
                            result.is_partial_match
                        );
                        apply_success(&mut self.single, result, items);
                    }
                    Err(e) => apply_failure(&mut self.single, seq, e),
                }
            }
            Outcome::MultiStore(result) => {
                let Some(items) = self.multi.settle(seq) else {
                    debug!("discarding stale multi-store response #{}", seq);
                    return Completion::Stale;
                };
                match result.and_then(|r| validate_multi_store(r, &items).map_err(Into::into)) {
                    Ok(result) => {
                        info!(
                            "multi-store response #{}: {} solution(s)",
                            seq,
                            result.solutions.len()
                        );
                        apply_success(&mut self.multi, result, items);
                    }
                    Err(e) => apply_failure(&mut self.multi, seq, e),
                }
            }
        }
        Completion::Applied
    }

    /// Phase of the active mode
    pub fn phase(&self) -> &Phase {
        match self.mode {
            OptimizationMode::SingleStore => &self.single.phase,
            OptimizationMode::MultiStore => &self.multi.phase,
        }
    }

    pub fn is_loading(&self) -> bool {
        *self.phase() == Phase::Loading
    }

    /// User-displayable error for the active mode
    pub fn error(&self) -> Option<&str> {
        match self.phase() {
            Phase::Failed { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Never exposed while multi-store mode is active
    pub fn single_store_result(&self) -> Option<Arc<RankedStoresResult>> {
        match self.mode {
            OptimizationMode::SingleStore => self.single.result.clone(),
            OptimizationMode::MultiStore => None,
        }
    }

    /// Never exposed while single-store mode is active
    pub fn multi_store_result(&self) -> Option<Arc<TopMultiStoreSolutionsResult>> {
        match self.mode {
            OptimizationMode::MultiStore => self.multi.result.clone(),
            OptimizationMode::SingleStore => None,
        }
    }

    /// Peek at the pending notice without consuming it
    pub fn partial_match_notice(&self) -> Option<&PartialMatchNotice> {
        self.notice.as_ref()
    }

    /// Consume the pending notice; the result itself stays.
    pub fn take_partial_match_notice(&mut self) -> Option<PartialMatchNotice> {
        self.notice.take()
    }

    /// Missing items of `store`, named from the list its result was requested for
    pub fn missing_items_for(&self, store: &SingleStoreEvaluation) -> Vec<MissingItem> {
        missing_items_for(store, &self.single.result_items)
    }

    pub fn expansion(&self) -> &ExpansionState {
        &self.expansion
    }

    pub fn toggle_solution(&mut self, key: &str) {
        self.expansion.toggle_solution(key);
    }

    pub fn toggle_store(&mut self, solution_key: &str, store_id: &str) {
        self.expansion.toggle_store(solution_key, store_id);
    }
}

fn begin_slot<T>(slot: &mut ModeSlot<T>, in_flight: InFlight) {
    if let Some(previous) = slot.in_flight.as_ref() {
        debug!("request #{} superseded by #{}", previous.seq, in_flight.seq);
    }
    slot.phase = Phase::Loading;
    slot.result = None;
    slot.result_items.clear();
    slot.in_flight = Some(in_flight);
}

// Nothing is in flight afterwards, so no late response can replace the failure.
fn fail_slot<T>(slot: &mut ModeSlot<T>, failed: Phase) {
    slot.phase = failed;
    slot.in_flight = None;
    slot.result = None;
    slot.result_items.clear();
}

fn same_items(current: &[OptimizationItem], next: &[OptimizationItem]) -> bool {
    current.len() == next.len()
        && current.iter().all(|item| {
            next.iter()
                .any(|n| n.item_code == item.item_code && n.quantity == item.quantity)
        })
}

fn apply_success<T>(slot: &mut ModeSlot<T>, result: T, items: Vec<OptimizationItem>) {
    slot.phase = Phase::Success;
    slot.result = Some(Arc::new(result));
    slot.result_items = items;
}

fn apply_failure<T>(slot: &mut ModeSlot<T>, seq: u64, error: OptimizerError) {
    warn!("request #{} failed: {}", seq, error);
    slot.phase = Phase::Failed {
        kind: error.kind(),
        message: error.user_message(),
    };
}

/// Shared handle to the session state, passed to the driver and the view
#[derive(Debug, Clone, Default)]
pub struct SessionHandle(Arc<Mutex<OrchestratorState>>);

impl SessionHandle {
    pub fn new(state: OrchestratorState) -> Self {
        Self(Arc::new(Mutex::new(state)))
    }

    /// Never hold the guard across an `.await`.
    pub fn lock(&self) -> MutexGuard<'_, OrchestratorState> {
        self.0.lock()
    }
}

// ---------- Async driver ----------

/// Runs requests against a backend and feeds the responses back into the session
#[derive(Debug)]
pub struct Orchestrator<B> {
    backend: B,
    session: SessionHandle,
    timeout: Duration,
}

impl<B: OptimizationBackend> Orchestrator<B> {
    pub fn new(backend: B, session: SessionHandle) -> Self {
        Self {
            backend,
            session,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Issue one request for the active mode and apply its response.
    ///
    /// Backend failures end up in the session state; only a request that
    /// could not be built is returned as an error.
    pub async fn run(&self, trigger: Trigger) -> Result<Completion> {
        let pending = self.session.lock().begin(trigger)?;

        info!(
            "issuing {} request #{} via {} ({:?}, {} item(s), lambda={})",
            pending.request.mode(),
            pending.seq,
            self.backend.name(),
            pending.trigger,
            pending.request.items().len(),
            pending.request.lambda_travel()
        );

        let outcome = match &pending.request {
            OptimizationRequest::SingleStore(body) => Outcome::SingleStore(
                self.bounded(self.backend.optimize_single_store(body)).await,
            ),
            OptimizationRequest::MultiStore(body) => Outcome::MultiStore(
                self.bounded(self.backend.optimize_multi_store(body)).await,
            ),
        };

        Ok(self.session.lock().complete(pending.seq, outcome))
    }

    /// Replace the list; runs a search when the inputs are now complete.
    pub async fn update_items(&self, items: Vec<OptimizationItem>) -> Option<Completion> {
        let ready = {
            let mut state = self.session.lock();
            state.set_items(items);
            state.should_auto_run()
        };
        self.auto_run(ready).await
    }

    /// Record a location signal; runs a search when the inputs are now complete.
    pub async fn update_location(&self, location: LocationStatus) -> Option<Completion> {
        let ready = {
            let mut state = self.session.lock();
            state.set_location(location);
            state.should_auto_run()
        };
        self.auto_run(ready).await
    }

    /// Switch mode and search again. Selecting the active mode does nothing.
    pub async fn select_mode(&self, mode: OptimizationMode) -> Result<Option<Completion>> {
        let changed = self.session.lock().select_mode(mode);
        if !changed {
            return Ok(None);
        }
        self.run(Trigger::ModeSwitched).await.map(Some)
    }

    pub async fn toggle_chip(&self, chip: PriorityChip) -> Result<Completion> {
        self.session.lock().toggle_chip(chip);
        self.run(Trigger::ChipToggled).await
    }

    pub async fn retry(&self) -> Result<Completion> {
        self.run(Trigger::Retry).await
    }

    async fn auto_run(&self, ready: bool) -> Option<Completion> {
        if !ready {
            return None;
        }
        match self.run(Trigger::AutoRun).await {
            Ok(completion) => Some(completion),
            Err(e) => {
                debug!("auto-run skipped: {}", e);
                None
            }
        }
    }

    async fn bounded<T>(&self, call: impl std::future::Future<Output = Result<T>>) -> Result<T> {
        tokio::time::timeout(self.timeout, call)
            .await
            .unwrap_or(Err(OptimizerError::Timeout))
    }
}
