//! Application state owned by the view coordinator
//!
//! Every component reads the same [`AppState`] but changes it only through
//! the named transitions below. [`SharedState`] wraps it in an async lock
//! and bumps a revision counter on each transition so observers can follow
//! along.

use crate::execution::{
    ExecutionPhase, Transcript, COMPLETION_MARKER, NOT_CONNECTED_LINE, START_MARKER,
};
use crate::types::{
    ActiveView, ArtifactSnapshot, Category, CategoryFilter, ConnectivityState, MemoryItemDetail,
    MemoryItemSummary, SearchQuery,
};
use std::sync::Arc;
use tokio::sync::{watch, RwLock};

/// Memory browser portion of the state
#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    query: SearchQuery,
    items: Vec<MemoryItemSummary>,
    error: Option<String>,
    loading: bool,
    generation: u64,
    selection: Option<MemoryItemDetail>,
    selection_generation: u64,
}

impl MemoryState {
    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    pub fn items(&self) -> &[MemoryItemSummary] {
        &self.items
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Generation of the most recently issued list/search request
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn selection(&self) -> Option<&MemoryItemDetail> {
        self.selection.as_ref()
    }
}

/// Execution portion of the state
#[derive(Debug, Clone, Default)]
pub struct ExecutionState {
    phase: ExecutionPhase,
    loading: bool,
    transcript: Transcript,
}

impl ExecutionState {
    pub fn phase(&self) -> ExecutionPhase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }
}

/// Whole client state
#[derive(Debug, Clone, Default)]
pub struct AppState {
    connectivity: ConnectivityState,
    active_view: ActiveView,
    primary: Option<ArtifactSnapshot>,
    secondary: Option<ArtifactSnapshot>,
    execution: ExecutionState,
    memory: MemoryState,
}

impl AppState {
    pub fn connectivity(&self) -> ConnectivityState {
        self.connectivity
    }

    pub fn is_connected(&self) -> bool {
        self.connectivity.is_connected()
    }

    pub fn active_view(&self) -> ActiveView {
        self.active_view
    }

    pub fn snapshot(&self, category: Category) -> Option<&ArtifactSnapshot> {
        match category {
            Category::Primary => self.primary.as_ref(),
            Category::Secondary => self.secondary.as_ref(),
        }
    }

    pub fn execution(&self) -> &ExecutionState {
        &self.execution
    }

    pub fn memory(&self) -> &MemoryState {
        &self.memory
    }

    // -------------------------------------------------------------------
    // Connectivity monitor
    // -------------------------------------------------------------------

    pub(crate) fn set_connectivity(&mut self, state: ConnectivityState) {
        self.connectivity = state;
    }

    // -------------------------------------------------------------------
    // Artifact snapshots
    // -------------------------------------------------------------------

    /// Replace a category's snapshot wholesale
    pub(crate) fn set_snapshot(&mut self, category: Category, content: String) {
        let snapshot = Some(ArtifactSnapshot { category, content });
        match category {
            Category::Primary => self.primary = snapshot,
            Category::Secondary => self.secondary = snapshot,
        }
    }

    // -------------------------------------------------------------------
    // View coordinator
    // -------------------------------------------------------------------

    /// Switch tabs. Returns `true` when this switch activates the memory view.
    pub(crate) fn set_active_view(&mut self, view: ActiveView) -> bool {
        let activated = view == ActiveView::Memory && self.active_view != ActiveView::Memory;
        self.active_view = view;
        activated
    }

    /// Copy the selected item into its category's snapshot and show that
    /// tab. Returns the category, or `None` without a selection.
    pub(crate) fn promote_selection(&mut self) -> Option<Category> {
        let detail = self.memory.selection.clone()?;
        let category = detail.summary.category;
        self.set_snapshot(category, detail.content);
        self.active_view = category.into();
        Some(category)
    }

    // -------------------------------------------------------------------
    // Execution orchestrator
    // -------------------------------------------------------------------

    /// Enter `Running`. Refused while a run is in flight.
    pub(crate) fn begin_execution(&mut self) -> bool {
        if self.execution.loading {
            return false;
        }
        self.execution.loading = true;
        self.execution.phase = ExecutionPhase::Running;
        self.execution.transcript.reset(START_MARKER);
        true
    }

    /// Run attempted without a confirmed backend
    pub(crate) fn refuse_execution_disconnected(&mut self) {
        self.execution.phase = ExecutionPhase::Failed;
        self.execution.loading = false;
        self.execution.transcript.reset(NOT_CONNECTED_LINE);
    }

    pub(crate) fn append_transcript(&mut self, chunk: String) {
        self.execution.transcript.push(chunk);
    }

    /// Stream ended cleanly. `loading` stays set until the follow-up
    /// refresh has been issued.
    pub(crate) fn complete_execution(&mut self) {
        self.execution.transcript.push(COMPLETION_MARKER);
        self.execution.phase = ExecutionPhase::Completed;
    }

    pub(crate) fn finish_execution(&mut self) {
        self.execution.loading = false;
    }

    pub(crate) fn fail_execution(&mut self, line: String) {
        self.execution.transcript.push(line);
        self.execution.phase = ExecutionPhase::Failed;
        self.execution.loading = false;
    }

    /// User-initiated clearing
    pub(crate) fn clear_transcript(&mut self) {
        self.execution.transcript.clear();
    }

    // -------------------------------------------------------------------
    // Memory browser
    // -------------------------------------------------------------------

    pub(crate) fn set_query_text(&mut self, text: String) {
        self.memory.query.text = text;
    }

    pub(crate) fn set_category_filter(&mut self, filter: CategoryFilter) {
        self.memory.query.filter = filter;
    }

    /// Start a new query generation and mark the list as loading
    pub(crate) fn begin_memory_query(&mut self) -> u64 {
        self.memory.generation += 1;
        self.memory.loading = true;
        self.memory.error = None;
        self.memory.generation
    }

    /// Apply a settled list/search request. Results from a superseded
    /// generation are dropped and `false` is returned.
    pub(crate) fn apply_memory_result(
        &mut self,
        generation: u64,
        result: std::result::Result<Vec<MemoryItemSummary>, String>,
    ) -> bool {
        if generation != self.memory.generation {
            return false;
        }
        self.memory.loading = false;
        match result {
            Ok(items) => {
                self.memory.items = items;
                self.memory.error = None;
            }
            Err(message) => {
                self.memory.items.clear();
                self.memory.error = Some(message);
            }
        }
        true
    }

    pub(crate) fn begin_selection(&mut self) -> u64 {
        self.memory.selection_generation += 1;
        self.memory.selection_generation
    }

    /// Apply a settled item fetch, under the same staleness rule as lists
    pub(crate) fn apply_selection(
        &mut self,
        generation: u64,
        result: std::result::Result<MemoryItemDetail, String>,
    ) -> bool {
        if generation != self.memory.selection_generation {
            return false;
        }
        match result {
            Ok(detail) => {
                self.memory.selection = Some(detail);
                self.memory.error = None;
            }
            Err(message) => {
                self.memory.selection = None;
                self.memory.error = Some(message);
            }
        }
        true
    }

    /// Drop the selection; any item fetch still in flight is superseded
    pub(crate) fn clear_selection(&mut self) {
        self.memory.selection_generation += 1;
        self.memory.selection = None;
    }
}

/// Cloneable handle to the application state
#[derive(Clone)]
pub struct SharedState {
    inner: Arc<RwLock<AppState>>,
    revision: Arc<watch::Sender<u64>>,
}

impl SharedState {
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(RwLock::new(AppState::default())),
            revision: Arc::new(revision),
        }
    }

    /// Read through a closure
    pub async fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        let state = self.inner.read().await;
        f(&state)
    }

    /// Apply a transition and notify observers
    pub(crate) async fn update<R>(&self, f: impl FnOnce(&mut AppState) -> R) -> R {
        let result = {
            let mut state = self.inner.write().await;
            f(&mut state)
        };
        self.revision.send_modify(|rev| *rev += 1);
        result
    }

    /// Point-in-time copy of the whole state
    pub async fn snapshot(&self) -> AppState {
        self.inner.read().await.clone()
    }

    /// Receiver that changes after every transition
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    pub async fn is_connected(&self) -> bool {
        self.read(|s| s.is_connected()).await
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}
