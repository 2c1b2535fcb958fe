//! Debounced list/search over the memory archive
//!
//! Query edits arm a timer; each new edit aborts the armed one, so a burst
//! of edits yields a single request carrying the final query. Requests are
//! never cancelled once sent. Each one is tagged with the generation it was
//! issued under, and its reply is applied only if that generation is still
//! current.

use crate::backend::Backend;
use crate::config::MemoryConfig;
use crate::error::{Error, Result};
use crate::state::SharedState;
use crate::types::{ActiveView, CategoryFilter, MemoryItemDetail, MemoryRequest};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Armed debounce timer
struct PendingTimer {
    ticket: u64,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct TimerSlot {
    next_ticket: u64,
    pending: Option<PendingTimer>,
}

struct BrowserInner {
    backend: Arc<dyn Backend>,
    state: SharedState,
    config: MemoryConfig,
    timer: Mutex<TimerSlot>,
}

/// Memory browser. Cheap to clone; clones share timers and state.
#[derive(Clone)]
pub struct MemoryBrowser {
    inner: Arc<BrowserInner>,
}

impl MemoryBrowser {
    pub fn new(backend: Arc<dyn Backend>, state: SharedState, config: MemoryConfig) -> Self {
        Self {
            inner: Arc::new(BrowserInner {
                backend,
                state,
                config,
                timer: Mutex::new(TimerSlot::default()),
            }),
        }
    }

    /// Update the search text and re-arm the debounce timer
    pub async fn set_query_text(&self, text: impl Into<String>) {
        let text = text.into();
        self.inner.state.update(|s| s.set_query_text(text)).await;
        self.schedule().await;
    }

    /// Update the category filter and re-arm the debounce timer
    pub async fn set_category_filter(&self, filter: CategoryFilter) {
        self.inner
            .state
            .update(|s| s.set_category_filter(filter))
            .await;
        self.schedule().await;
    }

    /// Abort any armed timer, then arm a fresh one if the memory view is
    /// showing and the backend is connected.
    async fn schedule(&self) {
        let mut slot = self.inner.timer.lock().await;
        if let Some(previous) = slot.pending.take() {
            previous.handle.abort();
        }

        let (connected, showing) = self
            .inner
            .state
            .read(|s| (s.is_connected(), s.active_view() == ActiveView::Memory))
            .await;
        if !connected || !showing {
            return;
        }

        slot.next_ticket += 1;
        let ticket = slot.next_ticket;
        let delay = self.inner.config.debounce();
        let browser = self.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if browser.claim_timer(ticket).await {
                browser.issue().await;
            }
        });
        slot.pending = Some(PendingTimer { ticket, handle });
    }

    /// Fired timer takes itself out of the slot. A timer that was
    /// superseded in the meantime finds a different ticket and stands down.
    async fn claim_timer(&self, ticket: u64) -> bool {
        let mut slot = self.inner.timer.lock().await;
        match slot.pending.as_ref() {
            Some(pending) if pending.ticket == ticket => {
                slot.pending = None;
                true
            }
            _ => false,
        }
    }

    async fn cancel_timer(&self) {
        if let Some(previous) = self.inner.timer.lock().await.pending.take() {
            previous.handle.abort();
        }
    }

    /// Whether a debounce timer is armed and has not fired yet
    pub async fn has_pending(&self) -> bool {
        self.inner.timer.lock().await.pending.is_some()
    }

    /// Issue the current query now, superseding any armed timer
    pub async fn dispatch_now(&self) {
        self.cancel_timer().await;
        self.issue().await;
    }

    /// Clear the selection and re-issue the current query
    pub async fn refresh(&self) {
        self.inner.state.update(|s| s.clear_selection()).await;
        self.dispatch_now().await;
    }

    /// Send the request the current query resolves to and apply the reply
    /// if no newer request was issued meanwhile.
    async fn issue(&self) {
        let state = &self.inner.state;
        let Some((request, generation)) = state
            .update(|s| {
                if !s.is_connected() {
                    return None;
                }
                let request = s.memory().query().request();
                Some((request, s.begin_memory_query()))
            })
            .await
        else {
            return;
        };

        tracing::debug!(generation, request = ?request, "Memory query issued");
        let limit = self.inner.config.page_limit;
        let outcome = match &request {
            MemoryRequest::List { filter } => self
                .inner
                .backend
                .list_posts(*filter, limit)
                .await
                .map_err(|e| failure_message(&e, "Failed to load memory list")),
            MemoryRequest::Search { text } => self
                .inner
                .backend
                .search_posts(text, limit)
                .await
                .map_err(|e| failure_message(&e, "Search failed")),
        };

        let applied = state
            .update(|s| s.apply_memory_result(generation, outcome))
            .await;
        if applied {
            tracing::debug!(generation, "Memory query applied");
        } else {
            tracing::debug!(generation, "Discarding stale memory reply");
        }
    }

    /// Fetch an item's full content and make it the selection. Fails with
    /// [`Error::Superseded`] when a newer selection or refresh replaced this
    /// one while the fetch was in flight.
    pub async fn select_item(&self, id: i64) -> Result<MemoryItemDetail> {
        let state = &self.inner.state;
        if !state.is_connected().await {
            return Err(Error::NotConnected);
        }
        let generation = state.update(|s| s.begin_selection()).await;

        match self.inner.backend.get_post(id).await {
            Ok(detail) => {
                let applied = state
                    .update(|s| s.apply_selection(generation, Ok(detail.clone())))
                    .await;
                if !applied {
                    tracing::debug!(id, "Discarding stale memory item");
                    return Err(Error::Superseded);
                }
                Ok(detail)
            }
            Err(e) => {
                let message = failure_message(&e, "Failed to load post");
                state
                    .update(|s| s.apply_selection(generation, Err(message)))
                    .await;
                Err(e)
            }
        }
    }
}

/// Soft failures show the backend's own message
fn failure_message(e: &Error, fallback: &str) -> String {
    match e {
        Error::Backend(message) => message.clone(),
        other => {
            tracing::warn!("Memory request failed: {}", other);
            fallback.to_string()
        }
    }
}
