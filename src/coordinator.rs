//! View coordinator
//!
//! Owns the application state and the components that act on it, and
//! carries the cross-component effects between them:
//!
//! ```text
//!            ┌──────────── ViewCoordinator (AppState) ────────────┐
//!  user ───> │ ConnectivityMonitor  ArtifactStoreClient           │
//!            │ MemoryBrowser        ExecutionOrchestrator ──┐     │
//!            │        ▲                      ▲             │     │
//!            │        └── on_completed ──────┴─────────────┘     │
//!            └────────────────────────────────────────────────────┘
//! ```

use crate::artifacts::ArtifactStoreClient;
use crate::backend::{Backend, HttpBackend};
use crate::config::ClientConfig;
use crate::connectivity::ConnectivityMonitor;
use crate::error::Result;
use crate::execution::{ExecutionListener, ExecutionOrchestrator, RunOutcome};
use crate::memory::MemoryBrowser;
use crate::state::SharedState;
use crate::types::{ActiveView, Category, CategoryFilter, ConnectivityState, MemoryItemDetail};
use async_trait::async_trait;
use std::sync::Arc;

pub struct ViewCoordinator {
    config: ClientConfig,
    state: SharedState,
    monitor: ConnectivityMonitor,
    artifacts: ArtifactStoreClient,
    browser: MemoryBrowser,
    orchestrator: ExecutionOrchestrator,
}

impl ViewCoordinator {
    /// Wire every component to one backend and one state
    pub fn new(config: ClientConfig, backend: Arc<dyn Backend>) -> Self {
        let state = SharedState::new();
        Self {
            monitor: ConnectivityMonitor::new(backend.clone(), state.clone()),
            artifacts: ArtifactStoreClient::new(backend.clone(), state.clone()),
            browser: MemoryBrowser::new(backend.clone(), state.clone(), config.memory.clone()),
            orchestrator: ExecutionOrchestrator::new(backend, state.clone()),
            state,
            config,
        }
    }

    /// Coordinator talking HTTP to `config.backend.base_url`
    pub fn with_http(config: ClientConfig) -> Self {
        let backend = Arc::new(HttpBackend::new(&config.backend.base_url));
        Self::new(config, backend)
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Probe only
    pub async fn connect(&self) -> bool {
        self.monitor.probe().await
    }

    /// Probe, then load both snapshots (or the disconnected hint)
    pub async fn startup(&self) -> bool {
        let connected = self.monitor.probe().await;
        if connected {
            self.artifacts.refresh_all().await;
        } else {
            self.artifacts.show_disconnected().await;
        }
        connected
    }

    /// Manual re-probe. A recovery reloads the snapshots and, if the memory
    /// view is showing, its list.
    pub async fn retry_connection(&self) -> bool {
        let before = self.monitor.current().await;
        let connected = self.monitor.probe().await;
        if connected && before != ConnectivityState::Connected {
            self.artifacts.refresh_all().await;
            if self.active_view().await == ActiveView::Memory {
                self.browser.dispatch_now().await;
            }
        }
        connected
    }

    pub async fn active_view(&self) -> ActiveView {
        self.state.read(|s| s.active_view()).await
    }

    /// Switch tabs. Entering the memory view while connected issues its
    /// current query once.
    pub async fn switch_view(&self, view: ActiveView) {
        let activated = self.state.update(|s| s.set_active_view(view)).await;
        if activated && self.state.is_connected().await {
            self.browser.dispatch_now().await;
        }
    }

    /// Start a run. Overlapping runs are rejected.
    pub async fn run(&self, topic: &str) -> RunOutcome {
        self.orchestrator.run(topic, self).await
    }

    /// User-initiated transcript clearing
    pub async fn clear_transcript(&self) {
        self.state.update(|s| s.clear_transcript()).await;
    }

    pub async fn set_query_text(&self, text: impl Into<String>) {
        self.browser.set_query_text(text).await;
    }

    pub async fn set_category_filter(&self, filter: CategoryFilter) {
        self.browser.set_category_filter(filter).await;
    }

    pub async fn select_item(&self, id: i64) -> Result<MemoryItemDetail> {
        self.browser.select_item(id).await
    }

    pub async fn refresh_memory(&self) {
        self.browser.refresh().await;
    }

    /// Promote the selected archive item to its category's current content
    /// and switch to that tab.
    pub async fn open_selection(&self) -> Option<Category> {
        let opened = self.state.update(|s| s.promote_selection()).await;
        if let Some(category) = opened {
            tracing::info!(category = %category, "Opened archived item");
        }
        opened
    }
}

#[async_trait]
impl ExecutionListener for ViewCoordinator {
    async fn on_completed(&self) {
        self.artifacts.refresh_all().await;
        if self.active_view().await == ActiveView::Memory {
            self.browser.dispatch_now().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::{COMPLETION_MARKER, NOT_CONNECTED_LINE, START_MARKER};
    use crate::testing::{detail, summary, FakeBackend, Reply, RunScript};
    use crate::types::MemoryRequest;

    fn coordinator(backend: Arc<FakeBackend>) -> ViewCoordinator {
        ViewCoordinator::new(ClientConfig::default(), backend)
    }

    #[tokio::test]
    async fn test_startup_loads_snapshots() {
        let backend = Arc::new(FakeBackend::new());
        let view = coordinator(backend.clone());

        assert!(view.startup().await);
        let snapshot = view.state().snapshot().await;
        assert_eq!(
            snapshot.snapshot(Category::Primary).map(|s| s.content.as_str()),
            Some("# Latest blog")
        );
        assert_eq!(backend.latest_calls(Category::Secondary), 1);
    }

    #[tokio::test]
    async fn test_unreachable_backend_run_reports_single_line() {
        let backend = Arc::new(FakeBackend::new());
        backend.set_healthy(false);
        let view = coordinator(backend.clone());

        assert!(!view.startup().await);
        let outcome = view.run("digital detox").await;

        assert_eq!(outcome, RunOutcome::NotConnected);
        let snapshot = view.state().snapshot().await;
        assert_eq!(
            snapshot.execution().transcript().chunks(),
            &[NOT_CONNECTED_LINE.to_string()]
        );
        assert!(!snapshot.execution().is_loading());
        assert_eq!(backend.latest_calls(Category::Primary), 0);
        assert_eq!(backend.latest_calls(Category::Secondary), 0);
        assert!(backend.run_topics().is_empty());
    }

    #[tokio::test]
    async fn test_completed_run_refetches_each_category_once() {
        let backend = Arc::new(FakeBackend::new());
        let view = coordinator(backend.clone());
        view.connect().await;
        backend.script_run(RunScript::Chunks(vec![
            Ok(b"Hello ".to_vec()),
            Ok(b"world".to_vec()),
        ]));
        backend.set_latest(Category::Primary, Reply::Ok("# Fresh blog".to_string()));

        let outcome = view.run("digital detox").await;

        assert_eq!(outcome, RunOutcome::Completed);
        let snapshot = view.state().snapshot().await;
        let transcript = snapshot.execution().transcript().text();
        let body = transcript
            .strip_prefix(START_MARKER)
            .and_then(|t| t.strip_suffix(COMPLETION_MARKER));
        assert_eq!(body, Some("Hello world"));
        assert_eq!(backend.latest_calls(Category::Primary), 1);
        assert_eq!(backend.latest_calls(Category::Secondary), 1);
        assert_eq!(
            snapshot.snapshot(Category::Primary).map(|s| s.content.as_str()),
            Some("# Fresh blog")
        );
        assert!(!snapshot.execution().is_loading());
        assert!(backend.memory_calls().is_empty());
    }

    #[tokio::test]
    async fn test_completed_run_refreshes_memory_view() {
        let backend = Arc::new(FakeBackend::new());
        let view = coordinator(backend.clone());
        view.connect().await;
        view.switch_view(ActiveView::Memory).await;
        backend.push_memory_reply(Reply::Ok(vec![summary(11, Category::Primary, "New")]));

        view.run("focus").await;

        assert_eq!(backend.memory_calls().len(), 2);
        let items = view.state().read(|s| s.memory().items().to_vec()).await;
        assert_eq!(items[0].id, 11);
    }

    #[tokio::test]
    async fn test_memory_activation_queries_once() {
        let backend = Arc::new(FakeBackend::new());
        let view = coordinator(backend.clone());
        view.connect().await;

        view.switch_view(ActiveView::Memory).await;
        view.switch_view(ActiveView::Memory).await;
        assert_eq!(
            backend.memory_calls(),
            vec![MemoryRequest::List {
                filter: CategoryFilter::All
            }]
        );

        view.switch_view(ActiveView::Primary).await;
        view.state()
            .update(|s| s.set_query_text("sleep".to_string()))
            .await;
        view.switch_view(ActiveView::Memory).await;
        assert_eq!(backend.memory_calls().len(), 2);
        assert_eq!(
            backend.memory_calls()[1],
            MemoryRequest::Search {
                text: "sleep".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_memory_activation_needs_connection() {
        let backend = Arc::new(FakeBackend::new());
        backend.set_healthy(false);
        let view = coordinator(backend.clone());
        view.connect().await;

        view.switch_view(ActiveView::Memory).await;
        assert!(backend.memory_calls().is_empty());

        backend.set_healthy(true);
        assert!(view.retry_connection().await);
        assert_eq!(backend.memory_calls().len(), 1);
        assert_eq!(backend.latest_calls(Category::Primary), 1);
    }

    #[tokio::test]
    async fn test_select_then_open_promotes_content() {
        let backend = Arc::new(FakeBackend::new());
        backend.insert_post(5, Reply::Ok(detail(5, Category::Secondary, "Archived post body")));
        let view = coordinator(backend.clone());
        view.startup().await;
        view.switch_view(ActiveView::Memory).await;

        let fetched = view.select_item(5).await.unwrap();
        let opened = view.open_selection().await;

        assert_eq!(opened, Some(Category::Secondary));
        let snapshot = view.state().snapshot().await;
        assert_eq!(snapshot.active_view(), ActiveView::Secondary);
        assert_eq!(
            snapshot.snapshot(Category::Secondary).map(|s| s.content.clone()),
            Some(fetched.content)
        );
    }

    #[tokio::test]
    async fn test_open_without_selection_is_noop() {
        let view = coordinator(Arc::new(FakeBackend::new()));
        view.startup().await;
        view.switch_view(ActiveView::Memory).await;

        assert_eq!(view.open_selection().await, None);
        assert_eq!(view.active_view().await, ActiveView::Memory);
    }

    #[tokio::test]
    async fn test_probe_twice_has_no_side_effects() {
        let backend = Arc::new(FakeBackend::new());
        let view = coordinator(backend.clone());

        assert!(view.connect().await);
        assert!(view.connect().await);

        let snapshot = view.state().snapshot().await;
        assert_eq!(snapshot.connectivity(), ConnectivityState::Connected);
        assert!(snapshot.execution().transcript().is_empty());
        assert!(snapshot.memory().items().is_empty());
        assert!(backend.memory_calls().is_empty());
    }

    #[tokio::test]
    async fn test_clear_transcript() {
        let backend = Arc::new(FakeBackend::new());
        let view = coordinator(backend);
        view.connect().await;
        view.run("topic").await;
        assert!(!view.state().read(|s| s.execution().transcript().is_empty()).await);

        view.clear_transcript().await;
        assert!(view.state().read(|s| s.execution().transcript().is_empty()).await);
    }
}
