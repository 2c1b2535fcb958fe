//! Single-run driver: job start, incremental stream consumption, terminal
//! transitions.

use super::decoder::FragmentReader;
use super::transcript::failure_line;
use crate::backend::Backend;
use crate::error::Result;
use crate::state::SharedState;
use async_trait::async_trait;
use std::sync::Arc;

/// Receives the completion event of a run.
///
/// Called after the completion marker is appended and before `loading` is
/// cleared, so follow-up refreshes are part of the run.
#[async_trait]
pub trait ExecutionListener: Send + Sync {
    async fn on_completed(&self);
}

/// How a call to [`ExecutionOrchestrator::run`] ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Stream reached end-of-stream
    Completed,
    /// Start request or stream failed; the transcript carries the detail
    Failed,
    /// Backend not confirmed; transcript holds only the refusal line
    NotConnected,
    /// Another run was still in flight; nothing changed
    Rejected,
}

/// Drives a run to completion or failure
pub struct ExecutionOrchestrator {
    backend: Arc<dyn Backend>,
    state: SharedState,
}

impl ExecutionOrchestrator {
    pub fn new(backend: Arc<dyn Backend>, state: SharedState) -> Self {
        Self { backend, state }
    }

    /// Run the job for `topic`. There is no cancellation and no retry: the
    /// call returns only at end-of-stream or on the first error.
    pub async fn run(&self, topic: &str, listener: &dyn ExecutionListener) -> RunOutcome {
        if self.state.read(|s| s.execution().is_loading()).await {
            tracing::warn!(topic = %topic, "Run requested while another is in flight");
            return RunOutcome::Rejected;
        }

        if !self.state.is_connected().await {
            tracing::warn!(topic = %topic, "Run requested without a connected backend");
            self.state
                .update(|s| s.refuse_execution_disconnected())
                .await;
            return RunOutcome::NotConnected;
        }

        if !self.state.update(|s| s.begin_execution()).await {
            return RunOutcome::Rejected;
        }
        tracing::info!(topic = %topic, "Starting run");

        match self.consume(topic).await {
            Ok(fragments) => {
                tracing::info!(topic = %topic, fragments, "Run stream completed");
                self.state.update(|s| s.complete_execution()).await;
                listener.on_completed().await;
                self.state.update(|s| s.finish_execution()).await;
                RunOutcome::Completed
            }
            Err(e) => {
                tracing::error!(topic = %topic, "Run failed: {}", e);
                let line = failure_line(&e.to_string(), self.backend.base_url());
                self.state.update(|s| s.fail_execution(line)).await;
                RunOutcome::Failed
            }
        }
    }

    /// Read the stream strictly in order, appending each non-blank fragment
    /// verbatim. Returns how many fragments were appended.
    async fn consume(&self, topic: &str) -> Result<usize> {
        let stream = self.backend.start_run(topic).await?;
        let mut reader = FragmentReader::new(stream);
        let mut appended = 0;

        while let Some(fragment) = reader.next_fragment().await {
            let text = fragment?;
            if text.trim().is_empty() {
                continue;
            }
            self.state.update(|s| s.append_transcript(text)).await;
            appended += 1;
        }
        Ok(appended)
    }
}
