//! Connectivity monitor
//!
//! The only writer of [`ConnectivityState`]. Each probe is authoritative
//! about the check it just made; overlapping probes settle last-write-wins.

use crate::backend::Backend;
use crate::state::SharedState;
use crate::types::ConnectivityState;
use std::sync::Arc;

pub struct ConnectivityMonitor {
    backend: Arc<dyn Backend>,
    state: SharedState,
}

impl ConnectivityMonitor {
    pub fn new(backend: Arc<dyn Backend>, state: SharedState) -> Self {
        Self { backend, state }
    }

    /// Check liveness and record the result
    pub async fn probe(&self) -> bool {
        let next = match self.backend.health().await {
            Ok(()) => {
                tracing::info!(base_url = %self.backend.base_url(), "Backend connected");
                ConnectivityState::Connected
            }
            Err(e) => {
                tracing::warn!(
                    base_url = %self.backend.base_url(),
                    "Backend connection failed: {}",
                    e
                );
                ConnectivityState::Disconnected
            }
        };
        self.state.update(|s| s.set_connectivity(next)).await;
        next.is_connected()
    }

    pub async fn current(&self) -> ConnectivityState {
        self.state.read(|s| s.connectivity()).await
    }
}
