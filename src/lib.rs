//! Mindful Crew - client orchestrator for a content-generation backend
//!
//! Drives a backend that runs a generation job for a topic, streams the
//! job's progress as plain text, and keeps an archive of the posts it has
//! produced. This crate holds the client side: connectivity, the latest
//! artifact per category, the archive browser and the streaming run.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                         ViewCoordinator                          │
//! │  ┌──────────────┐ ┌──────────────┐ ┌────────────┐ ┌────────────┐ │
//! │  │ Connectivity │ │  Artifact    │ │  Memory    │ │ Execution  │ │
//! │  │   Monitor    │ │ Store Client │ │  Browser   │ │Orchestrator│ │
//! │  └──────┬───────┘ └──────┬───────┘ └─────┬──────┘ └─────┬──────┘ │
//! │         └────────────────┴───────┬───────┴──────────────┘        │
//! │                      SharedState (AppState)                      │
//! └──────────────────────────────────┼───────────────────────────────┘
//!                                    │ HTTP (JSON + chunked text)
//! ┌──────────────────────────────────▼───────────────────────────────┐
//! │                        Generation backend                        │
//! │ /health  /latest-*  /run-crew-stream  /memory/list|search|post   │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`backend`]: Backend trait and its HTTP implementation
//! - [`connectivity`]: Liveness probe
//! - [`artifacts`]: Latest artifact per category
//! - [`memory`]: Debounced archive list/search with stale-reply discard
//! - [`execution`]: Streaming run orchestration
//! - [`coordinator`]: Cross-component effects and view switching
//! - [`config`]: Configuration management

pub mod artifacts;
pub mod backend;
pub mod config;
pub mod connectivity;
pub mod coordinator;
pub mod error;
pub mod execution;
pub mod memory;
pub mod state;
pub mod types;

#[cfg(test)]
mod testing;

pub use config::ClientConfig;
pub use coordinator::ViewCoordinator;
pub use error::{Error, Result};
