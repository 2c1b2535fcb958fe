//! Artifact store client
//!
//! Fetches the latest generated artifact per category and records it as
//! that category's snapshot, replacing whatever was there.

use crate::backend::Backend;
use crate::error::Error;
use crate::state::SharedState;
use crate::types::{ArtifactSnapshot, Category};
use std::sync::Arc;

/// Why a latest-artifact fetch produced no snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactFailure {
    /// Skipped: backend not confirmed
    NotConnected,
    /// Backend has nothing for this category
    Missing(String),
    /// The request itself failed
    Unavailable(String),
}

impl ArtifactFailure {
    /// Text shown in place of the content. `None` means keep what is shown.
    pub fn placeholder(&self, category: Category) -> Option<String> {
        match self {
            Self::NotConnected => None,
            Self::Missing(message) => Some(format!(
                "Backend connected, but no {} found: {}",
                category.label(),
                message
            )),
            Self::Unavailable(_) => Some(format!(
                "Backend connected, but failed to load {}.",
                category.label()
            )),
        }
    }
}

/// Shown for every category when the startup probe fails
pub fn disconnected_placeholder(base_url: &str) -> String {
    format!(
        "Backend not connected. Please ensure the backend server is running at {}.",
        base_url
    )
}

fn empty_placeholder(category: Category) -> String {
    format!("No {} content found.", category.label())
}

pub struct ArtifactStoreClient {
    backend: Arc<dyn Backend>,
    state: SharedState,
}

impl ArtifactStoreClient {
    pub fn new(backend: Arc<dyn Backend>, state: SharedState) -> Self {
        Self { backend, state }
    }

    /// Fetch without touching state
    pub async fn fetch_latest(
        &self,
        category: Category,
    ) -> std::result::Result<ArtifactSnapshot, ArtifactFailure> {
        if !self.state.is_connected().await {
            return Err(ArtifactFailure::NotConnected);
        }
        match self.backend.latest(category).await {
            Ok(content) => Ok(ArtifactSnapshot { category, content }),
            Err(Error::Backend(message)) => Err(ArtifactFailure::Missing(message)),
            Err(e) => {
                tracing::warn!(category = %category, "Failed to load latest artifact: {}", e);
                Err(ArtifactFailure::Unavailable(e.to_string()))
            }
        }
    }

    /// Fetch and record a category's snapshot
    pub async fn refresh(&self, category: Category) {
        let content = match self.fetch_latest(category).await {
            Ok(snapshot) if snapshot.content.is_empty() => empty_placeholder(category),
            Ok(snapshot) => snapshot.content,
            Err(failure) => match failure.placeholder(category) {
                Some(text) => text,
                None => return,
            },
        };
        self.state
            .update(|s| s.set_snapshot(category, content))
            .await;
    }

    /// Refresh both categories, one after the other
    pub async fn refresh_all(&self) {
        for category in Category::ALL {
            self.refresh(category).await;
        }
    }

    /// Replace both snapshots with the disconnected hint
    pub async fn show_disconnected(&self) {
        let text = disconnected_placeholder(self.backend.base_url());
        self.state
            .update(|s| {
                for category in Category::ALL {
                    s.set_snapshot(category, text.clone());
                }
            })
            .await;
    }
}
