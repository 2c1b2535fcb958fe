//! Backend HTTP surface
//!
//! The job backend is a black box reached over HTTP. Components talk to it
//! through the [`Backend`] trait so they can be driven by any transport.
//!
//! ```text
//! GET  /health               -> { status: "healthy" }
//! GET  /latest-blog          -> { content } | { error }
//! GET  /latest-linkedin      -> { content } | { error }
//! POST /run-crew-stream      -> raw text stream
//! GET  /memory/list          -> { posts } | { error }
//! GET  /memory/search        -> { posts } | { error }
//! GET  /memory/post/{id}     -> detail | { error }
//! ```

mod http;

pub use http::HttpBackend;

use crate::error::{Error, Result};
use crate::types::{Category, CategoryFilter, MemoryItemDetail, MemoryItemSummary};
use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::pin::Pin;

/// Incrementally delivered run output
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Operations the client needs from the job backend.
///
/// Domain-soft failures (`{ "error": ... }` replies) surface as
/// [`Error::Backend`]; everything else is a transport failure.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Base URL, used in user-facing hints
    fn base_url(&self) -> &str;

    /// Liveness probe. `Ok` only for a healthy payload.
    async fn health(&self) -> Result<()>;

    /// Latest generated content for a category (may be empty)
    async fn latest(&self, category: Category) -> Result<String>;

    /// Start a run; the returned stream yields output as it is produced
    async fn start_run(&self, topic: &str) -> Result<ByteStream>;

    /// Most recent archive entries, optionally filtered by category
    async fn list_posts(
        &self,
        filter: CategoryFilter,
        limit: usize,
    ) -> Result<Vec<MemoryItemSummary>>;

    /// Full-text search across all categories
    async fn search_posts(&self, text: &str, limit: usize) -> Result<Vec<MemoryItemSummary>>;

    /// Single archive entry with content
    async fn get_post(&self, id: i64) -> Result<MemoryItemDetail>;
}

#[derive(Debug, Deserialize)]
struct HealthReply {
    #[serde(default)]
    status: String,
}

#[derive(Debug, Deserialize)]
struct ContentReply {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PostsReply {
    #[serde(default)]
    posts: Option<Vec<MemoryItemSummary>>,
}

/// Message carried by a top-level `error` field, if it is set
fn error_message(value: &serde_json::Value) -> Option<String> {
    match value.get("error")? {
        serde_json::Value::Null | serde_json::Value::Bool(false) => None,
        serde_json::Value::String(s) if s.is_empty() => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Decode a structured reply, mapping the error envelope to a soft failure
pub(crate) fn decode_reply<T: DeserializeOwned>(value: serde_json::Value) -> Result<T> {
    if let Some(message) = error_message(&value) {
        return Err(Error::Backend(message));
    }
    Ok(serde_json::from_value(value)?)
}

pub(crate) fn decode_health(value: serde_json::Value) -> Result<()> {
    let reply: HealthReply = decode_reply(value)?;
    if reply.status == "healthy" {
        Ok(())
    } else {
        Err(Error::Unhealthy(format!("status '{}'", reply.status)))
    }
}

pub(crate) fn decode_content(value: serde_json::Value) -> Result<String> {
    let reply: ContentReply = decode_reply(value)?;
    Ok(reply.content.unwrap_or_default())
}

pub(crate) fn decode_posts(value: serde_json::Value) -> Result<Vec<MemoryItemSummary>> {
    let reply: PostsReply = decode_reply(value)?;
    Ok(reply.posts.unwrap_or_default())
}
