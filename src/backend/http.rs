//! reqwest-backed implementation of the backend surface

use super::{
    decode_content, decode_health, decode_posts, decode_reply, error_message, Backend, ByteStream,
};
use crate::error::{Error, Result};
use crate::types::{Category, CategoryFilter, MemoryItemDetail, MemoryItemSummary};
use async_trait::async_trait;
use futures::StreamExt;

/// HTTP client for the job backend
#[derive(Clone)]
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    /// Create a client for the given base URL. No request timeout is set:
    /// runs stream for as long as the backend keeps producing output.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET a JSON document. A non-success status is always a failure: an
    /// `error` envelope keeps its message, anything else reports the status.
    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<serde_json::Value> {
        tracing::debug!(path = %path, "GET");
        let response = self.client.get(self.url(path)).query(query).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<serde_json::Value>(&body)
                .ok()
                .and_then(|value| error_message(&value));
            tracing::debug!(path = %path, status = status.as_u16(), "Non-success reply");
            return Err(match message {
                Some(message) => Error::Backend(message),
                None => Error::Status(status.as_u16()),
            });
        }
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn health(&self) -> Result<()> {
        let value = self.get_json("/health", &[]).await?;
        decode_health(value)
    }

    async fn latest(&self, category: Category) -> Result<String> {
        let value = self.get_json(category.latest_path(), &[]).await?;
        decode_content(value)
    }

    async fn start_run(&self, topic: &str) -> Result<ByteStream> {
        tracing::debug!(topic = %topic, "POST /run-crew-stream");
        let response = self
            .client
            .post(self.url("/run-crew-stream"))
            .json(&serde_json::json!({ "topic": topic }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status(status.as_u16()));
        }

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| Error::Stream(e.to_string())));
        Ok(Box::pin(stream))
    }

    async fn list_posts(
        &self,
        filter: CategoryFilter,
        limit: usize,
    ) -> Result<Vec<MemoryItemSummary>> {
        let mut query = Vec::with_capacity(2);
        if let Some(kind) = filter.as_query() {
            query.push(("filter_type", kind.to_string()));
        }
        query.push(("limit", limit.to_string()));

        let value = self.get_json("/memory/list", &query).await?;
        decode_posts(value)
    }

    async fn search_posts(&self, text: &str, limit: usize) -> Result<Vec<MemoryItemSummary>> {
        let query = [("q", text.to_string()), ("limit", limit.to_string())];
        let value = self.get_json("/memory/search", &query).await?;
        decode_posts(value)
    }

    async fn get_post(&self, id: i64) -> Result<MemoryItemDetail> {
        let value = self.get_json(&format!("/memory/post/{}", id), &[]).await?;
        decode_reply(value)
    }
}
