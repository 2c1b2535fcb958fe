//! Scriptable in-process backend for component tests

use crate::backend::{Backend, ByteStream};
use crate::error::{Error, Result};
use crate::types::{Category, CategoryFilter, MemoryItemDetail, MemoryItemSummary, MemoryRequest};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::oneshot;

/// Scripted reply
#[derive(Debug, Clone)]
pub(crate) enum Reply<T> {
    Ok(T),
    /// `{ "error": ... }` envelope
    Soft(String),
    /// Connection-level failure
    Transport,
}

impl<T> Reply<T> {
    fn into_result(self) -> Result<T> {
        match self {
            Self::Ok(value) => Ok(value),
            Self::Soft(message) => Err(Error::Backend(message)),
            Self::Transport => Err(refused()),
        }
    }
}

/// Scripted run body
pub(crate) enum RunScript {
    Chunks(Vec<std::result::Result<Vec<u8>, String>>),
    Status(u16),
}

struct Scripted {
    reply: Reply<Vec<MemoryItemSummary>>,
    gate: Option<oneshot::Receiver<()>>,
}

fn refused() -> Error {
    Error::Io(std::io::Error::new(
        std::io::ErrorKind::ConnectionRefused,
        "connection refused",
    ))
}

pub(crate) struct FakeBackend {
    healthy: AtomicBool,
    health_calls: AtomicUsize,
    latest: Mutex<HashMap<Category, Reply<String>>>,
    latest_calls: Mutex<HashMap<Category, usize>>,
    run: Mutex<Option<RunScript>>,
    run_topics: Mutex<Vec<String>>,
    memory_replies: Mutex<VecDeque<Scripted>>,
    memory_calls: Mutex<Vec<MemoryRequest>>,
    posts: Mutex<HashMap<i64, Reply<MemoryItemDetail>>>,
    post_gates: Mutex<HashMap<i64, oneshot::Receiver<()>>>,
}

impl FakeBackend {
    /// Healthy backend with content for both categories
    pub(crate) fn new() -> Self {
        let mut latest = HashMap::new();
        latest.insert(Category::Primary, Reply::Ok("# Latest blog".to_string()));
        latest.insert(
            Category::Secondary,
            Reply::Ok("Latest LinkedIn post".to_string()),
        );
        Self {
            healthy: AtomicBool::new(true),
            health_calls: AtomicUsize::new(0),
            latest: Mutex::new(latest),
            latest_calls: Mutex::new(HashMap::new()),
            run: Mutex::new(None),
            run_topics: Mutex::new(Vec::new()),
            memory_replies: Mutex::new(VecDeque::new()),
            memory_calls: Mutex::new(Vec::new()),
            posts: Mutex::new(HashMap::new()),
            post_gates: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    pub(crate) fn set_latest(&self, category: Category, reply: Reply<String>) {
        self.latest.lock().unwrap().insert(category, reply);
    }

    pub(crate) fn script_run(&self, script: RunScript) {
        *self.run.lock().unwrap() = Some(script);
    }

    pub(crate) fn push_memory_reply(&self, reply: Reply<Vec<MemoryItemSummary>>) {
        self.memory_replies
            .lock()
            .unwrap()
            .push_back(Scripted { reply, gate: None });
    }

    /// Queue a reply that is held until the returned sender fires
    pub(crate) fn push_gated_memory_reply(
        &self,
        reply: Reply<Vec<MemoryItemSummary>>,
    ) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.memory_replies.lock().unwrap().push_back(Scripted {
            reply,
            gate: Some(rx),
        });
        tx
    }

    pub(crate) fn insert_post(&self, id: i64, reply: Reply<MemoryItemDetail>) {
        self.posts.lock().unwrap().insert(id, reply);
    }

    /// Hold the next fetch of `id` until the returned sender fires
    pub(crate) fn gate_post(&self, id: i64) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.post_gates.lock().unwrap().insert(id, rx);
        tx
    }

    pub(crate) fn health_calls(&self) -> usize {
        self.health_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn latest_calls(&self, category: Category) -> usize {
        self.latest_calls
            .lock()
            .unwrap()
            .get(&category)
            .copied()
            .unwrap_or(0)
    }

    pub(crate) fn run_topics(&self) -> Vec<String> {
        self.run_topics.lock().unwrap().clone()
    }

    pub(crate) fn memory_calls(&self) -> Vec<MemoryRequest> {
        self.memory_calls.lock().unwrap().clone()
    }

    async fn next_memory_reply(&self, request: MemoryRequest) -> Result<Vec<MemoryItemSummary>> {
        self.memory_calls.lock().unwrap().push(request);
        let scripted = self.memory_replies.lock().unwrap().pop_front();
        let Some(scripted) = scripted else {
            return Ok(Vec::new());
        };
        if let Some(gate) = scripted.gate {
            let _ = gate.await;
        }
        scripted.reply.into_result()
    }
}

#[async_trait]
impl Backend for FakeBackend {
    fn base_url(&self) -> &str {
        "http://fake.local:8000"
    }

    async fn health(&self) -> Result<()> {
        self.health_calls.fetch_add(1, Ordering::SeqCst);
        if self.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(refused())
        }
    }

    async fn latest(&self, category: Category) -> Result<String> {
        *self
            .latest_calls
            .lock()
            .unwrap()
            .entry(category)
            .or_insert(0) += 1;
        let reply = self
            .latest
            .lock()
            .unwrap()
            .get(&category)
            .cloned()
            .unwrap_or(Reply::Ok(String::new()));
        reply.into_result()
    }

    async fn start_run(&self, topic: &str) -> Result<ByteStream> {
        self.run_topics.lock().unwrap().push(topic.to_string());
        if !self.healthy.load(Ordering::SeqCst) {
            return Err(refused());
        }
        let script = self
            .run
            .lock()
            .unwrap()
            .take()
            .unwrap_or(RunScript::Chunks(Vec::new()));
        match script {
            RunScript::Status(code) => Err(Error::Status(code)),
            RunScript::Chunks(chunks) => {
                let items: Vec<Result<Bytes>> = chunks
                    .into_iter()
                    .map(|chunk| chunk.map(Bytes::from).map_err(Error::Stream))
                    .collect();
                Ok(Box::pin(futures::stream::iter(items)))
            }
        }
    }

    async fn list_posts(
        &self,
        filter: CategoryFilter,
        _limit: usize,
    ) -> Result<Vec<MemoryItemSummary>> {
        self.next_memory_reply(MemoryRequest::List { filter }).await
    }

    async fn search_posts(&self, text: &str, _limit: usize) -> Result<Vec<MemoryItemSummary>> {
        self.next_memory_reply(MemoryRequest::Search {
            text: text.to_string(),
        })
        .await
    }

    async fn get_post(&self, id: i64) -> Result<MemoryItemDetail> {
        let gate = self.post_gates.lock().unwrap().remove(&id);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        let reply = self
            .posts
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .unwrap_or_else(|| Reply::Soft("Post not found".to_string()));
        reply.into_result()
    }
}

pub(crate) fn summary(id: i64, category: Category, title: &str) -> MemoryItemSummary {
    MemoryItemSummary {
        id,
        created_at: "2024-05-01 09:30:00".to_string(),
        category,
        topic: "digital detox".to_string(),
        title: title.to_string(),
    }
}

pub(crate) fn detail(id: i64, category: Category, content: &str) -> MemoryItemDetail {
    MemoryItemDetail {
        summary: summary(id, category, "Archived"),
        content: content.to_string(),
    }
}
