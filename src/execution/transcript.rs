//! Live transcript of one execution

/// First line of every run
pub const START_MARKER: &str = "🚀 Starting crew execution...\n";

/// Appended after the stream ends cleanly
pub const COMPLETION_MARKER: &str = "\n✨ Crew execution completed!\n";

/// Sole line when a run is attempted without a confirmed backend
pub const NOT_CONNECTED_LINE: &str =
    "❌ Backend not connected. Please ensure the backend server is running.\n";

/// Terminal line for a failed run
pub fn failure_line(detail: &str, base_url: &str) -> String {
    format!(
        "❌ Connection error: {}\nPlease ensure the backend is running at {}.\n",
        detail, base_url
    )
}

/// Append-only sequence of output fragments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    chunks: Vec<String>,
}

impl Transcript {
    /// Drop everything and start over with a single line
    pub fn reset(&mut self, first: impl Into<String>) {
        self.chunks.clear();
        self.chunks.push(first.into());
    }

    pub fn push(&mut self, chunk: impl Into<String>) {
        self.chunks.push(chunk.into());
    }

    pub fn clear(&mut self) {
        self.chunks.clear();
    }

    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Concatenated text in arrival order
    pub fn text(&self) -> String {
        self.chunks.concat()
    }
}
