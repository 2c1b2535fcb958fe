//! Execution orchestrator
//!
//! Drives one generation run: starts the job, reads its output stream
//! chunk by chunk into the transcript, and signals completion so the
//! coordinator can refresh what the run produced.
//!
//! ```text
//! Idle ──run──> Running ──end-of-stream──> Completed
//!                  └──────error──────────> Failed
//! ```

mod decoder;
mod orchestrator;
mod transcript;

pub use decoder::{FragmentReader, Utf8StreamDecoder};
pub use orchestrator::{ExecutionListener, ExecutionOrchestrator, RunOutcome};
pub use transcript::{
    failure_line, Transcript, COMPLETION_MARKER, NOT_CONNECTED_LINE, START_MARKER,
};

/// Per-execution state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionPhase {
    #[default]
    Idle,
    Running,
    Completed,
    Failed,
}
