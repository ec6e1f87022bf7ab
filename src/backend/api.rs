use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::wire::{FinishOutcome, PollOutcome};
use crate::error::Result;

/// Push channel carried over one server-sent-event stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PushChannel {
    /// Raw transcript segments
    Transcript,
    /// Per-sentence analysis, JSON-wrapped under "analysis"
    Analysis,
    /// Rolling summary, JSON-wrapped under "summary"
    Summary,
}

impl PushChannel {
    pub const ALL: [PushChannel; 3] = [Self::Transcript, Self::Analysis, Self::Summary];

    /// JSON field the payload is wrapped in, if any
    pub fn payload_field(self) -> Option<&'static str> {
        match self {
            PushChannel::Transcript => None,
            PushChannel::Analysis => Some("analysis"),
            PushChannel::Summary => Some("summary"),
        }
    }

    /// Channel name for logging
    pub fn name(self) -> &'static str {
        match self {
            PushChannel::Transcript => "transcript",
            PushChannel::Analysis => "analysis",
            PushChannel::Summary => "summary",
        }
    }
}

/// One event delivered on a push channel
#[derive(Debug, Clone)]
pub enum PushEvent {
    /// A data payload (possibly blank: the backend sends empty keepalives)
    Message(String),
    /// The channel failed; nothing further will arrive on it
    Error(String),
}

/// Live handle to one push channel.
///
/// Dropping the handle aborts the transport task, so a subscription cannot
/// outlive its owner no matter which path tears it down.
pub struct PushSubscription {
    events: mpsc::Receiver<PushEvent>,
    task: Option<JoinHandle<()>>,
}

impl PushSubscription {
    pub fn new(events: mpsc::Receiver<PushEvent>, task: Option<JoinHandle<()>>) -> Self {
        Self { events, task }
    }

    /// Next event, or None once the channel is closed
    pub async fn next(&mut self) -> Option<PushEvent> {
        self.events.recv().await
    }

    /// Tear the channel down immediately
    pub fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.events.close();
    }
}

impl Drop for PushSubscription {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Client-side boundary of the Subtext backend.
///
/// The production implementation speaks HTTP + SSE; tests substitute an
/// in-memory fake so controller transitions run without a live service.
#[async_trait::async_trait]
pub trait TranslatorBackend: Send + Sync {
    /// Begin a manual recording on the server
    async fn begin_recording(&self) -> Result<()>;

    /// End the manual recording and run recognition
    async fn end_recording(&self) -> Result<FinishOutcome>;

    /// Poll for the analysis result of the last recording
    async fn fetch_result(&self) -> Result<PollOutcome>;

    /// Drop the last recognition result
    async fn clear_result(&self) -> Result<()>;

    /// Start continuous transcription; Ok(()) means the backend confirmed
    async fn start_streaming(&self) -> Result<()>;

    /// Stop continuous transcription
    async fn stop_streaming(&self) -> Result<()>;

    /// Open one push channel
    async fn subscribe(&self, channel: PushChannel) -> Result<PushSubscription>;

    /// Wipe all server-side session state
    async fn reset_session(&self) -> Result<()>;
}
