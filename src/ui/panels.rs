use std::sync::Arc;

use tokio::sync::{watch, Mutex};

use crate::backend::RecognitionResult;

/// Boot placeholders, restored by clear and session reset
pub const ORIGINAL_PLACEHOLDER: &str = "Waiting to record...";
pub const TRANSLATION_PLACEHOLDER: &str = "The plain-intent translation appears here";
pub const LIVE_TRANSCRIPT_PLACEHOLDER: &str = "Live transcript appears once streaming starts...";
pub const LIVE_ANALYSIS_PLACEHOLDER: &str = "Per-sentence analysis appears once streaming starts...";
pub const LIVE_SUMMARY_PLACEHOLDER: &str = "Rolling summary appears once streaming starts...";

/// Copy of the five text panes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelsSnapshot {
    pub original: String,
    pub translation: String,
    pub live_transcript: String,
    pub live_analysis: String,
    pub live_summary: String,
}

impl Default for PanelsSnapshot {
    fn default() -> Self {
        Self {
            original: ORIGINAL_PLACEHOLDER.to_string(),
            translation: TRANSLATION_PLACEHOLDER.to_string(),
            live_transcript: LIVE_TRANSCRIPT_PLACEHOLDER.to_string(),
            live_analysis: LIVE_ANALYSIS_PLACEHOLDER.to_string(),
            live_summary: LIVE_SUMMARY_PLACEHOLDER.to_string(),
        }
    }
}

/// The client's display buffers.
///
/// Each pane has exactly one writing controller (the recording and streaming
/// machines never share one), so the lock only serializes writers with the
/// renderer and is never held across a suspension point.
#[derive(Clone)]
pub struct TranscriptPanels {
    state: Arc<Mutex<PanelsSnapshot>>,
    changed: Arc<watch::Sender<u64>>,
}

impl TranscriptPanels {
    pub fn new() -> Self {
        let (changed, _) = watch::channel(0);
        Self {
            state: Arc::new(Mutex::new(PanelsSnapshot::default())),
            changed: Arc::new(changed),
        }
    }

    /// Watch for changes; the value is a bump counter
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changed.subscribe()
    }

    pub async fn snapshot(&self) -> PanelsSnapshot {
        self.state.lock().await.clone()
    }

    /// Listening view shown while a manual recording runs
    pub async fn begin_recording_view(&self) {
        {
            let mut state = self.state.lock().await;
            state.original = "Listening...".to_string();
            state.translation = "Awaiting analysis...".to_string();
        }
        self.bump();
    }

    /// Replace the result panes with a recognition outcome
    pub async fn show_result(&self, result: &RecognitionResult) {
        {
            let mut state = self.state.lock().await;
            state.original = result.original_text.clone();
            state.translation = result.translation.clone();
        }
        self.bump();
    }

    /// Refresh just the original pane (interim text while analysis runs)
    pub async fn set_original(&self, text: &str) {
        {
            let mut state = self.state.lock().await;
            state.original = text.to_string();
        }
        self.bump();
    }

    /// Append one transcript segment and mirror it into the original pane
    pub async fn append_live_transcript(&self, segment: &str) {
        {
            let mut state = self.state.lock().await;
            state.live_transcript.push_str(segment);
            state.live_transcript.push('\n');
            state.original = segment.to_string();
        }
        self.bump();
    }

    /// Append one analysis line
    pub async fn append_live_analysis(&self, text: &str) {
        {
            let mut state = self.state.lock().await;
            state.live_analysis.push_str(text);
            state.live_analysis.push('\n');
        }
        self.bump();
    }

    /// Replace the rolling summary
    pub async fn replace_live_summary(&self, text: &str) {
        {
            let mut state = self.state.lock().await;
            state.live_summary = text.to_string();
        }
        self.bump();
    }

    /// Blank the three live panes before a streaming session
    pub async fn clear_live(&self) {
        {
            let mut state = self.state.lock().await;
            state.live_transcript.clear();
            state.live_analysis.clear();
            state.live_summary.clear();
        }
        self.bump();
    }

    /// Restore every pane to its boot placeholder
    pub async fn reset(&self) {
        {
            let mut state = self.state.lock().await;
            *state = PanelsSnapshot::default();
        }
        self.bump();
    }

    fn bump(&self) {
        self.changed.send_modify(|version| *version += 1);
    }
}

impl Default for TranscriptPanels {
    fn default() -> Self {
        Self::new()
    }
}
