use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::poller::ResultPoller;
use super::stats::ClientStats;
use crate::audio::LevelMonitor;
use crate::backend::{FinishOutcome, TranslatorBackend};
use crate::ui::{StatusAnnouncer, TranscriptPanels};

/// Where the manual recording machine stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingPhase {
    Idle,
    Preparing,
    Recording,
    Finishing,
}

/// Drives the manual record / finish / recognize workflow.
///
/// `start` and `finish` consume their own failures: every error lands on the
/// status line and the machine returns to Idle, so the keyboard loop never
/// interprets one. The recording machine never touches the streaming
/// machine's resources.
#[derive(Clone)]
pub struct RecordingController {
    backend: Arc<dyn TranslatorBackend>,
    panels: TranscriptPanels,
    status: StatusAnnouncer,
    level: LevelMonitor,
    poller: ResultPoller,
    stats: Arc<ClientStats>,

    phase: Arc<Mutex<RecordingPhase>>,

    /// Reentrancy guard for finish; a second in-flight call returns
    /// immediately instead of queueing a duplicate request.
    finishing: Arc<AtomicBool>,
}

/// Clears the finish guard on every exit path, early returns included.
struct FinishGuard(Arc<AtomicBool>);

impl Drop for FinishGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl RecordingController {
    pub fn new(
        backend: Arc<dyn TranslatorBackend>,
        panels: TranscriptPanels,
        status: StatusAnnouncer,
        level: LevelMonitor,
        poller: ResultPoller,
        stats: Arc<ClientStats>,
    ) -> Self {
        Self {
            backend,
            panels,
            status,
            level,
            poller,
            stats,
            phase: Arc::new(Mutex::new(RecordingPhase::Idle)),
            finishing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Current phase
    pub async fn phase(&self) -> RecordingPhase {
        *self.phase.lock().await
    }

    /// Drop back to Idle without network I/O (session reset path)
    pub(crate) async fn force_idle(&self) {
        *self.phase.lock().await = RecordingPhase::Idle;
    }

    /// Discard the displayed result: server first, then the local panes.
    ///
    /// Also parks the poller so a cleared result cannot reappear on the next
    /// tick. When the server cannot be reached the display stays as is.
    pub async fn clear(&self) {
        if let Err(err) = self.backend.clear_result().await {
            warn!("Clear result failed: {}", err);
            return;
        }
        self.poller.stop().await;
        self.panels.reset().await;
        self.status.announce(super::reset::READY_STATUS, false);
        info!("Result cleared");
    }

    /// Begin a manual recording; no-op unless Idle
    pub async fn start(&self) {
        {
            let mut phase = self.phase.lock().await;
            if *phase != RecordingPhase::Idle {
                warn!("Recording start ignored in phase {:?}", *phase);
                return;
            }
            *phase = RecordingPhase::Preparing;
        }

        let attempt = Uuid::new_v4();
        info!("Starting manual recording {}", attempt);

        self.status.announce("Preparing microphone...", true);
        self.panels.begin_recording_view().await;

        // The meter is cosmetic; a dead meter must never block recording.
        if let Err(err) = self.level.ensure().await {
            warn!("Level meter unavailable: {}", err);
        }

        match self.backend.begin_recording().await {
            Ok(()) => {
                *self.phase.lock().await = RecordingPhase::Recording;
                self.status.announce("Recording... press Esc to finish", true);
                info!("Manual recording {} running", attempt);
            }
            Err(err) => {
                error!("Manual recording {} failed to start: {}", attempt, err);
                *self.phase.lock().await = RecordingPhase::Idle;
                self.status
                    .force(&format!("Recording failed to start: {err}"), false);
            }
        }
    }

    /// End the recording and run recognition; no-op unless Recording.
    ///
    /// Guarded against reentry: repeated Esc presses while the backend is
    /// still recognizing send exactly one end request.
    pub async fn finish(&self) {
        if self.finishing.swap(true, Ordering::SeqCst) {
            warn!("Finish already in flight, ignoring");
            return;
        }
        let _guard = FinishGuard(Arc::clone(&self.finishing));

        {
            let mut phase = self.phase.lock().await;
            if *phase != RecordingPhase::Recording {
                warn!("Recording finish ignored in phase {:?}", *phase);
                return;
            }
            *phase = RecordingPhase::Finishing;
        }

        // The finishing appearance lands before any network round-trip.
        self.status.announce("Finishing recording...", true);
        info!("Finishing manual recording");

        match self.backend.end_recording().await {
            Ok(FinishOutcome::Recognized(result)) => {
                self.panels.show_result(&result).await;
                let hint = result
                    .status_hint
                    .unwrap_or_else(|| "Recognized, analyzing...".to_string());
                self.status.announce(&hint, true);
                self.stats.recording_completed();
                // Analysis continues server-side; the poller takes over and
                // replaces any poll still running from an earlier recording.
                self.poller.restart().await;
                info!("Recognition done, waiting for analysis");
            }
            Ok(FinishOutcome::Completed(result)) => {
                self.panels.show_result(&result).await;
                self.status.announce("Analysis complete", false);
                self.stats.recording_completed();
                info!("Recording completed without a poll");
            }
            Err(err) => {
                error!("Manual recording failed to finish: {}", err);
                self.status
                    .force(&format!("Recording failed: {err}"), false);
            }
        }

        *self.phase.lock().await = RecordingPhase::Idle;
    }
}
