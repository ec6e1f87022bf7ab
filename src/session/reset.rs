use std::sync::Arc;

use tracing::{info, warn};

use super::poller::ResultPoller;
use super::recording::RecordingController;
use super::stats::ClientStats;
use super::streaming::StreamingController;
use crate::backend::TranslatorBackend;
use crate::ui::{StatusAnnouncer, TranscriptPanels};

/// Status line shown at boot and after a reset
pub const READY_STATUS: &str = "Ready. Press Space to record, s to stream, q to quit";

/// Total teardown back to the boot state.
///
/// The browser original reloads the whole page here; natively every
/// controller and pane returns to its initial value instead. The level meter
/// keeps running, matching a reload re-acquiring the microphone.
pub struct SessionResetCoordinator {
    backend: Arc<dyn TranslatorBackend>,
    streaming: StreamingController,
    recording: RecordingController,
    poller: ResultPoller,
    panels: TranscriptPanels,
    status: StatusAnnouncer,
    stats: Arc<ClientStats>,
}

impl SessionResetCoordinator {
    pub fn new(
        backend: Arc<dyn TranslatorBackend>,
        streaming: StreamingController,
        recording: RecordingController,
        poller: ResultPoller,
        panels: TranscriptPanels,
        status: StatusAnnouncer,
        stats: Arc<ClientStats>,
    ) -> Self {
        Self {
            backend,
            streaming,
            recording,
            poller,
            panels,
            status,
            stats,
        }
    }

    /// Stop everything, wipe server-side state best-effort, restore the
    /// display. Nothing survives: subscriptions, polls and phases all go.
    pub async fn reset(&self) {
        info!("Session reset requested");
        self.stats.session_reset();

        self.streaming.stop().await;
        self.poller.stop().await;
        self.recording.force_idle().await;

        if let Err(err) = self.backend.reset_session().await {
            warn!("Backend session reset failed: {}", err);
        }

        self.panels.reset().await;
        self.status.force(READY_STATUS, false);

        info!("Session reset done");
    }
}
