use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use super::stats::ClientStats;
use crate::backend::{PollOutcome, TranslatorBackend};
use crate::ui::{StatusAnnouncer, TranscriptPanels};

/// Default time between result polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Where the poll loop stands; Idle means no poll task is live
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollPhase {
    Idle,
    Waiting,
    Processing,
    Completed,
    Failed,
}

/// Polls the backend for the analysis result at a fixed interval.
///
/// At most one poll task is ever alive: restart aborts the previous one
/// before spawning. Completion and the first transport failure are both
/// terminal; after either, no further requests go out.
#[derive(Clone)]
pub struct ResultPoller {
    backend: Arc<dyn TranslatorBackend>,
    panels: TranscriptPanels,
    status: StatusAnnouncer,
    stats: Arc<ClientStats>,
    interval: Duration,
    task: Arc<Mutex<Option<JoinHandle<()>>>>,
    phase: Arc<watch::Sender<PollPhase>>,
}

impl ResultPoller {
    pub fn new(
        backend: Arc<dyn TranslatorBackend>,
        panels: TranscriptPanels,
        status: StatusAnnouncer,
        stats: Arc<ClientStats>,
        interval: Duration,
    ) -> Self {
        let (phase, _) = watch::channel(PollPhase::Idle);
        Self {
            backend,
            panels,
            status,
            stats,
            interval,
            task: Arc::new(Mutex::new(None)),
            phase: Arc::new(phase),
        }
    }

    /// Watch the poll phase
    pub fn phase(&self) -> watch::Receiver<PollPhase> {
        self.phase.subscribe()
    }

    /// Current poll phase
    pub fn current_phase(&self) -> PollPhase {
        *self.phase.borrow()
    }

    /// Begin polling, replacing any live poll task
    pub async fn restart(&self) {
        let mut task = self.task.lock().await;
        if let Some(previous) = task.take() {
            if !previous.is_finished() {
                warn!("Replacing a live result poll");
            }
            previous.abort();
        }

        self.phase.send_replace(PollPhase::Waiting);

        let poller = self.clone();
        *task = Some(tokio::spawn(async move { poller.run().await }));

        info!("Result poll started ({}ms interval)", self.interval.as_millis());
    }

    /// Stop polling without touching the display; safe when not running
    pub async fn stop(&self) {
        let mut task = self.task.lock().await;
        if let Some(previous) = task.take() {
            previous.abort();
            self.phase.send_replace(PollPhase::Idle);
            info!("Result poll stopped");
        }
    }

    /// Whether a poll task is live right now
    pub async fn is_running(&self) -> bool {
        let task = self.task.lock().await;
        task.as_ref().map(|t| !t.is_finished()).unwrap_or(false)
    }

    async fn run(&self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // interval fires immediately; the first query waits a full period.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            self.stats.poll_issued();

            match self.backend.fetch_result().await {
                Ok(PollOutcome::Completed(result)) => {
                    info!("Analysis complete");
                    self.panels.show_result(&result).await;
                    self.status.announce("Analysis complete", false);
                    self.phase.send_replace(PollPhase::Completed);
                    return;
                }
                Ok(PollOutcome::Processing(interim)) => {
                    let hint = interim.as_ref().and_then(|r| r.status_hint.clone());
                    if let Some(result) = interim {
                        if !result.original_text.is_empty() {
                            self.panels.set_original(&result.original_text).await;
                        }
                    }
                    let text = hint.unwrap_or_else(|| "Analyzing...".to_string());
                    self.status.announce(&text, true);
                    self.phase.send_replace(PollPhase::Processing);
                }
                Ok(PollOutcome::Waiting) => {
                    self.status.announce("Waiting for results...", true);
                    self.phase.send_replace(PollPhase::Waiting);
                }
                Err(err) => {
                    error!("Result poll failed: {}", err);
                    self.status.announce("Could not fetch the result", false);
                    self.phase.send_replace(PollPhase::Failed);
                    return;
                }
            }
        }
    }
}
