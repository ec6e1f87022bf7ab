use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::stats::ClientStats;
use crate::backend::{wire, PushChannel, PushEvent, PushSubscription, TranslatorBackend};
use crate::ui::{StatusAnnouncer, TranscriptPanels};

/// Owns a continuous transcription session: the three push channels, their
/// consumer tasks and the live display panes.
///
/// The three subscriptions open and close as a unit. Stopping is idempotent,
/// and a channel error that arrives after an intentional stop never reaches
/// the status line.
#[derive(Clone)]
pub struct StreamingController {
    backend: Arc<dyn TranslatorBackend>,
    panels: TranscriptPanels,
    status: StatusAnnouncer,
    stats: Arc<ClientStats>,

    /// Authoritative state; consumers check it before surfacing errors
    active: Arc<AtomicBool>,

    /// Consumer tasks, one per channel; each owns its subscription
    tasks: Arc<Mutex<Vec<JoinHandle<()>>>>,

    /// Correlation id of the live session
    session: Arc<Mutex<Option<Uuid>>>,
}

impl StreamingController {
    pub fn new(
        backend: Arc<dyn TranslatorBackend>,
        panels: TranscriptPanels,
        status: StatusAnnouncer,
        stats: Arc<ClientStats>,
    ) -> Self {
        Self {
            backend,
            panels,
            status,
            stats,
            active: Arc::new(AtomicBool::new(false)),
            tasks: Arc::new(Mutex::new(Vec::new())),
            session: Arc::new(Mutex::new(None)),
        }
    }

    /// Whether a streaming session is live
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Start continuous transcription; no-op when already streaming.
    ///
    /// The backend must confirm before anything changes client-side: on a
    /// non-confirming answer or transport failure the controller stays Idle
    /// and the live panes keep their previous content.
    pub async fn start(&self) {
        let mut tasks = self.tasks.lock().await;

        if self.active.load(Ordering::SeqCst) {
            warn!("Streaming already active");
            return;
        }

        if let Err(err) = self.backend.start_streaming().await {
            error!("Could not start streaming: {}", err);
            self.status
                .force(&format!("Streaming failed to start: {err}"), false);
            return;
        }

        // Stale text from an earlier session must not linger under the
        // fresh stream.
        self.panels.clear_live().await;

        let session = Uuid::new_v4();

        for channel in PushChannel::ALL {
            match self.backend.subscribe(channel).await {
                Ok(subscription) => {
                    let consumer = self.clone();
                    tasks.push(tokio::spawn(async move {
                        consumer.consume(channel, subscription).await;
                    }));
                }
                Err(err) => {
                    error!("Could not open {} channel: {}", channel.name(), err);

                    // Tear down whatever opened before the failure.
                    for task in tasks.drain(..) {
                        task.abort();
                    }
                    if let Err(stop_err) = self.backend.stop_streaming().await {
                        warn!("Backend stop after failed start also failed: {}", stop_err);
                    }

                    self.status
                        .force(&format!("Streaming failed to start: {err}"), false);
                    return;
                }
            }
        }

        *self.session.lock().await = Some(session);
        self.active.store(true, Ordering::SeqCst);
        self.status.announce("Streaming live... press x to stop", true);
        info!("Streaming session {} started", session);
    }

    /// Stop continuous transcription; idempotent, safe when already stopped.
    pub async fn stop(&self) {
        let mut tasks = self.tasks.lock().await;

        // Consumers check this before announcing, so clearing it first
        // silences errors raised by the teardown itself.
        let was_active = self.active.swap(false, Ordering::SeqCst);

        if let Err(err) = self.backend.stop_streaming().await {
            warn!("Backend stop_streaming failed: {}", err);
        }

        for task in tasks.drain(..) {
            // Aborting a consumer drops its subscription, which aborts the
            // transport task: close-if-open on every path.
            task.abort();
        }

        if let Some(session) = self.session.lock().await.take() {
            info!("Streaming session {} stopped", session);
        }

        if was_active {
            self.status.announce("Streaming stopped", false);
        } else {
            debug!("Streaming stop on an idle controller");
        }
    }

    async fn consume(&self, channel: PushChannel, mut subscription: PushSubscription) {
        debug!("{} consumer running", channel.name());
        while let Some(event) = subscription.next().await {
            self.apply_event(channel, event).await;
        }
        debug!("{} consumer done", channel.name());
    }

    /// Apply one push event to the display.
    ///
    /// The single entry point for channel traffic: blank keepalives vanish,
    /// transcript and analysis append, the summary replaces, and a channel
    /// error reaches the status line only while the session is still meant
    /// to be running.
    pub async fn apply_event(&self, channel: PushChannel, event: PushEvent) {
        match event {
            PushEvent::Message(raw) => {
                if raw.trim().is_empty() {
                    return;
                }
                let text = match channel.payload_field() {
                    Some(field) => wire::tagged_payload(&raw, field),
                    None => raw,
                };

                self.stats.push_event(channel);

                match channel {
                    PushChannel::Transcript => self.panels.append_live_transcript(&text).await,
                    PushChannel::Analysis => self.panels.append_live_analysis(&text).await,
                    PushChannel::Summary => self.panels.replace_live_summary(&text).await,
                }
            }
            PushEvent::Error(reason) => {
                if self.active.load(Ordering::SeqCst) {
                    warn!("{} channel error: {}", channel.name(), reason);
                    self.status
                        .announce(&format!("Live {} channel error", channel.name()), false);
                } else {
                    // Teardown noise from our own stop.
                    debug!("{} channel error after stop: {}", channel.name(), reason);
                }
            }
        }
    }
}
