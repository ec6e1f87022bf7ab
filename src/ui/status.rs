use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tracing::debug;

/// Default minimum age of the displayed text before a different one may replace it
pub const DEFAULT_STATUS_COOLDOWN: Duration = Duration::from_millis(2000);

/// The rendered status value
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusLine {
    pub text: String,
    /// Renderer shows work-in-progress styling while this is set
    pub processing: bool,
}

struct AnnouncerState {
    last_text: String,
    last_rendered_at: Option<Instant>,
}

/// Debounced owner of the single status line.
///
/// Rapid sequences of different texts would flicker, so a different text
/// arriving inside the cooldown window is dropped. Re-announcing the current
/// text always goes through, refreshes the processing flag and slides the
/// window forward.
#[derive(Clone)]
pub struct StatusAnnouncer {
    state: Arc<Mutex<AnnouncerState>>,
    tx: Arc<watch::Sender<StatusLine>>,
    cooldown: Duration,
}

impl StatusAnnouncer {
    pub fn new(cooldown: Duration) -> Self {
        let (tx, _) = watch::channel(StatusLine::default());
        Self {
            state: Arc::new(Mutex::new(AnnouncerState {
                last_text: String::new(),
                last_rendered_at: None,
            })),
            tx: Arc::new(tx),
            cooldown,
        }
    }

    /// Watch the rendered line
    pub fn subscribe(&self) -> watch::Receiver<StatusLine> {
        self.tx.subscribe()
    }

    /// Currently rendered line
    pub fn current(&self) -> StatusLine {
        self.tx.borrow().clone()
    }

    /// Debounced announcement
    pub fn announce(&self, text: &str, processing: bool) {
        self.announce_at(Instant::now(), text, processing);
    }

    /// Debounced announcement against an explicit clock
    pub fn announce_at(&self, now: Instant, text: &str, processing: bool) {
        let mut state = self.lock_state();

        if state.last_text == text {
            state.last_rendered_at = Some(now);
            drop(state);
            self.render(text, processing);
            return;
        }

        if let Some(last) = state.last_rendered_at {
            if now.duration_since(last) < self.cooldown {
                debug!("Status dropped inside cooldown: {}", text);
                return;
            }
        }

        state.last_text = text.to_string();
        state.last_rendered_at = Some(now);
        drop(state);
        self.render(text, processing);
    }

    /// Unconditional render that leaves the debounce bookkeeping alone.
    ///
    /// For boot, permission and reset messages that must always land.
    pub fn force(&self, text: &str, processing: bool) {
        self.render(text, processing);
    }

    fn render(&self, text: &str, processing: bool) {
        self.tx.send_replace(StatusLine {
            text: text.to_string(),
            processing,
        });
    }

    fn lock_state(&self) -> MutexGuard<'_, AnnouncerState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
