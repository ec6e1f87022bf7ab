use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::backend::PushChannel;

/// Live counters for one client run
#[derive(Debug)]
pub struct ClientStats {
    /// When the client came up
    started_at: DateTime<Utc>,

    /// Manual recordings that finished with a usable result
    recordings_completed: AtomicUsize,

    /// Result poll requests issued
    polls_issued: AtomicUsize,

    /// Push events applied, per channel
    transcript_events: AtomicUsize,
    analysis_events: AtomicUsize,
    summary_events: AtomicUsize,

    /// Full session resets requested
    session_resets: AtomicUsize,
}

impl ClientStats {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            recordings_completed: AtomicUsize::new(0),
            polls_issued: AtomicUsize::new(0),
            transcript_events: AtomicUsize::new(0),
            analysis_events: AtomicUsize::new(0),
            summary_events: AtomicUsize::new(0),
            session_resets: AtomicUsize::new(0),
        }
    }

    pub fn recording_completed(&self) {
        self.recordings_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn poll_issued(&self) {
        self.polls_issued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn push_event(&self, channel: PushChannel) {
        let counter = match channel {
            PushChannel::Transcript => &self.transcript_events,
            PushChannel::Analysis => &self.analysis_events,
            PushChannel::Summary => &self.summary_events,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn session_reset(&self) {
        self.session_resets.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot for the shutdown log line
    pub fn report(&self) -> StatsReport {
        let uptime = Utc::now().signed_duration_since(self.started_at);
        StatsReport {
            started_at: self.started_at,
            uptime_secs: uptime.num_milliseconds() as f64 / 1000.0,
            recordings_completed: self.recordings_completed.load(Ordering::Relaxed),
            polls_issued: self.polls_issued.load(Ordering::Relaxed),
            transcript_events: self.transcript_events.load(Ordering::Relaxed),
            analysis_events: self.analysis_events.load(Ordering::Relaxed),
            summary_events: self.summary_events.load(Ordering::Relaxed),
            session_resets: self.session_resets.load(Ordering::Relaxed),
        }
    }
}

impl Default for ClientStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Counter snapshot for one client run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsReport {
    pub started_at: DateTime<Utc>,
    pub uptime_secs: f64,
    pub recordings_completed: usize,
    pub polls_issued: usize,
    pub transcript_events: usize,
    pub analysis_events: usize,
    pub summary_events: usize,
    pub session_resets: usize,
}
