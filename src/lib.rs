pub mod audio;
pub mod backend;
pub mod config;
pub mod error;
pub mod session;
pub mod ui;

pub use audio::{LevelMonitor, LevelSample, VOICE_THRESHOLD};
pub use backend::{
    FinishOutcome, HttpBackend, PollOutcome, PushChannel, PushEvent, PushSubscription,
    RecognitionResult, TranslatorBackend,
};
pub use config::Config;
pub use error::{ClientError, Result};
pub use session::{
    ClientStats, PollPhase, RecordingController, RecordingPhase, ResultPoller,
    SessionResetCoordinator, StatsReport, StreamingController, READY_STATUS,
};
pub use ui::{InputAction, PanelsSnapshot, StatusAnnouncer, StatusLine, TranscriptPanels};
