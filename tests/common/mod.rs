// Shared test double: an in-memory TranslatorBackend with scriptable
// outcomes and a call log, so controller transitions run without a live
// service or a microphone.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use subtext_console::backend::{
    FinishOutcome, PollOutcome, PushChannel, PushEvent, PushSubscription, RecognitionResult,
    TranslatorBackend,
};
use subtext_console::error::{ClientError, Result};
use subtext_console::session::{ClientStats, RecordingController, ResultPoller, StreamingController};
use subtext_console::ui::{StatusAnnouncer, TranscriptPanels};
use subtext_console::LevelMonitor;
use tokio::sync::mpsc;

/// One backend operation, in call order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    BeginRecording,
    EndRecording,
    FetchResult,
    ClearResult,
    StartStreaming,
    StopStreaming,
    Subscribe(PushChannel),
    ResetSession,
}

#[derive(Default)]
pub struct FakeBackend {
    calls: Mutex<Vec<Call>>,
    begin_errors: Mutex<VecDeque<String>>,
    end_outcomes: Mutex<VecDeque<Result<FinishOutcome>>>,
    end_delay: Mutex<Option<Duration>>,
    poll_outcomes: Mutex<VecDeque<Result<PollOutcome>>>,
    clear_errors: Mutex<VecDeque<String>>,
    start_streaming_errors: Mutex<VecDeque<String>>,
    subscribe_errors: Mutex<VecDeque<(PushChannel, String)>>,
    reset_errors: Mutex<VecDeque<String>>,
    senders: Mutex<HashMap<PushChannel, mpsc::Sender<PushEvent>>>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: Call) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == call).count()
    }

    fn log(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn script_begin_error(&self, message: &str) {
        self.begin_errors.lock().unwrap().push_back(message.to_string());
    }

    pub fn script_end(&self, outcome: Result<FinishOutcome>) {
        self.end_outcomes.lock().unwrap().push_back(outcome);
    }

    /// Make end_recording linger, so overlapping finishes can interleave
    pub fn delay_end(&self, delay: Duration) {
        *self.end_delay.lock().unwrap() = Some(delay);
    }

    pub fn script_poll(&self, outcome: Result<PollOutcome>) {
        self.poll_outcomes.lock().unwrap().push_back(outcome);
    }

    pub fn script_clear_error(&self, message: &str) {
        self.clear_errors.lock().unwrap().push_back(message.to_string());
    }

    pub fn script_start_streaming_error(&self, message: &str) {
        self.start_streaming_errors
            .lock()
            .unwrap()
            .push_back(message.to_string());
    }

    pub fn script_subscribe_error(&self, channel: PushChannel, message: &str) {
        self.subscribe_errors
            .lock()
            .unwrap()
            .push_back((channel, message.to_string()));
    }

    pub fn script_reset_error(&self, message: &str) {
        self.reset_errors.lock().unwrap().push_back(message.to_string());
    }

    /// Deliver an event on an open push channel
    pub async fn push(&self, channel: PushChannel, event: PushEvent) {
        let sender = self.senders.lock().unwrap().get(&channel).cloned();
        if let Some(sender) = sender {
            let _ = sender.send(event).await;
        }
    }

    pub fn channel_open(&self, channel: PushChannel) -> bool {
        match self.senders.lock().unwrap().get(&channel) {
            Some(sender) => !sender.is_closed(),
            None => false,
        }
    }
}

#[async_trait::async_trait]
impl TranslatorBackend for FakeBackend {
    async fn begin_recording(&self) -> Result<()> {
        self.log(Call::BeginRecording);
        match self.begin_errors.lock().unwrap().pop_front() {
            Some(message) => Err(ClientError::Backend(message)),
            None => Ok(()),
        }
    }

    async fn end_recording(&self) -> Result<FinishOutcome> {
        self.log(Call::EndRecording);
        let delay = *self.end_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match self.end_outcomes.lock().unwrap().pop_front() {
            Some(outcome) => outcome,
            None => Ok(FinishOutcome::Completed(sample_result())),
        }
    }

    async fn fetch_result(&self) -> Result<PollOutcome> {
        self.log(Call::FetchResult);
        match self.poll_outcomes.lock().unwrap().pop_front() {
            Some(outcome) => outcome,
            None => Ok(PollOutcome::Waiting),
        }
    }

    async fn clear_result(&self) -> Result<()> {
        self.log(Call::ClearResult);
        match self.clear_errors.lock().unwrap().pop_front() {
            Some(message) => Err(ClientError::Backend(message)),
            None => Ok(()),
        }
    }

    async fn start_streaming(&self) -> Result<()> {
        self.log(Call::StartStreaming);
        match self.start_streaming_errors.lock().unwrap().pop_front() {
            Some(message) => Err(ClientError::Backend(message)),
            None => Ok(()),
        }
    }

    async fn stop_streaming(&self) -> Result<()> {
        self.log(Call::StopStreaming);
        Ok(())
    }

    async fn subscribe(&self, channel: PushChannel) -> Result<PushSubscription> {
        self.log(Call::Subscribe(channel));
        {
            let mut errors = self.subscribe_errors.lock().unwrap();
            if let Some(pos) = errors.iter().position(|(c, _)| *c == channel) {
                if let Some((_, message)) = errors.remove(pos) {
                    return Err(ClientError::Backend(message));
                }
            }
        }
        let (tx, rx) = mpsc::channel(16);
        self.senders.lock().unwrap().insert(channel, tx);
        Ok(PushSubscription::new(rx, None))
    }

    async fn reset_session(&self) -> Result<()> {
        self.log(Call::ResetSession);
        match self.reset_errors.lock().unwrap().pop_front() {
            Some(message) => Err(ClientError::Backend(message)),
            None => Ok(()),
        }
    }
}

pub fn sample_result() -> RecognitionResult {
    RecognitionResult {
        original_text: "hola mundo".to_string(),
        translation: "A friendly hello to everyone here.".to_string(),
        status_hint: None,
    }
}

/// Everything a controller test needs, wired like the binary does it.
///
/// The announcer gets a zero cooldown so every transition is observable;
/// debounce behavior has its own tests.
pub struct Stack {
    pub panels: TranscriptPanels,
    pub status: StatusAnnouncer,
    pub stats: Arc<ClientStats>,
    pub poller: ResultPoller,
    pub recording: RecordingController,
    pub streaming: StreamingController,
}

pub fn stack(backend: &Arc<FakeBackend>, poll_interval: Duration) -> Stack {
    let backend: Arc<dyn TranslatorBackend> = backend.clone();
    let panels = TranscriptPanels::new();
    let status = StatusAnnouncer::new(Duration::ZERO);
    let stats = Arc::new(ClientStats::new());
    let level = LevelMonitor::spawn(16000);
    let poller = ResultPoller::new(
        Arc::clone(&backend),
        panels.clone(),
        status.clone(),
        Arc::clone(&stats),
        poll_interval,
    );
    let recording = RecordingController::new(
        Arc::clone(&backend),
        panels.clone(),
        status.clone(),
        level,
        poller.clone(),
        Arc::clone(&stats),
    );
    let streaming = StreamingController::new(
        Arc::clone(&backend),
        panels.clone(),
        status.clone(),
        Arc::clone(&stats),
    );
    Stack {
        panels,
        status,
        stats,
        poller,
        recording,
        streaming,
    }
}
