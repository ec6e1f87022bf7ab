use tokio::sync::mpsc;
use tracing::{debug, info};

use super::api::{PushChannel, PushSubscription, TranslatorBackend};
use super::sse;
use super::wire::{AckEnvelope, FinishEnvelope, FinishOutcome, PollOutcome, ResultEnvelope};
use crate::error::{ClientError, Result};

/// HTTP + SSE implementation of the backend boundary
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: reqwest::Url,
}

impl HttpBackend {
    /// Build a client against `base_url`, e.g. `http://127.0.0.1:8080`
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = reqwest::Url::parse(base_url)
            .map_err(|err| ClientError::Protocol(format!("Invalid backend URL {base_url}: {err}")))?;

        info!("Backend at {}", base_url);

        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
        })
    }

    fn endpoint(&self, path: &str) -> Result<reqwest::Url> {
        self.base_url
            .join(path)
            .map_err(|err| ClientError::Protocol(format!("Bad endpoint {path}: {err}")))
    }

    /// POST a control endpoint and decode its acknowledgement.
    ///
    /// The backend reports its own failures in the body, with or without a
    /// 2xx status code; that message wins over the bare HTTP status.
    async fn post_ack(&self, path: &str, op: &'static str) -> Result<AckEnvelope> {
        let url = self.endpoint(path)?;
        debug!("POST {}", url);

        let response = self.client.post(url).send().await?;
        let http_status = response.status();

        let envelope: AckEnvelope = match response.json().await {
            Ok(envelope) => envelope,
            Err(err) if http_status.is_success() => return Err(ClientError::Network(err)),
            Err(_) => {
                return Err(ClientError::Protocol(format!(
                    "{op} failed with HTTP {http_status}"
                )))
            }
        };

        if let Some(error) = envelope.error {
            return Err(ClientError::Backend(error));
        }
        if !http_status.is_success() {
            return Err(ClientError::Protocol(format!(
                "{op} failed with HTTP {http_status}"
            )));
        }

        Ok(envelope)
    }
}

fn channel_path(channel: PushChannel) -> &'static str {
    match channel {
        PushChannel::Transcript => "/stream_transcription",
        PushChannel::Analysis => "/stream_analysis",
        PushChannel::Summary => "/stream_summary",
    }
}

#[async_trait::async_trait]
impl TranslatorBackend for HttpBackend {
    async fn begin_recording(&self) -> Result<()> {
        let ack = self
            .post_ack("/begin_manual_recording", "begin_manual_recording")
            .await?;
        match ack.status.as_deref() {
            Some("recording_started") => Ok(()),
            other => Err(ClientError::Protocol(format!(
                "begin_manual_recording answered status {:?}",
                other
            ))),
        }
    }

    async fn end_recording(&self) -> Result<FinishOutcome> {
        let url = self.endpoint("/end_manual_recording")?;
        debug!("POST {}", url);

        let response = self.client.post(url).send().await?;
        let http_status = response.status();

        let envelope: FinishEnvelope = match response.json().await {
            Ok(envelope) => envelope,
            Err(err) if http_status.is_success() => return Err(ClientError::Network(err)),
            Err(_) => {
                return Err(ClientError::Protocol(format!(
                    "end_manual_recording failed with HTTP {http_status}"
                )))
            }
        };

        envelope.into_outcome()
    }

    async fn fetch_result(&self) -> Result<PollOutcome> {
        let url = self.endpoint("/get_result")?;
        let response = self.client.get(url).send().await?.error_for_status()?;
        let envelope: ResultEnvelope = response.json().await?;
        Ok(envelope.into_outcome())
    }

    async fn clear_result(&self) -> Result<()> {
        self.post_ack("/clear_result", "clear_result").await.map(|_| ())
    }

    async fn start_streaming(&self) -> Result<()> {
        let ack = self.post_ack("/start_streaming", "start_streaming").await?;
        match ack.status.as_deref() {
            Some("streaming_started") => Ok(()),
            other => Err(ClientError::Protocol(format!(
                "start_streaming answered status {:?}",
                other
            ))),
        }
    }

    async fn stop_streaming(&self) -> Result<()> {
        self.post_ack("/stop_streaming", "stop_streaming").await.map(|_| ())
    }

    async fn subscribe(&self, channel: PushChannel) -> Result<PushSubscription> {
        let url = self.endpoint(channel_path(channel))?;

        // The connection is established inside the task; connect failures
        // surface as an Error event, mirroring how the poll loop learns about
        // transport trouble.
        let (tx, rx) = mpsc::channel(64);
        let task = tokio::spawn(sse::run_subscription(self.client.clone(), url, channel, tx));

        info!("Opened {} push channel", channel.name());

        Ok(PushSubscription::new(rx, Some(task)))
    }

    async fn reset_session(&self) -> Result<()> {
        self.post_ack("/reset_session", "reset_session").await.map(|_| ())
    }
}
