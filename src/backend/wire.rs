use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};

/// Acknowledgement body returned by the control endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct AckEnvelope {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// One recognition/translation outcome as the backend reports it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognitionResult {
    #[serde(default)]
    pub original_text: String,
    #[serde(default)]
    pub translation: String,
    /// Progress text the backend wants shown while analysis is still running
    #[serde(default)]
    pub status_hint: Option<String>,
}

/// Body of POST /end_manual_recording
#[derive(Debug, Serialize, Deserialize)]
pub struct FinishEnvelope {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub result: Option<RecognitionResult>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of GET /get_result
#[derive(Debug, Serialize, Deserialize)]
pub struct ResultEnvelope {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub result: Option<RecognitionResult>,
}

/// What finishing a manual recording produced
#[derive(Debug, Clone)]
pub enum FinishOutcome {
    /// Speech recognized; analysis still running server-side
    Recognized(RecognitionResult),
    /// Recognition and analysis both done (or recognition failed terminally)
    Completed(RecognitionResult),
}

/// One answer from the result poll endpoint
#[derive(Debug, Clone)]
pub enum PollOutcome {
    Completed(RecognitionResult),
    Processing(Option<RecognitionResult>),
    Waiting,
}

impl FinishEnvelope {
    pub fn into_outcome(self) -> Result<FinishOutcome> {
        if let Some(error) = self.error {
            return Err(ClientError::Backend(error));
        }
        match (self.status.as_deref(), self.result) {
            (Some("recognized"), Some(result)) => Ok(FinishOutcome::Recognized(result)),
            (Some("completed"), Some(result)) => Ok(FinishOutcome::Completed(result)),
            (status, _) => Err(ClientError::Protocol(format!(
                "end_manual_recording answered status {:?}",
                status
            ))),
        }
    }
}

impl ResultEnvelope {
    pub fn into_outcome(self) -> PollOutcome {
        match (self.status.as_deref(), self.result) {
            (Some("completed"), Some(result)) => PollOutcome::Completed(result),
            (Some("processing"), result) => PollOutcome::Processing(result),
            // "completed" without a payload and unknown statuses both keep the
            // poll alive rather than failing it.
            _ => PollOutcome::Waiting,
        }
    }
}

/// Extract `field` from a JSON object payload, falling back to the raw text.
///
/// Push payloads usually look like `{"analysis": "..."}` but the backend may
/// emit plain text on the same channel; anything that does not decode to an
/// object holding a non-empty string under `field` is shown verbatim.
pub fn tagged_payload(raw: &str, field: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Object(map)) => match map.get(field) {
            Some(serde_json::Value::String(text)) if !text.is_empty() => text.clone(),
            _ => raw.to_string(),
        },
        _ => raw.to_string(),
    }
}
