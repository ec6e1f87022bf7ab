// Tests for the wire envelopes and payload decoding rules.
//
// The JSON shapes here mirror what the backend actually answers on each
// endpoint, including the awkward cases: error fields beside status fields,
// completed answers with no payload, and push payloads that are not JSON.

use subtext_console::backend::wire::{
    tagged_payload, AckEnvelope, FinishEnvelope, ResultEnvelope,
};
use subtext_console::backend::{FinishOutcome, PollOutcome};
use subtext_console::error::ClientError;

#[test]
fn test_finish_recognized_with_result() {
    let json = r#"{
        "status": "recognized",
        "result": {
            "original_text": "hola mundo",
            "translation": "",
            "status_hint": "Recognized; analysis running"
        }
    }"#;
    let envelope: FinishEnvelope = serde_json::from_str(json).unwrap();

    match envelope.into_outcome().unwrap() {
        FinishOutcome::Recognized(result) => {
            assert_eq!(result.original_text, "hola mundo");
            assert_eq!(result.translation, "");
            assert_eq!(
                result.status_hint.as_deref(),
                Some("Recognized; analysis running")
            );
        }
        other => panic!("expected Recognized, got {:?}", other),
    }
}

#[test]
fn test_finish_completed_with_result() {
    let json = r#"{
        "status": "completed",
        "result": {"original_text": "hola", "translation": "A greeting."}
    }"#;
    let envelope: FinishEnvelope = serde_json::from_str(json).unwrap();

    match envelope.into_outcome().unwrap() {
        FinishOutcome::Completed(result) => {
            assert_eq!(result.translation, "A greeting.");
            assert_eq!(result.status_hint, None);
        }
        other => panic!("expected Completed, got {:?}", other),
    }
}

#[test]
fn test_finish_error_field_wins_over_status() {
    let json = r#"{"status": "recognized", "error": "no audio captured"}"#;
    let envelope: FinishEnvelope = serde_json::from_str(json).unwrap();

    match envelope.into_outcome() {
        Err(ClientError::Backend(message)) => assert_eq!(message, "no audio captured"),
        other => panic!("expected a backend error, got {:?}", other),
    }
}

#[test]
fn test_finish_unknown_status_is_a_protocol_error() {
    let json = r#"{"status": "maybe_later"}"#;
    let envelope: FinishEnvelope = serde_json::from_str(json).unwrap();

    assert!(matches!(
        envelope.into_outcome(),
        Err(ClientError::Protocol(_))
    ));
}

#[test]
fn test_finish_recognized_without_result_is_a_protocol_error() {
    let json = r#"{"status": "recognized"}"#;
    let envelope: FinishEnvelope = serde_json::from_str(json).unwrap();

    assert!(matches!(
        envelope.into_outcome(),
        Err(ClientError::Protocol(_))
    ));
}

#[test]
fn test_poll_completed_with_result() {
    let json = r#"{
        "status": "completed",
        "result": {"original_text": "hola", "translation": "A greeting."}
    }"#;
    let envelope: ResultEnvelope = serde_json::from_str(json).unwrap();

    assert!(matches!(
        envelope.into_outcome(),
        PollOutcome::Completed(result) if result.original_text == "hola"
    ));
}

#[test]
fn test_poll_completed_without_result_keeps_waiting() {
    // The backend can say "completed" before the payload is filled in;
    // treating that as done would blank the panes.
    let json = r#"{"status": "completed"}"#;
    let envelope: ResultEnvelope = serde_json::from_str(json).unwrap();

    assert!(matches!(envelope.into_outcome(), PollOutcome::Waiting));
}

#[test]
fn test_poll_processing_carries_optional_interim_text() {
    let json = r#"{
        "status": "processing",
        "result": {"original_text": "hola", "status_hint": "Recognizing speech..."}
    }"#;
    let envelope: ResultEnvelope = serde_json::from_str(json).unwrap();

    match envelope.into_outcome() {
        PollOutcome::Processing(Some(result)) => {
            assert_eq!(result.original_text, "hola");
            assert_eq!(result.translation, "");
        }
        other => panic!("expected Processing with interim, got {:?}", other),
    }

    let bare: ResultEnvelope = serde_json::from_str(r#"{"status": "processing"}"#).unwrap();
    assert!(matches!(bare.into_outcome(), PollOutcome::Processing(None)));
}

#[test]
fn test_poll_unknown_status_keeps_waiting() {
    let envelope: ResultEnvelope = serde_json::from_str(r#"{"status": "queued"}"#).unwrap();
    assert!(matches!(envelope.into_outcome(), PollOutcome::Waiting));

    let empty: ResultEnvelope = serde_json::from_str("{}").unwrap();
    assert!(matches!(empty.into_outcome(), PollOutcome::Waiting));
}

#[test]
fn test_ack_envelope_tolerates_missing_fields() {
    let ok: AckEnvelope = serde_json::from_str(r#"{"status": "recording_started"}"#).unwrap();
    assert_eq!(ok.status.as_deref(), Some("recording_started"));
    assert_eq!(ok.error, None);

    let err: AckEnvelope = serde_json::from_str(r#"{"error": "already recording"}"#).unwrap();
    assert_eq!(err.status, None);
    assert_eq!(err.error.as_deref(), Some("already recording"));
}

#[test]
fn test_tagged_payload_extracts_the_field() {
    let raw = r#"{"analysis": "Speaker is asking for help"}"#;
    assert_eq!(tagged_payload(raw, "analysis"), "Speaker is asking for help");

    let raw = r#"{"summary": "Two people plan a trip."}"#;
    assert_eq!(tagged_payload(raw, "summary"), "Two people plan a trip.");
}

#[test]
fn test_tagged_payload_falls_back_to_the_raw_text() {
    // Plain text.
    assert_eq!(tagged_payload("not json at all", "analysis"), "not json at all");

    // Valid JSON, wrong shape.
    assert_eq!(tagged_payload(r#"["a", "b"]"#, "analysis"), r#"["a", "b"]"#);

    // Object without the field.
    let raw = r#"{"other": "text"}"#;
    assert_eq!(tagged_payload(raw, "analysis"), raw);

    // Field present but not a string: no coercion, show the raw payload.
    let raw = r#"{"analysis": 42}"#;
    assert_eq!(tagged_payload(raw, "analysis"), raw);

    // Field present but empty.
    let raw = r#"{"analysis": ""}"#;
    assert_eq!(tagged_payload(raw, "analysis"), raw);
}
