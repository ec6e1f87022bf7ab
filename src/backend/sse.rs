use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::api::{PushChannel, PushEvent};

/// Incremental server-sent-events decoder.
///
/// Feeds on raw transport chunks and yields the `data:` payload of each
/// completed event. Bytes stay buffered until the blank-line terminator
/// arrives, so multi-byte text split across chunks is never corrupted.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: Vec<u8>,
}

impl SseDecoder {
    /// Feed one transport chunk; returns the payloads of any events it completes
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);
        let mut payloads = Vec::new();
        while let Some((end, terminator)) = event_boundary(&self.buf) {
            let block: Vec<u8> = self.buf.drain(..end + terminator).collect();
            let text = String::from_utf8_lossy(&block[..end]);
            if let Some(data) = event_data(&text) {
                payloads.push(data);
            }
        }
        payloads
    }
}

/// First blank-line terminator in `buf` as (event length, terminator length)
fn event_boundary(buf: &[u8]) -> Option<(usize, usize)> {
    for i in 0..buf.len() {
        if buf[i..].starts_with(b"\r\n\r\n") {
            return Some((i, 4));
        }
        if buf[i..].starts_with(b"\n\n") {
            return Some((i, 2));
        }
    }
    None
}

/// Joined data payload of one event block, None when the block carries no
/// data field (comments, retry hints)
fn event_data(block: &str) -> Option<String> {
    let mut data: Option<String> = None;
    for line in block.lines() {
        if let Some(rest) = line.strip_prefix("data:") {
            let rest = rest.strip_prefix(' ').unwrap_or(rest);
            match data.as_mut() {
                Some(joined) => {
                    joined.push('\n');
                    joined.push_str(rest);
                }
                None => data = Some(rest.to_string()),
            }
        }
    }
    data
}

/// Drive one push subscription: connect, decode, forward payloads.
///
/// Runs until the transport ends or the receiving side goes away. A transport
/// failure becomes a final Error event; an orderly shutdown from our side just
/// drops the receiver and the forward stops.
pub(crate) async fn run_subscription(
    client: reqwest::Client,
    url: reqwest::Url,
    channel: PushChannel,
    tx: mpsc::Sender<PushEvent>,
) {
    let response = match client.get(url.clone()).send().await {
        Ok(response) => response,
        Err(err) => {
            warn!("{} channel failed to connect: {}", channel.name(), err);
            let _ = tx.send(PushEvent::Error(err.to_string())).await;
            return;
        }
    };

    let response = match response.error_for_status() {
        Ok(response) => response,
        Err(err) => {
            warn!("{} channel rejected: {}", channel.name(), err);
            let _ = tx.send(PushEvent::Error(err.to_string())).await;
            return;
        }
    };

    debug!("{} channel connected at {}", channel.name(), url);

    let mut stream = response.bytes_stream();
    let mut decoder = SseDecoder::default();

    while let Some(chunk) = stream.next().await {
        match chunk {
            Ok(bytes) => {
                for payload in decoder.feed(&bytes) {
                    if tx.send(PushEvent::Message(payload)).await.is_err() {
                        return;
                    }
                }
            }
            Err(err) => {
                warn!("{} channel broke: {}", channel.name(), err);
                let _ = tx.send(PushEvent::Error(err.to_string())).await;
                return;
            }
        }
    }

    // Server closed the stream without us asking. The consumer decides
    // whether that is worth announcing.
    let _ = tx
        .send(PushEvent::Error(format!("{} stream ended", channel.name())))
        .await;
}
