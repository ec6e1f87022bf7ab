// Streaming Client Example: Live push channels without the terminal UI
//
// This example drives the streaming half of the client library directly:
// 1. Confirm the backend is willing to stream (POST /start_streaming)
// 2. Subscribe to the transcript, analysis, and summary push channels
// 3. Print every event for 30 seconds
// 4. Stop streaming and let the subscriptions close
//
// Prerequisites:
// - The Subtext backend running (http://127.0.0.1:8080 by default)
//
// Usage: cargo run --example streaming_client [-- http://host:port]

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use subtext_console::backend::wire::tagged_payload;
use subtext_console::backend::{HttpBackend, PushChannel, PushEvent, TranslatorBackend};
use tokio::time::timeout;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let base_url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://127.0.0.1:8080".to_string());
    info!("🔌 Backend: {}", base_url);

    let backend: Arc<dyn TranslatorBackend> = Arc::new(HttpBackend::new(&base_url)?);

    // 1. Ask the backend to start streaming
    backend.start_streaming().await?;
    info!("✅ Streaming confirmed");

    // 2. One listener task per push channel
    let mut listeners = Vec::new();
    for channel in PushChannel::ALL {
        let mut subscription = backend.subscribe(channel).await?;
        info!("✅ Subscribed to {}", channel.name());
        listeners.push(tokio::spawn(async move {
            let mut events = 0usize;
            while let Some(event) = subscription.next().await {
                match event {
                    PushEvent::Message(raw) => {
                        if raw.trim().is_empty() {
                            continue; // Heartbeat
                        }
                        let text = match channel.payload_field() {
                            Some(field) => tagged_payload(&raw, field),
                            None => raw,
                        };
                        events += 1;
                        info!("📝 [{}] {}", channel.name(), text);
                    }
                    PushEvent::Error(err) => {
                        info!("❌ [{}] channel error: {}", channel.name(), err);
                        break;
                    }
                }
            }
            info!("⏹️  {} channel closed after {} events", channel.name(), events);
        }));
    }

    // 3. Let the channels run for a while
    info!("💬 Feed the backend some speech...");
    tokio::time::sleep(Duration::from_secs(30)).await;

    // 4. Stop streaming; the server ends the event streams
    backend.stop_streaming().await?;
    info!("🛑 Streaming stopped");

    for listener in listeners {
        if timeout(Duration::from_secs(2), listener).await.is_err() {
            info!("⏱️  Listener still draining, moving on");
        }
    }

    info!("🏁 Streaming example complete");
    Ok(())
}
