use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::terminal;
use tokio::sync::watch;
use tracing::{info, warn};

use subtext_console::audio::{LevelMonitor, LevelSample};
use subtext_console::backend::{HttpBackend, TranslatorBackend};
use subtext_console::session::{
    ClientStats, RecordingController, ResultPoller, SessionResetCoordinator, StreamingController,
    READY_STATUS,
};
use subtext_console::ui::{spawn_input_thread, InputAction, StatusAnnouncer, StatusLine, TranscriptPanels};
use subtext_console::Config;

/// Terminal client for the Subtext speech translation backend
#[derive(Parser, Debug)]
#[command(name = "subtext-console", version, about)]
struct Args {
    /// Config file (TOML); defaults apply when absent
    #[arg(short, long, default_value = "config/subtext-console")]
    config: String,

    /// Backend base URL, overriding the config file
    #[arg(short, long)]
    backend: Option<String>,

    /// Disable the microphone level meter
    #[arg(long)]
    no_meter: bool,
}

/// Puts raw mode back off on every exit path
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> Result<Self> {
        terminal::enable_raw_mode().context("Failed to enable raw terminal mode")?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(err) = terminal::disable_raw_mode() {
            eprintln!("Failed to restore terminal: {err}");
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let mut cfg = Config::load(&args.config).context("Failed to load configuration")?;
    if let Some(backend) = args.backend {
        cfg.backend.base_url = backend;
    }
    if args.no_meter {
        cfg.audio.meter = false;
    }

    info!("Subtext console v0.1.0");
    info!("Backend: {}", cfg.backend.base_url);

    let backend: Arc<dyn TranslatorBackend> = Arc::new(HttpBackend::new(&cfg.backend.base_url)?);
    let stats = Arc::new(ClientStats::new());
    let status = StatusAnnouncer::new(cfg.status_cooldown());
    let panels = TranscriptPanels::new();
    let level = LevelMonitor::spawn(cfg.audio.sample_rate);

    let poller = ResultPoller::new(
        Arc::clone(&backend),
        panels.clone(),
        status.clone(),
        Arc::clone(&stats),
        cfg.poll_interval(),
    );
    let recording = RecordingController::new(
        Arc::clone(&backend),
        panels.clone(),
        status.clone(),
        level.clone(),
        poller.clone(),
        Arc::clone(&stats),
    );
    let streaming = StreamingController::new(
        Arc::clone(&backend),
        panels.clone(),
        status.clone(),
        Arc::clone(&stats),
    );
    let reset = SessionResetCoordinator::new(
        Arc::clone(&backend),
        streaming.clone(),
        recording.clone(),
        poller.clone(),
        panels.clone(),
        status.clone(),
        Arc::clone(&stats),
    );

    // Microphone preflight, the way the page checks permission on load.
    status.force("Checking microphone access...", true);
    if cfg.audio.meter {
        match level.start().await {
            Ok(()) => status.force(READY_STATUS, false),
            Err(err) => {
                warn!("Microphone unavailable: {}", err);
                status.force(&format!("Microphone unavailable: {err}"), false);
            }
        }
    } else {
        status.force(READY_STATUS, false);
    }

    let _raw = RawModeGuard::enable()?;
    let mut keys = spawn_input_thread();

    let render = tokio::spawn(render_loop(status.subscribe(), level.levels()));

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            action = keys.recv() => {
                let Some(action) = action else { break };
                match action {
                    InputAction::StartRecording => recording.start().await,
                    InputAction::FinishRecording => recording.finish().await,
                    InputAction::StartStreaming => streaming.start().await,
                    InputAction::StopStreaming => streaming.stop().await,
                    InputAction::ClearResult => recording.clear().await,
                    InputAction::ResetSession => reset.reset().await,
                    InputAction::ShowPanels => print_panels(&panels).await,
                    InputAction::Quit => break,
                }
            }
            _ = &mut ctrl_c => break,
        }
    }

    info!("Shutting down");
    streaming.stop().await;
    poller.stop().await;
    level.stop().await;
    render.abort();

    let report = stats.report();
    info!(
        "Session summary: {} recordings, {} polls, {}/{}/{} push events, {} resets over {:.1}s",
        report.recordings_completed,
        report.polls_issued,
        report.transcript_events,
        report.analysis_events,
        report.summary_events,
        report.session_resets,
        report.uptime_secs
    );

    Ok(())
}

/// Print status changes as lines and the mic level as an overwritten meter
async fn render_loop(
    mut status_rx: watch::Receiver<StatusLine>,
    mut levels_rx: watch::Receiver<LevelSample>,
) {
    loop {
        tokio::select! {
            changed = status_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let line = status_rx.borrow_and_update().clone();
                let marker = if line.processing { " ..." } else { "" };
                print!("\r\x1b[2K{}{}\r\n", line.text, marker);
                let _ = std::io::stdout().flush();
            }
            changed = levels_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let sample = *levels_rx.borrow_and_update();
                let voice = if sample.voice { "voice" } else { "" };
                print!(
                    "\r\x1b[2Kmic [{}] {:3}% {}",
                    meter_bar(sample.level),
                    sample.level,
                    voice
                );
                let _ = std::io::stdout().flush();
            }
        }
    }
}

fn meter_bar(level: u8) -> String {
    const WIDTH: usize = 20;
    let filled = (level as usize * WIDTH) / 100;
    (0..WIDTH).map(|i| if i < filled { '#' } else { ' ' }).collect()
}

async fn print_panels(panels: &TranscriptPanels) {
    let snapshot = panels.snapshot().await;
    let text = format!(
        "\n== Original ==\n{}\n== Translation ==\n{}\n== Live transcript ==\n{}\n== Live analysis ==\n{}\n== Live summary ==\n{}\n",
        snapshot.original,
        snapshot.translation,
        snapshot.live_transcript,
        snapshot.live_analysis,
        snapshot.live_summary
    );
    // Raw mode needs explicit carriage returns.
    print!("{}", text.replace('\n', "\r\n"));
    let _ = std::io::stdout().flush();
}
