use std::thread;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleRate, StreamConfig};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use tokio::sync::{oneshot, watch};
use tracing::{debug, error, info, warn};

use super::meter::{self, LevelSample};
use crate::error::{ClientError, Result};

const METER_TICK: Duration = Duration::from_millis(33);

enum Command {
    Start { reply: oneshot::Sender<Result<()>> },
    Ensure { reply: oneshot::Sender<Result<()>> },
    Stop { reply: oneshot::Sender<()> },
}

/// Microphone level meter.
///
/// cpal streams are not Send, so the stream lives on a dedicated worker
/// thread; this handle talks to it over a command channel and readers watch
/// the published samples. The meter is purely presentational: recording and
/// streaming never depend on it succeeding.
#[derive(Clone)]
pub struct LevelMonitor {
    commands: Sender<Command>,
    levels: watch::Receiver<LevelSample>,
}

impl LevelMonitor {
    /// Spawn the worker thread; the microphone stays untouched until
    /// `start` or `ensure`.
    pub fn spawn(preferred_sample_rate: u32) -> Self {
        let (cmd_tx, cmd_rx) = crossbeam_channel::unbounded();
        let (level_tx, level_rx) = watch::channel(LevelSample::SILENCE);

        let spawned = thread::Builder::new()
            .name("level-meter".into())
            .spawn(move || worker(cmd_rx, level_tx, preferred_sample_rate));
        if let Err(err) = spawned {
            // Commands will fail with an Audio error; callers tolerate that.
            error!("Failed to spawn level meter worker: {}", err);
        }

        Self {
            commands: cmd_tx,
            levels: level_rx,
        }
    }

    /// Watch the published levels
    pub fn levels(&self) -> watch::Receiver<LevelSample> {
        self.levels.clone()
    }

    /// Freshest published level
    pub fn current(&self) -> LevelSample {
        *self.levels.borrow()
    }

    /// Acquire the microphone and begin metering
    pub async fn start(&self) -> Result<()> {
        self.request(|reply| Command::Start { reply }).await
    }

    /// Resume metering, acquiring the microphone only if it is not held yet
    pub async fn ensure(&self) -> Result<()> {
        self.request(|reply| Command::Ensure { reply }).await
    }

    /// Release the microphone and publish silence; safe when never started
    pub async fn stop(&self) {
        let (reply, done) = oneshot::channel();
        if self.commands.send(Command::Stop { reply }).is_ok() {
            let _ = done.await;
        }
    }

    async fn request(
        &self,
        make: impl FnOnce(oneshot::Sender<Result<()>>) -> Command,
    ) -> Result<()> {
        let (reply, done) = oneshot::channel();
        self.commands
            .send(make(reply))
            .map_err(|_| ClientError::Audio("Level meter worker is gone".into()))?;
        done.await
            .map_err(|_| ClientError::Audio("Level meter worker dropped the request".into()))?
    }
}

fn worker(commands: Receiver<Command>, levels: watch::Sender<LevelSample>, preferred_rate: u32) {
    let mut capture = Capture {
        stream: None,
        samples: None,
        preferred_rate,
        levels,
    };

    loop {
        match commands.recv_timeout(METER_TICK) {
            Ok(Command::Start { reply }) => {
                let _ = reply.send(capture.acquire());
            }
            Ok(Command::Ensure { reply }) => {
                let _ = reply.send(capture.ensure());
            }
            Ok(Command::Stop { reply }) => {
                capture.release();
                let _ = reply.send(());
            }
            Err(RecvTimeoutError::Timeout) => capture.tick(),
            Err(RecvTimeoutError::Disconnected) => {
                capture.release();
                return;
            }
        }
    }
}

struct Capture {
    stream: Option<cpal::Stream>,
    samples: Option<Receiver<Vec<f32>>>,
    preferred_rate: u32,
    levels: watch::Sender<LevelSample>,
}

impl Capture {
    fn acquire(&mut self) -> Result<()> {
        self.stream = None;
        self.samples = None;

        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| ClientError::Audio("No input device available".into()))?;

        info!(
            "Level meter using input device: {}",
            device.name().unwrap_or_else(|_| "unknown".to_string())
        );

        // The ASR-tuned profile first, whatever the device offers second.
        let config = match preferred_config(&device, self.preferred_rate) {
            Some(config) => config,
            None => default_config(&device)?,
        };

        let channels = config.channels as usize;
        let (sample_tx, sample_rx) = crossbeam_channel::bounded::<Vec<f32>>(8);

        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let mono: Vec<f32> = if channels > 1 {
                        data.chunks(channels)
                            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
                            .collect()
                    } else {
                        data.to_vec()
                    };
                    let _ = sample_tx.try_send(mono);
                },
                |err| error!("Level meter stream error: {}", err),
                None,
            )
            .map_err(|err| ClientError::Audio(format!("Failed to build input stream: {err}")))?;

        stream
            .play()
            .map_err(|err| ClientError::Audio(format!("Failed to start input stream: {err}")))?;

        debug!(
            "Level meter capturing at {} Hz, {} channel(s)",
            config.sample_rate.0, config.channels
        );

        self.stream = Some(stream);
        self.samples = Some(sample_rx);
        Ok(())
    }

    fn ensure(&mut self) -> Result<()> {
        match &self.stream {
            Some(stream) => stream
                .play()
                .map_err(|err| ClientError::Audio(format!("Failed to resume input stream: {err}"))),
            None => self.acquire(),
        }
    }

    fn release(&mut self) {
        if self.stream.take().is_some() {
            info!("Level meter released the microphone");
        }
        self.samples = None;
        self.levels.send_replace(LevelSample::SILENCE);
    }

    fn tick(&mut self) {
        let Some(samples) = &self.samples else { return };

        // Meter the freshest chunk and drop any backlog.
        let mut latest = None;
        while let Ok(chunk) = samples.try_recv() {
            latest = Some(chunk);
        }
        if let Some(chunk) = latest {
            if !chunk.is_empty() {
                self.levels.send_replace(meter::measure(&chunk));
            }
        }
    }
}

fn preferred_config(device: &cpal::Device, rate: u32) -> Option<StreamConfig> {
    let ranges: Vec<_> = device.supported_input_configs().ok()?.collect();

    // Mono at the requested rate is ideal; any channel count at that rate
    // still works since the callback downmixes.
    for range in ranges
        .iter()
        .filter(|range| range.channels() == 1)
        .chain(ranges.iter())
    {
        if range.min_sample_rate().0 <= rate && range.max_sample_rate().0 >= rate {
            return Some(StreamConfig {
                channels: range.channels(),
                sample_rate: SampleRate(rate),
                buffer_size: cpal::BufferSize::Default,
            });
        }
    }
    None
}

fn default_config(device: &cpal::Device) -> Result<StreamConfig> {
    let config = device
        .default_input_config()
        .map_err(|err| ClientError::Audio(format!("No usable input config: {err}")))?;

    warn!(
        "Preferred capture profile unavailable, using device default: {} Hz, {} channel(s)",
        config.sample_rate().0,
        config.channels()
    );

    Ok(config.into())
}
