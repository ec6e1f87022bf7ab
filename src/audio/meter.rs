/// Midpoint of the unsigned byte waveform (silence)
const MIDPOINT: f32 = 128.0;

/// RMS deviation that maps to a full meter
const FULL_SCALE_RMS: f32 = 64.0;

/// Meter levels above this count as voice
pub const VOICE_THRESHOLD: u8 = 12;

/// One metering observation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelSample {
    /// RMS deviation from the silence midpoint, in byte-waveform units
    pub rms: f32,
    /// Normalized meter level, 0..=100
    pub level: u8,
    /// Whether the level clears the voice threshold
    pub voice: bool,
}

impl LevelSample {
    pub const SILENCE: LevelSample = LevelSample {
        rms: 0.0,
        level: 0,
        voice: false,
    };
}

/// Map float samples in [-1, 1] onto the unsigned byte waveform around 128
pub fn byte_waveform(samples: &[f32]) -> Vec<u8> {
    samples
        .iter()
        .map(|sample| {
            let clamped = sample.clamp(-1.0, 1.0);
            ((clamped + 1.0) * MIDPOINT).round().min(255.0) as u8
        })
        .collect()
}

/// RMS deviation of a byte waveform from the silence midpoint
pub fn rms_deviation(waveform: &[u8]) -> f32 {
    if waveform.is_empty() {
        return 0.0;
    }
    let sum: f32 = waveform
        .iter()
        .map(|&byte| {
            let deviation = byte as f32 - MIDPOINT;
            deviation * deviation
        })
        .sum();
    (sum / waveform.len() as f32).sqrt()
}

/// Normalize an RMS deviation to the 0..=100 meter range
pub fn normalized_level(rms: f32) -> u8 {
    (rms / FULL_SCALE_RMS * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Measure one chunk of capture samples
pub fn measure(samples: &[f32]) -> LevelSample {
    let rms = rms_deviation(&byte_waveform(samples));
    let level = normalized_level(rms);
    LevelSample {
        rms,
        level,
        voice: level > VOICE_THRESHOLD,
    }
}
