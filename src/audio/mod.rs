pub mod level;
pub mod meter;

pub use level::LevelMonitor;
pub use meter::{LevelSample, VOICE_THRESHOLD};
