pub mod input;
pub mod panels;
pub mod status;

pub use input::{spawn_input_thread, InputAction};
pub use panels::{PanelsSnapshot, TranscriptPanels};
pub use status::{StatusAnnouncer, StatusLine};
