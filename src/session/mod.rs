//! Client session controllers
//!
//! The state machines that decide what the client is doing at any moment:
//! - `RecordingController`: manual record / finish / recognize workflow
//! - `StreamingController`: the three live push channels, owned as a unit
//! - `ResultPoller`: fixed-interval result polling after recognition
//! - `SessionResetCoordinator`: total teardown back to the boot state
//!
//! `ClientStats` counts what they all did for the shutdown log.

mod poller;
mod recording;
mod reset;
mod stats;
mod streaming;

pub use poller::{PollPhase, ResultPoller, DEFAULT_POLL_INTERVAL};
pub use recording::{RecordingController, RecordingPhase};
pub use reset::{SessionResetCoordinator, READY_STATUS};
pub use stats::{ClientStats, StatsReport};
pub use streaming::StreamingController;
