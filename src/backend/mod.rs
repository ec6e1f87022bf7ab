pub mod api;
pub mod http;
pub mod sse;
pub mod wire;

pub use api::{PushChannel, PushEvent, PushSubscription, TranslatorBackend};
pub use http::HttpBackend;
pub use wire::{FinishOutcome, PollOutcome, RecognitionResult};
