use thiserror::Error;

/// Errors raised at the backend and microphone boundaries.
///
/// Controllers consume these: every failure ends up on the status line and in
/// the log rather than propagating out of a controller method.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport-level failure (connection refused, reset mid-stream, ...).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend answered and reported an error of its own.
    #[error("Backend error: {0}")]
    Backend(String),

    /// The backend answered with a shape or status this client does not know.
    #[error("Unexpected backend response: {0}")]
    Protocol(String),

    /// Microphone acquisition or capture failure.
    #[error("Audio error: {0}")]
    Audio(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;
