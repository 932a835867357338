use thiserror::Error;

/// Errors that abort a tracking run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Frame source error: {0}")]
    Source(String),

    #[error("Run cancelled before frame {frame_number}")]
    Cancelled { frame_number: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for tracking runs
pub type Result<T> = std::result::Result<T, Error>;

/// Failure confined to a single sampled frame. The frame is skipped and the
/// run continues.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrameError {
    #[error("Detector error: {0}")]
    Detector(String),

    #[error("Malformed detection #{index}: {reason}")]
    MalformedDetection { index: usize, reason: String },

    #[error("Frame encoding error: {0}")]
    Encoder(String),
}
