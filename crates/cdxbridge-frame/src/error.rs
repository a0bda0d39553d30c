/// Errors that can occur while reading or writing framed messages.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The message exceeds the configured maximum size.
    #[error("message too large ({size} bytes, max {max})")]
    MessageTooLarge { size: usize, max: usize },

    /// The stream ended before the announced payload length was read.
    #[error("truncated message (expected {expected} bytes, got {actual})")]
    Truncated { expected: usize, actual: usize },

    /// The payload is not valid UTF-8.
    #[error("message is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// The payload is not valid JSON, or does not match the expected shape.
    #[error("message is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// An I/O error occurred while reading or writing.
    #[error("message I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FrameError>;
