/// Errors that can occur while writing to the clipboard.
#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    /// This platform has no clipboard backend.
    #[error("Windows only")]
    PlatformUnsupported,

    /// The named clipboard format could not be registered.
    #[error("failed to register clipboard format {name:?}: {source}")]
    Register {
        name: String,
        source: std::io::Error,
    },

    /// The clipboard could not be acquired.
    #[error("failed to open clipboard: {0}")]
    Open(std::io::Error),

    /// Existing clipboard content could not be cleared.
    #[error("failed to clear clipboard: {0}")]
    Clear(std::io::Error),

    /// Memory for a clipboard payload could not be allocated.
    #[error("failed to allocate clipboard memory: {0}")]
    Alloc(std::io::Error),

    /// A payload could not be placed on the clipboard.
    #[error("failed to write {format} to clipboard: {source}")]
    Write {
        format: String,
        source: std::io::Error,
    },

    /// Empty payloads are never written.
    #[error("refusing to write an empty clipboard payload")]
    EmptyPayload,
}

pub type Result<T> = std::result::Result<T, ClipboardError>;
