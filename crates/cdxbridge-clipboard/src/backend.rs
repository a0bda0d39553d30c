use std::fmt;

use crate::error::Result;

/// An OS clipboard format identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormatId(pub u32);

impl fmt::Display for FormatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "format {}", self.0)
    }
}

/// One representation of the content being delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardFormat<'a> {
    /// Binary payload under an application-registered format name.
    Registered { name: &'a str, data: &'a [u8] },
    /// Plain Unicode text.
    UnicodeText(&'a str),
}

impl ClipboardFormat<'_> {
    pub fn label(&self) -> &str {
        match self {
            Self::Registered { name, .. } => name,
            Self::UnicodeText(_) => "Unicode text",
        }
    }
}

/// A platform clipboard.
pub trait ClipboardBackend {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// False when this backend cannot write at all.
    fn is_supported(&self) -> bool {
        true
    }

    /// Register (or look up) a named custom format.
    fn register_format(&self, name: &str) -> Result<FormatId>;

    /// Acquire the clipboard. Dropping the session releases it.
    fn open(&self) -> Result<Box<dyn ClipboardSession + '_>>;
}

/// An acquired clipboard. Released when dropped.
pub trait ClipboardSession {
    /// Remove all existing content.
    fn clear(&mut self) -> Result<()>;

    /// Place a binary payload under `format`.
    fn set_data(&mut self, format: FormatId, data: &[u8]) -> Result<()>;

    /// Place plain Unicode text.
    fn set_text(&mut self, text: &str) -> Result<()>;
}
