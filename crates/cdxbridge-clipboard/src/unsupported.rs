use crate::backend::{ClipboardBackend, ClipboardSession, FormatId};
use crate::error::{ClipboardError, Result};

/// Backend for platforms without clipboard support. Every call fails with
/// [`ClipboardError::PlatformUnsupported`] and nothing is touched.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedClipboard;

impl ClipboardBackend for UnsupportedClipboard {
    fn name(&self) -> &'static str {
        "unsupported"
    }

    fn is_supported(&self) -> bool {
        false
    }

    fn register_format(&self, _name: &str) -> Result<FormatId> {
        Err(ClipboardError::PlatformUnsupported)
    }

    fn open(&self) -> Result<Box<dyn ClipboardSession + '_>> {
        Err(ClipboardError::PlatformUnsupported)
    }
}
