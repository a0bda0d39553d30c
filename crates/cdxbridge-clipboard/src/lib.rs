//! Transactional clipboard writes for ChemDraw interchange data.
//!
//! A delivery registers the custom CDX format, opens the clipboard once,
//! clears it, writes every format, and releases it. Release happens on every
//! exit path because sessions close the clipboard in `Drop`.
//!
//! Only Windows has a native backend. Everywhere else
//! [`system_backend`] returns [`UnsupportedClipboard`], which refuses before
//! touching anything.

pub mod backend;
pub mod error;
pub mod memory;
pub mod unsupported;
#[cfg(windows)]
pub mod windows;
pub mod writer;

pub use backend::{ClipboardBackend, ClipboardFormat, ClipboardSession, FormatId};
pub use error::{ClipboardError, Result};
pub use memory::{ClipboardEvent, FailPoint, MemoryClipboard};
pub use unsupported::UnsupportedClipboard;
#[cfg(windows)]
pub use windows::WindowsClipboard;
pub use writer::{ClipboardWriter, CDX_FORMAT_NAME};

/// The clipboard backend for the running platform.
pub fn system_backend() -> Box<dyn ClipboardBackend> {
    #[cfg(windows)]
    {
        Box::new(WindowsClipboard::new())
    }

    #[cfg(not(windows))]
    {
        Box::new(UnsupportedClipboard)
    }
}
