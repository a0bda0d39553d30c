use std::io;
use std::marker::PhantomData;
use std::ptr;

use windows_sys::Win32::Foundation::{GlobalFree, HGLOBAL};
use windows_sys::Win32::System::DataExchange::{
    CloseClipboard, EmptyClipboard, OpenClipboard, RegisterClipboardFormatW, SetClipboardData,
};
use windows_sys::Win32::System::Memory::{GlobalAlloc, GlobalLock, GlobalUnlock, GMEM_MOVEABLE};
use windows_sys::Win32::System::Ole::CF_UNICODETEXT;

use crate::backend::{ClipboardBackend, ClipboardSession, FormatId};
use crate::error::{ClipboardError, Result};

/// The Win32 clipboard.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsClipboard;

impl WindowsClipboard {
    pub fn new() -> Self {
        Self
    }
}

impl ClipboardBackend for WindowsClipboard {
    fn name(&self) -> &'static str {
        "windows"
    }

    fn register_format(&self, name: &str) -> Result<FormatId> {
        let wide = to_wide_nul(name);
        // SAFETY: `wide` is a NUL-terminated UTF-16 buffer that outlives the call.
        let id = unsafe { RegisterClipboardFormatW(wide.as_ptr()) };
        if id == 0 {
            return Err(ClipboardError::Register {
                name: name.to_string(),
                source: io::Error::last_os_error(),
            });
        }
        Ok(FormatId(id))
    }

    fn open(&self) -> Result<Box<dyn ClipboardSession + '_>> {
        // SAFETY: a null owner window is allowed; the clipboard is then
        // associated with the current task.
        if unsafe { OpenClipboard(ptr::null_mut()) } == 0 {
            return Err(ClipboardError::Open(io::Error::last_os_error()));
        }
        tracing::trace!("clipboard opened");
        Ok(Box::new(OpenClipboardGuard {
            _not_send: PhantomData,
        }))
    }
}

/// Proof that this thread holds the clipboard. Closes it on drop.
struct OpenClipboardGuard {
    // The clipboard is owned by the thread that opened it.
    _not_send: PhantomData<*const ()>,
}

impl ClipboardSession for OpenClipboardGuard {
    fn clear(&mut self) -> Result<()> {
        // SAFETY: the clipboard is open on this thread for the guard's lifetime.
        if unsafe { EmptyClipboard() } == 0 {
            return Err(ClipboardError::Clear(io::Error::last_os_error()));
        }
        Ok(())
    }

    fn set_data(&mut self, format: FormatId, data: &[u8]) -> Result<()> {
        let memory = GlobalMemory::copy_from(data)?;
        memory
            .hand_to_clipboard(format.0)
            .map_err(|source| ClipboardError::Write {
                format: format.to_string(),
                source,
            })
    }

    fn set_text(&mut self, text: &str) -> Result<()> {
        let bytes: Vec<u8> = to_wide_nul(text)
            .into_iter()
            .flat_map(u16::to_le_bytes)
            .collect();
        let memory = GlobalMemory::copy_from(&bytes)?;
        memory
            .hand_to_clipboard(u32::from(CF_UNICODETEXT))
            .map_err(|source| ClipboardError::Write {
                format: "Unicode text".to_string(),
                source,
            })
    }
}

impl Drop for OpenClipboardGuard {
    fn drop(&mut self) {
        // SAFETY: the clipboard was opened by `WindowsClipboard::open` on this thread.
        if unsafe { CloseClipboard() } == 0 {
            tracing::warn!(error = %io::Error::last_os_error(), "failed to close clipboard");
        } else {
            tracing::trace!("clipboard closed");
        }
    }
}

/// A movable global memory block. Freed on drop unless the clipboard took it.
struct GlobalMemory(HGLOBAL);

impl GlobalMemory {
    fn copy_from(data: &[u8]) -> Result<Self> {
        // SAFETY: plain allocation; a null return is handled below.
        let handle = unsafe { GlobalAlloc(GMEM_MOVEABLE, data.len()) };
        if handle.is_null() {
            return Err(ClipboardError::Alloc(io::Error::last_os_error()));
        }
        let memory = Self(handle);

        // SAFETY: `handle` is a live movable block of `data.len()` bytes.
        let dst = unsafe { GlobalLock(handle) };
        if dst.is_null() {
            return Err(ClipboardError::Alloc(io::Error::last_os_error()));
        }
        // SAFETY: `dst` points to at least `data.len()` writable bytes and
        // cannot overlap `data`. The block is unlocked right after the copy.
        unsafe {
            ptr::copy_nonoverlapping(data.as_ptr(), dst.cast::<u8>(), data.len());
            GlobalUnlock(handle);
        }

        Ok(memory)
    }

    /// Transfer ownership of the block to the clipboard under `format`.
    fn hand_to_clipboard(self, format: u32) -> io::Result<()> {
        // SAFETY: the clipboard is open on this thread and `self.0` is an
        // unlocked movable block, as `SetClipboardData` requires.
        let placed = unsafe { SetClipboardData(format, self.0) };
        if placed.is_null() {
            return Err(io::Error::last_os_error());
        }
        // The system owns the block now.
        std::mem::forget(self);
        Ok(())
    }
}

impl Drop for GlobalMemory {
    fn drop(&mut self) {
        // SAFETY: we still own the block; ownership never reached the clipboard.
        unsafe {
            GlobalFree(self.0);
        }
    }
}

fn to_wide_nul(text: &str) -> Vec<u16> {
    text.encode_utf16().chain(std::iter::once(0)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_strings_are_nul_terminated() {
        assert_eq!(to_wide_nul("CDX"), [0x43, 0x44, 0x58, 0]);
        assert_eq!(to_wide_nul(""), [0]);
    }

    #[test]
    fn registering_cdx_format_is_stable() {
        let backend = WindowsClipboard::new();
        let first = backend.register_format(crate::CDX_FORMAT_NAME).unwrap();
        let second = backend.register_format(crate::CDX_FORMAT_NAME).unwrap();
        assert_eq!(first, second);
        assert!(first.0 >= 0xC000);
    }
}
