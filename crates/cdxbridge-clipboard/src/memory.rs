//! In-process clipboard backend.
//!
//! Mirrors the OS contract (register, open, clear, write, close) and records
//! every call, so delivery logic can be exercised on any platform.

use std::collections::HashMap;
use std::io;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::backend::{ClipboardBackend, ClipboardSession, FormatId};
use crate::error::{ClipboardError, Result};

/// First id handed out for registered formats, matching the Windows range.
const FIRST_REGISTERED_ID: u32 = 0xC000;

/// A recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardEvent {
    Register(String),
    Open,
    Clear,
    SetData(FormatId),
    SetText,
    Close,
}

/// Where a [`MemoryClipboard`] should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    Register,
    Open,
    Clear,
    SetData,
    SetText,
}

#[derive(Debug, Default)]
struct State {
    events: Vec<ClipboardEvent>,
    formats: Vec<String>,
    data: HashMap<FormatId, Vec<u8>>,
    text: Option<String>,
    open: bool,
}

/// Clipboard held in memory.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    state: Mutex<State>,
    fail_at: Option<FailPoint>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clipboard whose `point` operation always fails.
    pub fn failing(point: FailPoint) -> Self {
        Self {
            state: Mutex::default(),
            fail_at: Some(point),
        }
    }

    /// Every backend call so far, in order.
    pub fn events(&self) -> Vec<ClipboardEvent> {
        self.lock().events.clone()
    }

    /// Id of a registered format, if registered.
    pub fn format_id(&self, name: &str) -> Option<FormatId> {
        self.lock()
            .formats
            .iter()
            .position(|f| f == name)
            .map(|index| FormatId(FIRST_REGISTERED_ID + index as u32))
    }

    /// Current payload under a registered format name.
    pub fn data(&self, name: &str) -> Option<Vec<u8>> {
        let id = self.format_id(name)?;
        self.lock().data.get(&id).cloned()
    }

    /// Current plain text content.
    pub fn text(&self) -> Option<String> {
        self.lock().text.clone()
    }

    /// True while a session is held.
    pub fn is_open(&self) -> bool {
        self.lock().open
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn should_fail(&self, point: FailPoint) -> bool {
        self.fail_at == Some(point)
    }
}

fn simulated(what: &str) -> io::Error {
    io::Error::other(format!("simulated {what} failure"))
}

impl ClipboardBackend for MemoryClipboard {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn register_format(&self, name: &str) -> Result<FormatId> {
        let mut state = self.lock();
        state.events.push(ClipboardEvent::Register(name.to_string()));
        if self.should_fail(FailPoint::Register) {
            return Err(ClipboardError::Register {
                name: name.to_string(),
                source: simulated("register"),
            });
        }

        let index = match state.formats.iter().position(|f| f == name) {
            Some(index) => index,
            None => {
                state.formats.push(name.to_string());
                state.formats.len() - 1
            }
        };
        Ok(FormatId(FIRST_REGISTERED_ID + index as u32))
    }

    fn open(&self) -> Result<Box<dyn ClipboardSession + '_>> {
        let mut state = self.lock();
        if self.should_fail(FailPoint::Open) {
            return Err(ClipboardError::Open(simulated("open")));
        }
        if state.open {
            return Err(ClipboardError::Open(io::Error::new(
                io::ErrorKind::ResourceBusy,
                "clipboard already open",
            )));
        }
        state.open = true;
        state.events.push(ClipboardEvent::Open);
        Ok(Box::new(MemorySession { clipboard: self }))
    }
}

struct MemorySession<'a> {
    clipboard: &'a MemoryClipboard,
}

impl ClipboardSession for MemorySession<'_> {
    fn clear(&mut self) -> Result<()> {
        let mut state = self.clipboard.lock();
        state.events.push(ClipboardEvent::Clear);
        if self.clipboard.should_fail(FailPoint::Clear) {
            return Err(ClipboardError::Clear(simulated("clear")));
        }
        state.data.clear();
        state.text = None;
        Ok(())
    }

    fn set_data(&mut self, format: FormatId, data: &[u8]) -> Result<()> {
        let mut state = self.clipboard.lock();
        state.events.push(ClipboardEvent::SetData(format));
        if self.clipboard.should_fail(FailPoint::SetData) {
            return Err(ClipboardError::Write {
                format: format.to_string(),
                source: simulated("write"),
            });
        }
        state.data.insert(format, data.to_vec());
        Ok(())
    }

    fn set_text(&mut self, text: &str) -> Result<()> {
        let mut state = self.clipboard.lock();
        state.events.push(ClipboardEvent::SetText);
        if self.clipboard.should_fail(FailPoint::SetText) {
            return Err(ClipboardError::Write {
                format: "Unicode text".to_string(),
                source: simulated("write"),
            });
        }
        state.text = Some(text.to_string());
        Ok(())
    }
}

impl Drop for MemorySession<'_> {
    fn drop(&mut self) {
        let mut state = self.clipboard.lock();
        state.open = false;
        state.events.push(ClipboardEvent::Close);
    }
}
