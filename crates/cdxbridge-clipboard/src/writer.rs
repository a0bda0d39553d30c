use crate::backend::{ClipboardBackend, ClipboardFormat, FormatId};
use crate::error::{ClipboardError, Result};

/// Registered clipboard format name ChemDraw and compatible editors read.
pub const CDX_FORMAT_NAME: &str = "ChemDraw Interchange Format";

/// Delivers CDX (and optionally its markup) in one clipboard transaction.
pub struct ClipboardWriter<'a> {
    backend: &'a dyn ClipboardBackend,
    format_name: String,
}

impl<'a> ClipboardWriter<'a> {
    pub fn new(backend: &'a dyn ClipboardBackend) -> Self {
        Self {
            backend,
            format_name: CDX_FORMAT_NAME.to_string(),
        }
    }

    /// Use a different registered format name for the CDX payload.
    pub fn with_format_name(mut self, name: impl Into<String>) -> Self {
        self.format_name = name.into();
        self
    }

    /// Write `cdx` under the CDX format and, when given non-blank markup,
    /// the markup as plain text for editors that only paste text.
    pub fn write_cdx(&self, cdx: &[u8], markup: Option<&str>) -> Result<()> {
        let mut formats = vec![ClipboardFormat::Registered {
            name: &self.format_name,
            data: cdx,
        }];
        if let Some(markup) = markup.filter(|m| !m.trim().is_empty()) {
            formats.push(ClipboardFormat::UnicodeText(markup));
        }
        self.write_formats(&formats)
    }

    /// Write every format inside a single open/clear/write/close transaction.
    ///
    /// Any failed write fails the whole delivery. The clipboard is released
    /// before this returns, whatever the outcome.
    pub fn write_formats(&self, formats: &[ClipboardFormat<'_>]) -> Result<()> {
        if !self.backend.is_supported() {
            return Err(ClipboardError::PlatformUnsupported);
        }
        if formats.iter().any(|format| match format {
            ClipboardFormat::Registered { data, .. } => data.is_empty(),
            ClipboardFormat::UnicodeText(_) => false,
        }) {
            return Err(ClipboardError::EmptyPayload);
        }

        let resolved = formats
            .iter()
            .map(|format| match *format {
                ClipboardFormat::Registered { name, data } => self
                    .backend
                    .register_format(name)
                    .map(|id| Payload::Data(id, data)),
                ClipboardFormat::UnicodeText(text) => Ok(Payload::Text(text)),
            })
            .collect::<Result<Vec<_>>>()?;

        let mut session = self.backend.open()?;
        session.clear()?;
        for (format, payload) in formats.iter().zip(resolved) {
            match payload {
                Payload::Data(id, data) => session.set_data(id, data)?,
                Payload::Text(text) => session.set_text(text)?,
            }
            tracing::debug!(
                backend = self.backend.name(),
                format = format.label(),
                "wrote clipboard format"
            );
        }
        drop(session);

        tracing::info!(
            backend = self.backend.name(),
            formats = formats.len(),
            "clipboard updated"
        );
        Ok(())
    }
}

enum Payload<'f> {
    Data(FormatId, &'f [u8]),
    Text(&'f str),
}
