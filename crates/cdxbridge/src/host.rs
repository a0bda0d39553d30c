//! Single-shot native messaging host.
//!
//! Reads one request, converts it to CDX, puts it on the clipboard, and
//! writes one response. Every failure becomes a `{"success": false}` response;
//! only a failure to write that response is returned as an error.

use std::io::{Read, Write};

use cdxbridge_clipboard::{ClipboardBackend, ClipboardError, ClipboardWriter};
use cdxbridge_convert::{ConversionChain, ConversionInput, ConvertError, Provenance};
use cdxbridge_frame::{
    FrameConfig, FrameError, HostRequest, HostResponse, MessageReader, MessageWriter,
};

/// Reasons a request did not end on the clipboard.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// The browser closed the pipe before sending a message.
    #[error("No input")]
    NoInput,

    /// The message could not be framed or parsed.
    #[error("Invalid message: {0}")]
    Protocol(#[source] FrameError),

    /// The message parsed but its fields are unusable.
    #[error("{0}")]
    Validation(&'static str),

    #[error(transparent)]
    Convert(#[from] ConvertError),

    #[error(transparent)]
    Clipboard(#[from] ClipboardError),
}

pub type Result<T> = std::result::Result<T, HostError>;

const EMPTY_MARKUP: &str = "Empty cdxml field";
const MISSING_PAYLOAD: &str = "Missing cdxml or cdx field";

/// Reject requests that cannot produce CDX.
///
/// A `cdxml` field that is present but blank is an error even when a
/// pre-encoded payload is also supplied.
pub fn validate(request: &HostRequest) -> Result<()> {
    match request.markup() {
        Some(markup) if markup.trim().is_empty() => Err(HostError::Validation(EMPTY_MARKUP)),
        Some(_) => Ok(()),
        None if request.encoded_cdx().is_some() => Ok(()),
        None => Err(HostError::Validation(MISSING_PAYLOAD)),
    }
}

/// Converts requests and delivers the result to a clipboard.
pub struct Host<'a> {
    chain: &'a ConversionChain,
    clipboard: &'a dyn ClipboardBackend,
    frame: FrameConfig,
}

impl<'a> Host<'a> {
    pub fn new(chain: &'a ConversionChain, clipboard: &'a dyn ClipboardBackend) -> Self {
        Self {
            chain,
            clipboard,
            frame: FrameConfig::default(),
        }
    }

    /// Override the incoming message size limit.
    pub fn with_frame_config(mut self, config: FrameConfig) -> Self {
        self.frame = config;
        self
    }

    /// Read one message from `input`, act on it, and write one response to
    /// `output`. Returns the response that was written.
    pub fn run<R, W>(&self, input: R, output: W) -> cdxbridge_frame::Result<HostResponse>
    where
        R: Read,
        W: Write,
    {
        let response = match self.receive(input) {
            Ok(provenance) => {
                tracing::info!(%provenance, "delivered CDX to clipboard");
                HostResponse::ok()
            }
            Err(err) => {
                tracing::warn!(error = %err, "request failed");
                HostResponse::failure(err.to_string())
            }
        };

        MessageWriter::new(output).write_message(&response)?;
        Ok(response)
    }

    /// Handle an already-decoded request.
    pub fn handle(&self, request: &HostRequest) -> Result<Provenance> {
        validate(request)?;

        let conversion = self.chain.convert(ConversionInput {
            markup: request.markup(),
            encoded_cdx: request.encoded_cdx(),
        })?;
        tracing::debug!(
            bytes = conversion.bytes.len(),
            provenance = %conversion.provenance,
            "converted request"
        );

        ClipboardWriter::new(self.clipboard).write_cdx(&conversion.bytes, request.markup())?;
        Ok(conversion.provenance)
    }

    fn receive<R: Read>(&self, input: R) -> Result<Provenance> {
        let message =
            MessageReader::with_config(input, self.frame.clone()).read_message::<HostRequest>();

        // Drain the message before the platform check.
        if !self.clipboard.is_supported() {
            return Err(ClipboardError::PlatformUnsupported.into());
        }

        let request = match message {
            Ok(Some(request)) => request,
            Ok(None) => return Err(HostError::NoInput),
            Err(err) => return Err(HostError::Protocol(err)),
        };
        self.handle(&request)
    }
}
