use std::ffi::OsStr;
use std::io::ErrorKind;
use std::process::{Command, Output, Stdio};
use std::str::FromStr;

use base64::Engine;

use crate::error::{ConvertError, Result};
use crate::staging::StagedMarkup;

/// A backend able to turn staged CDXML into CDX bytes.
///
/// Implementations report a missing runtime or library as
/// [`ConvertError::Unavailable`] and everything else as
/// [`ConvertError::Failed`]. The chain tries the next backend either way.
pub trait Converter: Send + Sync {
    /// Short name used in logs and error messages.
    fn name(&self) -> &str;

    /// Convert the staged markup to raw CDX bytes.
    fn convert(&self, markup: &StagedMarkup) -> Result<Vec<u8>>;

    /// Check whether the backend is installed, without converting anything.
    fn probe(&self) -> Result<()> {
        Ok(())
    }
}

/// How a backend writes CDX to its standard output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputEncoding {
    /// Raw CDX bytes.
    #[default]
    Raw,
    /// CDX as base64 text.
    Base64,
}

impl OutputEncoding {
    /// Turn captured stdout into raw CDX bytes.
    pub fn decode(self, provider: &str, stdout: Vec<u8>) -> Result<Vec<u8>> {
        let bytes = match self {
            Self::Raw => stdout,
            Self::Base64 => {
                let text = std::str::from_utf8(&stdout).map_err(|err| {
                    ConvertError::failed(provider, format!("base64 output is not text: {err}"))
                })?;
                decode_base64(text).map_err(|err| {
                    ConvertError::failed(provider, format!("invalid base64 output: {err}"))
                })?
            }
        };

        if bytes.is_empty() {
            return Err(ConvertError::failed(provider, "produced no output"));
        }
        Ok(bytes)
    }
}

impl FromStr for OutputEncoding {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" | "binary" => Ok(Self::Raw),
            "base64" | "b64" => Ok(Self::Base64),
            other => Err(ConvertError::Config(format!(
                "unknown output encoding {other:?} (expected raw or base64)"
            ))),
        }
    }
}

/// Decode standard-alphabet base64, ignoring embedded ASCII whitespace.
pub fn decode_base64(text: &str) -> std::result::Result<Vec<u8>, base64::DecodeError> {
    let compact: String = text.split_ascii_whitespace().collect();
    base64::engine::general_purpose::STANDARD.decode(compact)
}

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Run a converter subprocess to completion and capture its output.
///
/// A program that cannot be found is reported as unavailable.
pub(crate) fn run_subprocess(provider: &str, command: &mut Command) -> Result<Output> {
    command.stdin(Stdio::null());

    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        command.creation_flags(CREATE_NO_WINDOW);
    }

    let program = command.get_program().to_os_string();
    tracing::debug!(provider, program = %program.to_string_lossy(), "spawning converter");

    command.output().map_err(|err| spawn_error(provider, &program, err))
}

fn spawn_error(provider: &str, program: &OsStr, err: std::io::Error) -> ConvertError {
    match err.kind() {
        ErrorKind::NotFound | ErrorKind::PermissionDenied => ConvertError::Unavailable(format!(
            "{provider}: cannot run {}: {err}",
            program.to_string_lossy()
        )),
        _ => ConvertError::failed(provider, format!("failed to start converter: {err}")),
    }
}

/// The last non-empty line a subprocess wrote to stderr.
pub(crate) fn last_stderr_line(stderr: &[u8]) -> Option<String> {
    String::from_utf8_lossy(stderr)
        .lines()
        .map(str::trim)
        .rev()
        .find(|line| !line.is_empty())
        .map(str::to_string)
}
