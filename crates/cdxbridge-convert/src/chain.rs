use std::fmt;
use std::path::PathBuf;

use crate::command::CommandConverter;
use crate::config::ChainConfig;
use crate::converter::{decode_base64, Converter};
use crate::error::{ConvertError, Result};
use crate::python::PythonModuleConverter;
use crate::staging::StagedMarkup;

/// Shown to users when no backend is installed.
pub const INSTALL_HINT: &str = "CDXML conversion unavailable. Install cdx-mol: pip install cdx-mol \
     (or pycdxml from https://github.com/kienerj/pycdxml)";

/// Where the CDX bytes came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provenance {
    /// Converted from markup by the named backend.
    Converter(String),
    /// Decoded from the caller's base64 payload.
    PreEncoded,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Converter(name) => write!(f, "{name}"),
            Self::PreEncoded => f.write_str("pre-encoded"),
        }
    }
}

/// Successful conversion output. `bytes` is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub bytes: Vec<u8>,
    pub provenance: Provenance,
}

/// What the caller supplied.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConversionInput<'a> {
    /// CDXML markup.
    pub markup: Option<&'a str>,
    /// Base64-encoded CDX used when markup conversion is skipped or fails.
    pub encoded_cdx: Option<&'a str>,
}

/// Ordered list of converter backends with a pre-encoded fallback.
pub struct ConversionChain {
    converters: Vec<Box<dyn Converter>>,
    staging_dir: Option<PathBuf>,
    install_hint: String,
}

impl ConversionChain {
    pub fn new(converters: Vec<Box<dyn Converter>>) -> Self {
        Self {
            converters,
            staging_dir: None,
            install_hint: INSTALL_HINT.to_string(),
        }
    }

    /// Build the default backend list: the configured external command
    /// first, then each Python package in order.
    pub fn from_config(config: &ChainConfig) -> Self {
        let mut converters: Vec<Box<dyn Converter>> = Vec::new();
        if let Some(program) = &config.converter {
            converters.push(Box::new(
                CommandConverter::new(program.as_os_str())
                    .args(config.converter_args.iter().cloned())
                    .output(config.converter_output),
            ));
        }
        for module in &config.python_modules {
            converters.push(Box::new(PythonModuleConverter::new(
                config.python.clone(),
                module.clone(),
            )));
        }

        let mut chain = Self::new(converters);
        chain.staging_dir = config.staging_dir.clone();
        chain
    }

    /// Stage markup in `dir` instead of the OS temporary directory.
    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = Some(dir.into());
        self
    }

    /// Replace the message surfaced when every backend is unavailable.
    pub fn with_install_hint(mut self, hint: impl Into<String>) -> Self {
        self.install_hint = hint.into();
        self
    }

    pub fn converters(&self) -> impl Iterator<Item = &dyn Converter> {
        self.converters.iter().map(|c| c.as_ref())
    }

    /// Produce CDX bytes from markup, falling back to the pre-encoded payload.
    ///
    /// Markup that is blank after trimming is treated as absent. A supplied
    /// payload is always decoded; one that decodes to nothing is an error.
    pub fn convert(&self, input: ConversionInput<'_>) -> Result<Conversion> {
        let mut failure = None;

        if let Some(markup) = input.markup.map(str::trim).filter(|m| !m.is_empty()) {
            match self.convert_markup(markup) {
                Ok(conversion) => return Ok(conversion),
                Err(err) => {
                    tracing::warn!(error = %err, "markup conversion failed");
                    failure = Some(err);
                }
            }
        }

        if let Some(encoded) = input.encoded_cdx {
            if failure.is_some() {
                tracing::info!("falling back to pre-encoded CDX");
            }
            let bytes = decode_base64(encoded)?;
            if bytes.is_empty() {
                return Err(ConvertError::EmptyPayload);
            }
            return Ok(Conversion {
                bytes,
                provenance: Provenance::PreEncoded,
            });
        }

        Err(failure.unwrap_or(ConvertError::NoInput))
    }

    /// Convert markup through the backends only, with no fallback.
    pub fn convert_markup(&self, markup: &str) -> Result<Conversion> {
        if self.converters.is_empty() {
            return Err(ConvertError::Unavailable(self.install_hint.clone()));
        }

        let staged = StagedMarkup::stage(markup, self.staging_dir.as_deref())
            .map_err(ConvertError::Staging)?;

        let mut last_failure = None;
        for converter in &self.converters {
            let name = converter.name();
            match converter.convert(&staged) {
                Ok(bytes) if !bytes.is_empty() => {
                    tracing::debug!(converter = name, bytes = bytes.len(), "converted markup");
                    return Ok(Conversion {
                        bytes,
                        provenance: Provenance::Converter(name.to_string()),
                    });
                }
                Ok(_) => {
                    tracing::debug!(converter = name, "converter produced no output");
                    last_failure = Some(ConvertError::failed(name, "produced no output"));
                }
                Err(err) if err.is_unavailable() => {
                    tracing::debug!(converter = name, error = %err, "converter unavailable");
                }
                Err(err) => {
                    tracing::debug!(converter = name, error = %err, "converter failed");
                    last_failure = Some(err);
                }
            }
        }

        Err(last_failure.unwrap_or_else(|| ConvertError::Unavailable(self.install_hint.clone())))
    }
}

impl fmt::Debug for ConversionChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionChain")
            .field(
                "converters",
                &self.converters.iter().map(|c| c.name()).collect::<Vec<_>>(),
            )
            .field("staging_dir", &self.staging_dir)
            .finish()
    }
}
