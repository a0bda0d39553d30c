use std::ffi::OsString;
use std::path::PathBuf;

use crate::converter::OutputEncoding;
use crate::error::Result;
use crate::python::DEFAULT_PYTHON_MODULES;

/// Python interpreter used by the Python backends.
pub const ENV_PYTHON: &str = "CDXBRIDGE_PYTHON";
/// Optional external converter program, tried before the Python backends.
pub const ENV_CONVERTER: &str = "CDXBRIDGE_CONVERTER";
/// `raw` or `base64`: how the external converter writes CDX.
pub const ENV_CONVERTER_OUTPUT: &str = "CDXBRIDGE_CONVERTER_OUTPUT";
/// Directory for staged markup files.
pub const ENV_STAGING_DIR: &str = "CDXBRIDGE_STAGING_DIR";

/// Controls which converter backends a chain uses and where it stages markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainConfig {
    /// Interpreter for the Python backends.
    pub python: OsString,
    /// Python packages, tried in order.
    pub python_modules: Vec<String>,
    /// External converter program, tried first when set.
    pub converter: Option<PathBuf>,
    /// Arguments placed before the staged file path.
    pub converter_args: Vec<OsString>,
    /// Output encoding of the external converter.
    pub converter_output: OutputEncoding,
    /// Staging directory. `None` means the OS temporary directory.
    pub staging_dir: Option<PathBuf>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            python: default_python(),
            python_modules: DEFAULT_PYTHON_MODULES
                .iter()
                .map(|m| m.to_string())
                .collect(),
            converter: None,
            converter_args: Vec::new(),
            converter_output: OutputEncoding::Raw,
            staging_dir: None,
        }
    }
}

impl ChainConfig {
    /// Read overrides from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read overrides through `lookup`. Unset or blank values keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(python) = get(ENV_PYTHON) {
            config.python = python.into();
        }
        if let Some(converter) = get(ENV_CONVERTER) {
            config.converter = Some(PathBuf::from(converter));
        }
        if let Some(output) = get(ENV_CONVERTER_OUTPUT) {
            config.converter_output = output.parse()?;
        }
        if let Some(dir) = get(ENV_STAGING_DIR) {
            config.staging_dir = Some(PathBuf::from(dir));
        }

        Ok(config)
    }
}

fn default_python() -> OsString {
    if cfg!(windows) {
        OsString::from("python")
    } else {
        OsString::from("python3")
    }
}
