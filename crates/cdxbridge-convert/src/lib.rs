//! Prioritized CDXML to CDX conversion.
//!
//! A [`ConversionChain`] holds an ordered list of interchangeable
//! [`Converter`] backends. Markup is staged to a temporary `.cdxml` file,
//! handed to each backend in turn until one yields CDX bytes, and the staged
//! file is removed on every exit path. When every backend fails, a
//! pre-encoded (base64) CDX payload supplied by the caller is used instead.

pub mod chain;
pub mod command;
pub mod config;
pub mod converter;
pub mod error;
pub mod python;
pub mod staging;

pub use chain::{Conversion, ConversionChain, ConversionInput, Provenance, INSTALL_HINT};
pub use command::CommandConverter;
pub use config::ChainConfig;
pub use converter::{decode_base64, Converter, OutputEncoding};
pub use error::{ConvertError, Result};
pub use python::{PythonModuleConverter, DEFAULT_PYTHON_MODULES};
pub use staging::StagedMarkup;
