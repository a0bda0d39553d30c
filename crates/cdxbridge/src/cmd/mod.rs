use clap::{Args, Subcommand};
use std::path::PathBuf;

use cdxbridge::convert::{ChainConfig, ConversionChain};

use crate::exit::{convert_error, CliResult};
use crate::output::OutputFormat;

pub mod clip;
pub mod convert;
pub mod doctor;
#[cfg(feature = "http")]
pub mod serve;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Put a CDX file on the clipboard as ChemDraw Interchange Format.
    Clip(ClipArgs),
    /// Convert CDXML to CDX.
    Convert(ConvertArgs),
    /// Serve the conversion endpoint over HTTP.
    #[cfg(feature = "http")]
    Serve(ServeArgs),
    /// Check clipboard support, staging, and converter availability.
    Doctor(DoctorArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Clip(args) => clip::run(args, format),
        Command::Convert(args) => convert::run(args, format),
        #[cfg(feature = "http")]
        Command::Serve(args) => serve::run(args),
        Command::Doctor(args) => doctor::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Conversion chain configured from `CDXBRIDGE_*` environment variables.
pub fn chain_from_env() -> CliResult<ConversionChain> {
    let config = ChainConfig::from_env().map_err(convert_error)?;
    Ok(ConversionChain::from_config(&config))
}

#[derive(Args, Debug)]
pub struct ClipArgs {
    /// CDX file to copy.
    pub file: PathBuf,
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// CDXML file to read. Default: stdin.
    #[arg(long, short = 'i', value_name = "FILE")]
    pub input: Option<PathBuf>,
    /// CDX file to write. Default: stdout.
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[cfg(feature = "http")]
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on.
    #[arg(long, env = "CDXBRIDGE_BIND", default_value = "127.0.0.1:8765")]
    pub bind: std::net::SocketAddr,
    /// Largest accepted request body in bytes.
    #[arg(long, default_value_t = cdxbridge::http::DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

#[derive(Args, Debug, Default)]
pub struct DoctorArgs {}
