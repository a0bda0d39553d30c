//! Native messaging host. Browsers launch it with the caller origin (and on
//! Windows a parent window handle) as arguments; those are ignored.

use std::io;

use cdxbridge::clipboard::system_backend;
use cdxbridge::convert::{ChainConfig, ConversionChain};
use cdxbridge::host::Host;
use cdxbridge::logging;

fn main() {
    logging::init_from_env();
    tracing::debug!(args = ?std::env::args().skip(1).collect::<Vec<_>>(), "host started");

    let config = ChainConfig::from_env().unwrap_or_else(|err| {
        tracing::warn!(error = %err, "ignoring converter environment");
        ChainConfig::default()
    });
    let chain = ConversionChain::from_config(&config);
    let clipboard = system_backend();

    let stdin = io::stdin().lock();
    let stdout = io::stdout().lock();
    if let Err(err) = Host::new(&chain, clipboard.as_ref()).run(stdin, stdout) {
        tracing::error!(error = %err, "failed to write response");
        std::process::exit(1);
    }
}
