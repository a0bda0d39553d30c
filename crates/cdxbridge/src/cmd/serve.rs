use std::sync::Arc;

use cdxbridge::http::{serve, ServeConfig};

use crate::cmd::{chain_from_env, ServeArgs};
use crate::exit::{io_error, CliError, CliResult, INTERNAL, SUCCESS};

pub fn run(args: ServeArgs) -> CliResult<i32> {
    let chain = Arc::new(chain_from_env()?);
    let config = ServeConfig {
        bind: args.bind,
        max_body_bytes: args.max_body_bytes,
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| CliError::new(INTERNAL, format!("failed to start runtime: {err}")))?;

    runtime
        .block_on(serve(chain, config, shutdown_signal()))
        .map_err(|err| io_error(&format!("serve on {}", config.bind), err))?;
    Ok(SUCCESS)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
