//! HTTP front end for CDXML to CDX conversion.
//!
//! `POST` a JSON body `{"cdxml": "..."}` to `/` or `/api/cdxml-to-cdx` and
//! receive the CDX file as an `application/octet-stream` attachment. `OPTIONS`
//! answers cross-origin preflight. Failures come back as `{"error": "..."}`
//! with status 400 (bad input) or 500 (conversion failed).
//!
//! Only markup conversion runs here; there is no pre-encoded fallback.

pub mod handler;

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue};
use axum::routing::post;
use axum::Router;
use cdxbridge_convert::ConversionChain;
use tower_http::set_header::SetResponseHeaderLayer;

pub use handler::{preflight, submit, SubmitRequest, ATTACHMENT_NAME};

/// Path of the conversion endpoint besides `/`.
pub const CONVERT_PATH: &str = "/api/cdxml-to-cdx";

/// Default request body cap (16 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Server settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServeConfig {
    /// Listen address.
    pub bind: SocketAddr,
    /// Largest accepted request body in bytes.
    pub max_body_bytes: usize,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8765)),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// Routes with the default body limit.
pub fn router(chain: Arc<ConversionChain>) -> Router {
    router_with_config(chain, &ServeConfig::default())
}

/// Routes with the body limit from `config`.
///
/// Every response, rejections included, allows any origin.
pub fn router_with_config(chain: Arc<ConversionChain>, config: &ServeConfig) -> Router {
    let endpoint = post(submit).options(preflight);
    Router::new()
        .route("/", endpoint.clone())
        .route(CONVERT_PATH, endpoint)
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .with_state(chain)
}

/// Serve until `shutdown` resolves.
pub async fn serve<F>(
    chain: Arc<ConversionChain>,
    config: ServeConfig,
    shutdown: F,
) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, router_with_config(chain, &config))
        .with_graceful_shutdown(shutdown)
        .await?;
    tracing::info!("server stopped");
    Ok(())
}
