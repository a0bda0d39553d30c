use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use cdxbridge_convert::ConversionChain;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Download name offered for converted files.
pub const ATTACHMENT_NAME: &str = "structure.cdx";

const ALLOW_METHODS: &str = "POST, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type";

/// Submission body. Only a JSON object is accepted.
#[derive(Debug, Default, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct SubmitRequest {
    pub cdxml: Option<String>,
}

impl TryFrom<Map<String, Value>> for SubmitRequest {
    type Error = String;

    fn try_from(object: Map<String, Value>) -> Result<Self, Self::Error> {
        let cdxml = match object.get("cdxml") {
            None | Some(Value::Null) => None,
            Some(Value::String(markup)) => Some(markup.clone()),
            Some(other) => return Err(format!("cdxml must be a string, got {other}")),
        };
        Ok(Self { cdxml })
    }
}

/// Failure body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// `OPTIONS`: answer the cross-origin preflight without doing any work.
///
/// The router adds `Access-Control-Allow-Origin` to every response.
pub async fn preflight() -> Response {
    let mut response = StatusCode::OK.into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    response
}

/// `POST`: convert `{"cdxml": ...}` and return the CDX bytes as an attachment.
pub async fn submit(State(chain): State<Arc<ConversionChain>>, body: Bytes) -> Response {
    let request: SubmitRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(err) => {
            tracing::debug!(error = %err, "rejected malformed submission");
            return error_response(StatusCode::BAD_REQUEST, format!("Invalid request: {err}"));
        }
    };

    let markup = match request.cdxml.as_deref().map(str::trim) {
        Some(markup) if !markup.is_empty() => markup.to_string(),
        _ => return error_response(StatusCode::BAD_REQUEST, "Missing or empty cdxml"),
    };

    let converted = tokio::task::spawn_blocking(move || chain.convert_markup(&markup)).await;

    match converted {
        Ok(Ok(conversion)) => {
            tracing::info!(
                bytes = conversion.bytes.len(),
                provenance = %conversion.provenance,
                "served CDX"
            );
            attachment(conversion.bytes)
        }
        Ok(Err(err)) => {
            tracing::warn!(error = %err, "conversion failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
        Err(err) => {
            tracing::error!(error = %err, "conversion task did not complete");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("conversion task failed: {err}"),
            )
        }
    }
}

fn attachment(bytes: Vec<u8>) -> Response {
    let length = bytes.len();
    let disposition = format!(r#"attachment; filename="{ATTACHMENT_NAME}""#);
    let mut response = Response::new(Body::from(bytes));
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
    response
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    let body = ErrorBody {
        error: error.into(),
    };
    (status, axum::Json(body)).into_response()
}
