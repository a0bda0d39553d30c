//! Request and response envelopes exchanged with the browser extension.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The single request a native messaging host receives.
///
/// `cdx` and `cdxBase64` are aliases for the same base64 CDX payload. Only a
/// JSON object deserializes; unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct HostRequest {
    /// CDXML markup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cdxml: Option<String>,

    /// Pre-encoded CDX, base64.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cdx: Option<String>,

    /// Pre-encoded CDX, base64 (alias of `cdx`).
    #[serde(rename = "cdxBase64", skip_serializing_if = "Option::is_none")]
    pub cdx_base64: Option<String>,
}

impl TryFrom<Map<String, Value>> for HostRequest {
    type Error = String;

    fn try_from(object: Map<String, Value>) -> Result<Self, Self::Error> {
        Ok(Self {
            cdxml: text_field(&object, "cdxml")?,
            cdx: text_field(&object, "cdx")?,
            cdx_base64: text_field(&object, "cdxBase64")?,
        })
    }
}

/// A missing or `null` key is absent; anything but a string is rejected.
fn text_field(object: &Map<String, Value>, key: &str) -> Result<Option<String>, String> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(other) => Err(format!("{key} must be a string, got {other}")),
    }
}

impl HostRequest {
    /// The first non-blank pre-encoded CDX field, `cdx` before `cdxBase64`.
    pub fn encoded_cdx(&self) -> Option<&str> {
        [self.cdx.as_deref(), self.cdx_base64.as_deref()]
            .into_iter()
            .flatten()
            .find(|value| !value.trim().is_empty())
    }

    /// The CDXML field, if the caller sent one (even a blank one).
    pub fn markup(&self) -> Option<&str> {
        self.cdxml.as_deref()
    }
}

/// The single response a native messaging host sends back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HostResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(reason.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn cdx_alias_precedence() {
        let request: HostRequest =
            serde_json::from_value(json!({"cdx": "Zmlyc3Q=", "cdxBase64": "c2Vjb25k"})).unwrap();
        assert_eq!(request.encoded_cdx(), Some("Zmlyc3Q="));
    }

    #[test]
    fn empty_cdx_falls_through_to_alias() {
        let request: HostRequest =
            serde_json::from_value(json!({"cdx": "", "cdxBase64": "c2Vjb25k"})).unwrap();
        assert_eq!(request.encoded_cdx(), Some("c2Vjb25k"));
    }

    #[test]
    fn blank_cdx_falls_through_to_alias() {
        let request: HostRequest =
            serde_json::from_value(json!({"cdx": " \n ", "cdxBase64": "AAE="})).unwrap();
        assert_eq!(request.encoded_cdx(), Some("AAE="));

        let request: HostRequest = serde_json::from_value(json!({"cdxBase64": "\t"})).unwrap();
        assert_eq!(request.encoded_cdx(), None);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let request: HostRequest =
            serde_json::from_value(json!({"cdxml": "<CDXML/>", "source": "ketcher"})).unwrap();
        assert_eq!(request.markup(), Some("<CDXML/>"));
        assert_eq!(request.encoded_cdx(), None);
    }

    #[test]
    fn only_objects_are_requests() {
        assert!(serde_json::from_value::<HostRequest>(json!(["<CDXML/>"])).is_err());
        assert!(serde_json::from_value::<HostRequest>(json!("<CDXML/>")).is_err());
        assert!(serde_json::from_value::<HostRequest>(json!({"cdxml": 1})).is_err());

        let request: HostRequest = serde_json::from_value(json!({"cdxml": null})).unwrap();
        assert_eq!(request, HostRequest::default());
    }

    #[test]
    fn request_serializes_with_wire_names() {
        let request = HostRequest {
            cdx_base64: Some("AAE=".to_string()),
            ..HostRequest::default()
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"cdxBase64": "AAE="})
        );
    }

    #[test]
    fn failure_response_shape() {
        let value = serde_json::to_value(HostResponse::failure("Windows only")).unwrap();
        assert_eq!(value, json!({"success": false, "error": "Windows only"}));
    }
}
