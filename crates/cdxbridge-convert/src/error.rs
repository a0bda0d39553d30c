/// Errors that can occur while producing CDX bytes.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// No converter backend could be loaded. The message is shown to users
    /// as-is, so it names the missing capability.
    #[error("{0}")]
    Unavailable(String),

    /// A converter backend was found but failed to parse or serialize.
    #[error("{provider} failed to convert CDXML: {reason}")]
    Failed { provider: String, reason: String },

    /// The pre-encoded CDX payload is not valid base64.
    #[error("invalid base64 CDX payload: {0}")]
    Decode(#[from] base64::DecodeError),

    /// The pre-encoded CDX payload decoded to zero bytes.
    #[error("CDX payload is empty")]
    EmptyPayload,

    /// The markup could not be written to a temporary file.
    #[error("failed to stage CDXML for conversion: {0}")]
    Staging(#[source] std::io::Error),

    /// Neither markup nor a pre-encoded payload was supplied.
    #[error("no CDXML or CDX input supplied")]
    NoInput,

    /// A configuration value could not be parsed.
    #[error("invalid converter configuration: {0}")]
    Config(String),
}

impl ConvertError {
    pub(crate) fn failed(provider: &str, reason: impl Into<String>) -> Self {
        Self::Failed {
            provider: provider.to_string(),
            reason: reason.into(),
        }
    }

    /// True when the error means "this backend is not installed".
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
