use std::fmt;
use std::io;

use cdxbridge::clipboard::ClipboardError;
use cdxbridge::convert::ConvertError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const HEALTH_CHECK_FAILED: i32 = 30;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(FAILURE, message)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    CliError::failure(format!("{context}: {err}"))
}

pub fn convert_error(err: ConvertError) -> CliError {
    CliError::failure(err.to_string())
}

pub fn clipboard_error(err: ClipboardError) -> CliError {
    match err {
        ClipboardError::PlatformUnsupported => {
            CliError::failure("clipboard delivery is Windows only")
        }
        other => CliError::failure(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivery_failures_exit_one() {
        let err = clipboard_error(ClipboardError::PlatformUnsupported);
        assert_eq!(err.code, FAILURE);
        assert!(err.message.contains("Windows only"));

        let err = convert_error(ConvertError::Unavailable("install it".to_string()));
        assert_eq!(err.code, FAILURE);
        assert_eq!(err.message, "install it");
    }

    #[test]
    fn bad_configuration_exits_one() {
        let err = convert_error(ConvertError::Config("bad".to_string()));
        assert_eq!(err.code, FAILURE);
        assert_eq!(err.message, "invalid converter configuration: bad");
    }

    #[test]
    fn io_errors_keep_context() {
        let err = io_error(
            "read structure.cdx",
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(err.code, FAILURE);
        assert_eq!(err.message, "read structure.cdx: gone");
    }
}
