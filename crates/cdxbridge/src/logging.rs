//! Log setup shared by the binaries. Logs always go to stderr; stdout carries
//! protocol messages or command output.

use clap::ValueEnum;

/// Log level for the native host (`error`..`trace`).
pub const ENV_LOG_LEVEL: &str = "CDXBRIDGE_LOG_LEVEL";
/// Log format for the native host (`text` or `json`).
pub const ENV_LOG_FORMAT: &str = "CDXBRIDGE_LOG_FORMAT";

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_filter(self) -> tracing::level_filters::LevelFilter {
        match self {
            LogLevel::Error => tracing::level_filters::LevelFilter::ERROR,
            LogLevel::Warn => tracing::level_filters::LevelFilter::WARN,
            LogLevel::Info => tracing::level_filters::LevelFilter::INFO,
            LogLevel::Debug => tracing::level_filters::LevelFilter::DEBUG,
            LogLevel::Trace => tracing::level_filters::LevelFilter::TRACE,
        }
    }
}

pub fn init_logging(format: LogFormat, level: LogLevel) {
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level.as_filter())
        .with_ansi(false)
        .with_target(false);

    match format {
        LogFormat::Text => {
            let _ = builder.try_init();
        }
        LogFormat::Json => {
            let _ = builder.json().try_init();
        }
    }
}

/// Format and level from `lookup`, falling back to defaults for unset or
/// unrecognized values.
pub fn settings_from_lookup<F>(lookup: F) -> (LogFormat, LogLevel)
where
    F: Fn(&str) -> Option<String>,
{
    let format = lookup(ENV_LOG_FORMAT)
        .and_then(|value| LogFormat::from_str(value.trim(), true).ok())
        .unwrap_or_default();
    let level = lookup(ENV_LOG_LEVEL)
        .and_then(|value| LogLevel::from_str(value.trim(), true).ok())
        .unwrap_or_default();
    (format, level)
}

/// Configure logging from `CDXBRIDGE_LOG_FORMAT` and `CDXBRIDGE_LOG_LEVEL`.
pub fn init_from_env() {
    let (format, level) = settings_from_lookup(|key| std::env::var(key).ok());
    init_logging(format, level);
}
